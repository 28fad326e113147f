use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, CustomerId, parse_cents};

pub type TransactionId = Uuid;

/// The closed set of transaction kinds. A SALE increases what the customer
/// owes, a PAYMENT decreases it. Anything else is rejected at creation time
/// and can never reach the balance calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Sale,
    Payment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "SALE",
            TransactionKind::Payment => "PAYMENT",
        }
    }

    /// Parse the exact wire string. Case-sensitive: the kind set is closed.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SALE" => Some(TransactionKind::Sale),
            "PAYMENT" => Some(TransactionKind::Payment),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single sale or payment on a customer's tab. Transactions are immutable
/// once created; they only disappear when their customer is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    /// Amount in cents, always strictly positive. The kind carries the sign.
    pub amount_cents: Cents,
    pub kind: TransactionKind,
    pub description: String,
    /// Defaults to creation time; seed/import data may backdate it.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Validate and build a transaction from raw input. This is the single
    /// gate before persistence: a zero or negative amount, an unrecognized
    /// kind string, or a blank description never reaches storage.
    pub fn create(
        customer_id: CustomerId,
        amount: &str,
        kind: &str,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TransactionError> {
        let amount_cents = parse_cents(amount)
            .map_err(|_| TransactionError::InvalidAmount(amount.to_string()))?;
        if amount_cents <= 0 {
            return Err(TransactionError::NonPositiveAmount(amount_cents));
        }

        let kind = TransactionKind::from_str(kind)
            .ok_or_else(|| TransactionError::UnknownKind(kind.to_string()))?;

        let description = description.trim();
        if description.is_empty() {
            return Err(TransactionError::EmptyDescription);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            amount_cents,
            kind,
            description: description.to_string(),
            created_at,
        })
    }
}

/// A violated creation constraint. Each variant names the specific reason
/// so callers can surface it without guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    InvalidAmount(String),
    NonPositiveAmount(Cents),
    UnknownKind(String),
    EmptyDescription,
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionError::InvalidAmount(raw) => {
                write!(f, "invalid amount '{}': expected a decimal like '150.00'", raw)
            }
            TransactionError::NonPositiveAmount(cents) => {
                write!(f, "amount must be strictly positive, got {} cents", cents)
            }
            TransactionError::UnknownKind(raw) => {
                write!(f, "unknown transaction kind '{}': expected SALE or PAYMENT", raw)
            }
            TransactionError::EmptyDescription => {
                write!(f, "description must not be empty")
            }
        }
    }
}

impl std::error::Error for TransactionError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> CustomerId {
        Uuid::new_v4()
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [TransactionKind::Sale, TransactionKind::Payment] {
            let parsed = TransactionKind::from_str(kind.as_str()).unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_create_sale() {
        let tx =
            Transaction::create(customer(), "150.00", "SALE", "Vestido de verão", Utc::now())
                .unwrap();

        assert_eq!(tx.amount_cents, 15000);
        assert_eq!(tx.kind, TransactionKind::Sale);
        assert_eq!(tx.description, "Vestido de verão");
    }

    #[test]
    fn test_create_smallest_payment() {
        let tx = Transaction::create(customer(), "0.01", "PAYMENT", "x", Utc::now()).unwrap();
        assert_eq!(tx.amount_cents, 1);
        assert_eq!(tx.kind, TransactionKind::Payment);
    }

    #[test]
    fn test_rejects_zero_amount() {
        let result = Transaction::create(customer(), "0", "SALE", "nothing", Utc::now());
        assert!(matches!(result, Err(TransactionError::NonPositiveAmount(0))));
    }

    #[test]
    fn test_rejects_negative_amount() {
        let result = Transaction::create(customer(), "-5", "SALE", "refund?", Utc::now());
        assert!(matches!(
            result,
            Err(TransactionError::NonPositiveAmount(-500))
        ));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let result = Transaction::create(customer(), "10.00", "REFUND", "not a kind", Utc::now());
        assert!(matches!(result, Err(TransactionError::UnknownKind(k)) if k == "REFUND"));
    }

    #[test]
    fn test_rejects_lowercase_kind() {
        let result = Transaction::create(customer(), "10.00", "sale", "case matters", Utc::now());
        assert!(matches!(result, Err(TransactionError::UnknownKind(_))));
    }

    #[test]
    fn test_rejects_empty_description() {
        let result = Transaction::create(customer(), "10.00", "SALE", "   ", Utc::now());
        assert!(matches!(result, Err(TransactionError::EmptyDescription)));
    }

    #[test]
    fn test_rejects_garbage_amount() {
        let result = Transaction::create(customer(), "ten", "SALE", "words", Utc::now());
        assert!(matches!(result, Err(TransactionError::InvalidAmount(_))));
    }

    #[test]
    fn test_rejects_non_ascii_amount() {
        // User-typed input reaches this gate unfiltered; a stray accented
        // character must come back as InvalidAmount, never a panic.
        let result = Transaction::create(customer(), "1.5é", "SALE", "typo", Utc::now());
        assert!(matches!(result, Err(TransactionError::InvalidAmount(_))));
    }

    #[test]
    fn test_description_is_trimmed() {
        let tx = Transaction::create(customer(), "10.00", "SALE", "  camisa  ", Utc::now()).unwrap();
        assert_eq!(tx.description, "camisa");
    }
}
