use serde::{Deserialize, Serialize};

use super::{Cents, Customer, Transaction, TransactionKind};

/// Compute a customer's balance from its transaction list.
/// Balance = sum of SALE amounts - sum of PAYMENT amounts.
/// Positive means the customer owes money; negative means overpayment and
/// the sign is preserved, never clamped.
pub fn compute_balance(transactions: &[Transaction]) -> Cents {
    transactions.iter().fold(0, |balance, tx| match tx.kind {
        TransactionKind::Sale => balance + tx.amount_cents,
        TransactionKind::Payment => balance - tx.amount_cents,
    })
}

/// A customer paired with its derived balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerBalance {
    pub customer: Customer,
    pub balance: Cents,
}

/// Sort customers by descending balance (highest debt first). Ties break by
/// case-insensitive name so the ordering is stable across fetches.
pub fn sort_by_debt(entries: &mut [CustomerBalance]) {
    entries.sort_by(|a, b| {
        b.balance.cmp(&a.balance).then_with(|| {
            a.customer
                .name
                .to_lowercase()
                .cmp(&b.customer.name.to_lowercase())
        })
    });
}

/// Total outstanding credit: the sum of strictly positive balances.
/// Overpaid customers don't reduce what the shop is owed.
pub fn total_receivable(entries: &[CustomerBalance]) -> Cents {
    entries
        .iter()
        .filter(|e| e.balance > 0)
        .map(|e| e.balance)
        .sum()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn tx(kind: TransactionKind, amount_cents: Cents) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            amount_cents,
            kind,
            description: "test".into(),
            created_at: Utc::now(),
        }
    }

    fn entry(name: &str, balance: Cents) -> CustomerBalance {
        CustomerBalance {
            customer: Customer::new(name.into()).unwrap(),
            balance,
        }
    }

    #[test]
    fn test_empty_list_is_zero() {
        assert_eq!(compute_balance(&[]), 0);
    }

    #[test]
    fn test_sale_minus_payment() {
        // The seed scenario: SALE 150.00, PAYMENT 50.00 -> 100.00
        let txs = vec![
            tx(TransactionKind::Sale, 15000),
            tx(TransactionKind::Payment, 5000),
        ];
        assert_eq!(compute_balance(&txs), 10000);
    }

    #[test]
    fn test_single_sale() {
        let txs = vec![tx(TransactionKind::Sale, 30000)];
        assert_eq!(compute_balance(&txs), 30000);
    }

    #[test]
    fn test_overpayment_keeps_sign() {
        let txs = vec![
            tx(TransactionKind::Sale, 5000),
            tx(TransactionKind::Payment, 8000),
        ];
        assert_eq!(compute_balance(&txs), -3000);
    }

    #[test]
    fn test_balance_is_order_invariant() {
        let mut txs = vec![
            tx(TransactionKind::Sale, 15000),
            tx(TransactionKind::Payment, 5000),
            tx(TransactionKind::Sale, 2500),
            tx(TransactionKind::Payment, 100),
        ];
        let expected = compute_balance(&txs);

        txs.reverse();
        assert_eq!(compute_balance(&txs), expected);

        txs.swap(0, 2);
        assert_eq!(compute_balance(&txs), expected);
    }

    #[test]
    fn test_sort_by_debt_descending() {
        let mut entries = vec![entry("Ana", 1000), entry("Bia", 30000), entry("Caio", -500)];
        sort_by_debt(&mut entries);

        let names: Vec<&str> = entries.iter().map(|e| e.customer.name.as_str()).collect();
        assert_eq!(names, vec!["Bia", "Ana", "Caio"]);
    }

    #[test]
    fn test_sort_ties_break_by_name() {
        let mut entries = vec![entry("zeca", 5000), entry("Ana", 5000), entry("bia", 5000)];
        sort_by_debt(&mut entries);

        let names: Vec<&str> = entries.iter().map(|e| e.customer.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "bia", "zeca"]);
    }

    #[test]
    fn test_total_receivable_ignores_overpaid() {
        let entries = vec![entry("Ana", 10000), entry("Bia", -2000), entry("Caio", 500)];
        assert_eq!(total_receivable(&entries), 10500);
    }
}
