use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CustomerId = Uuid;

/// A customer buying on store credit. Balance is never stored on the
/// customer; it is always derived from the transaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    /// Scheduling hint for collections. Date-only on purpose: bucketing
    /// compares calendar days, never time-of-day.
    pub next_payment_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer. The name must be non-empty after trimming.
    pub fn new(name: String) -> Result<Self, CustomerError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CustomerError::EmptyName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            phone: None,
            next_payment_date: None,
            created_at: Utc::now(),
        })
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_next_payment_date(mut self, date: NaiveDate) -> Self {
        self.next_payment_date = Some(date);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerError {
    EmptyName,
}

impl std::fmt::Display for CustomerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomerError::EmptyName => write!(f, "customer name must not be empty"),
        }
    }
}

impl std::error::Error for CustomerError {}
