// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use fiado::application::LedgerService;
use fiado::domain::Customer;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Helper to parse a date string into a midnight DateTime<Utc>
pub fn parse_datetime(date_str: &str) -> DateTime<Utc> {
    parse_date(date_str).and_hms_opt(0, 0, 0).unwrap().and_utc()
}

/// Create a customer and put a sale and a payment on their tab.
/// Returns the customer; resulting balance is 100.00.
pub async fn seeded_customer(service: &LedgerService, name: &str) -> Result<Customer> {
    let customer = service.create_customer(name.into(), None, None).await?;
    service
        .record_transaction(customer.id, "150.00", "SALE", "Vestido de verão", None)
        .await?;
    service
        .record_transaction(customer.id, "50.00", "PAYMENT", "Pagamento parcial", None)
        .await?;
    Ok(customer)
}
