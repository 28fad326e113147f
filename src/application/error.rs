use thiserror::Error;

use crate::domain::{CustomerError, TransactionError};

#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced customer does not exist. Kept distinct from validation
    /// errors so callers can tell "bad input" from "bad reference".
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Invalid customer: {0}")]
    InvalidCustomer(#[from] CustomerError),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(#[from] TransactionError),

    #[error("Backup settings incomplete: set email and app password first")]
    BackupSettingsIncomplete,

    #[error("Backup failed: {0}")]
    BackupFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
