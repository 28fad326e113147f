// Application layer: commands and queries over the ledger, independent of
// any transport. The CLI is just one client of LedgerService.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
