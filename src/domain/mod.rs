mod balance;
mod collection;
mod customer;
mod money;
mod settings;
mod transaction;

pub use balance::*;
pub use collection::*;
pub use customer::*;
pub use money::*;
pub use settings::*;
pub use transaction::*;
