//! Ledger module containing entries, accounts and transaction posting

pub mod account;
pub mod entry;
pub mod transaction;

pub use account::*;
pub use entry::*;
pub use transaction::*;
