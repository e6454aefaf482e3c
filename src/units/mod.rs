//! Monetary and calendar value types consumed by the ledger

pub mod money;
pub mod time;

pub use money::*;
pub use time::*;
