//! # Bookkeeper Core
//!
//! A double-entry bookkeeping engine: accounts, immutable entries and
//! balanced multi-entry transactions, with balances computed as at any date.
//!
//! ## Features
//!
//! - **Entries**: amount, booking date and account are fixed; attributes are written once
//! - **Accounts**: reject entries dated before the opening date or in another currency
//! - **Balances**: exact decimal sums over inclusive date ranges
//! - **Transactions**: post only when debits equal credits, all-or-nothing
//! - **Validation**: pluggable account and transaction validators
//!
//! ## Quick Start
//!
//! ```rust
//! use bookkeeper_core::{
//!     Account, AccountAttributes, AccountSide, Currency, EntryAttributes, Money, Transaction,
//! };
//! use chrono::NaiveDate;
//!
//! let kes = Currency::new("KES").unwrap();
//! let opened = NaiveDate::from_ymd_opt(2017, 5, 12).unwrap();
//! let cash = Account::new(AccountSide::Debit, kes, AccountAttributes::new("Cash", "1000", opened));
//! let sales = Account::new(AccountSide::Credit, kes, AccountAttributes::new("Sales", "4000", opened));
//!
//! let sold_on = NaiveDate::from_ymd_opt(2018, 2, 12).unwrap();
//! let sale = Transaction::new(sold_on);
//! let amount = Money::parse("105.23", kes).unwrap();
//! sale.add_entry(AccountSide::Debit, amount.clone(), &cash, EntryAttributes::new("Till")).unwrap();
//! sale.add_entry(AccountSide::Credit, amount.clone(), &sales, EntryAttributes::new("Till")).unwrap();
//! sale.post().unwrap();
//!
//! assert_eq!(cash.balance_as_at(sold_on).amount(), &amount);
//! ```

pub mod ledger;
pub mod traits;
pub mod types;
pub mod units;
pub mod utils;

// Re-export commonly used types
pub use ledger::*;
pub use traits::*;
pub use types::*;
pub use units::*;

// Re-export transaction patterns for convenience
pub use ledger::transaction::patterns;
