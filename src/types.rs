//! Core types and data structures for the bookkeeping engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::units::{Currency, Money};

/// The two sides of double-entry bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountSide {
    /// Debit side - the natural side of Assets and Expenses
    Debit,
    /// Credit side - the natural side of Liabilities, Equity and Income
    Credit,
}

impl fmt::Display for AccountSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSide::Debit => f.write_str("DR"),
            AccountSide::Credit => f.write_str("CR"),
        }
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

identifier!(
    /// Unique identity of an account
    AccountId
);
identifier!(
    /// Unique identity of a single entry
    EntryId
);
identifier!(
    /// Unique identity of a transaction
    TransactionId
);

/// Descriptive metadata attached to an entry
///
/// Opaque to the balance math; only compared and hashed as part of entry equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EntryAttributes {
    /// Free-text narration, e.g. "Invoice 10 Television set"
    pub narration: String,
    /// Optional remarks
    pub remarks: Option<String>,
    /// Optional external reference (invoice number, cheque number, etc.)
    pub reference: Option<String>,
    /// Additional string tags
    pub tags: BTreeMap<String, String>,
}

impl EntryAttributes {
    /// Create attributes carrying only a narration
    pub fn new(narration: impl Into<String>) -> Self {
        Self {
            narration: narration.into(),
            ..Self::default()
        }
    }

    /// Set the remarks
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Set the external reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Add a string tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Look up a tag by key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

impl fmt::Display for EntryAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.narration)?;
        if let Some(reference) = &self.reference {
            write!(f, " [{}]", reference)?;
        }
        Ok(())
    }
}

/// Identifying attributes of an account, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountAttributes {
    /// Human-readable account name
    pub name: String,
    /// Account number
    pub number: String,
    /// Entries dated before this day are rejected
    pub opening_date: NaiveDate,
}

impl AccountAttributes {
    /// Create account attributes
    pub fn new(name: impl Into<String>, number: impl Into<String>, opening_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            opening_date,
        }
    }
}

/// Result of a balance query: an amount and the side it sits on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountBalance {
    amount: Money,
    side: AccountSide,
}

impl AccountBalance {
    /// Create a balance value
    pub fn new(amount: Money, side: AccountSide) -> Self {
        Self { amount, side }
    }

    /// The balance amount
    pub fn amount(&self) -> &Money {
        &self.amount
    }

    /// The side the balance is expressed on
    pub fn side(&self) -> AccountSide {
        self.side
    }
}

impl fmt::Display for AccountBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.amount(), self.side)
    }
}

/// Errors that can occur in the bookkeeping engine
///
/// Every variant is a business-rule rejection; none leave partial state behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Booking date {booking_date} is earlier than the account opening date {opening_date}")]
    UntimelyBookingDate {
        booking_date: NaiveDate,
        opening_date: NaiveDate,
    },
    #[error("Mismatched currency: expected {expected} but found {found}")]
    MismatchedCurrency { expected: Currency, found: Currency },
    #[error("Immutable entry: {0}")]
    ImmutableEntry(String),
    #[error("Unable to post: {} exceed {} by {difference}", side_plural(.heavier), other_side_plural(.heavier))]
    UnableToPost {
        heavier: AccountSide,
        difference: BigDecimal,
    },
    #[error("Account {0} is no longer available")]
    AccountUnavailable(AccountId),
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

fn side_plural(side: &AccountSide) -> &'static str {
    match side {
        AccountSide::Debit => "debits",
        AccountSide::Credit => "credits",
    }
}

fn other_side_plural(side: &AccountSide) -> &'static str {
    match side {
        AccountSide::Debit => "credits",
        AccountSide::Credit => "debits",
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
