//! Accounts: currency-scoped containers of entries with a natural balance side

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::ledger::Entry;
use crate::traits::*;
use crate::types::*;
use crate::units::{today, Currency, DateRange, Money};

/// A ledger account
///
/// Identity attributes are fixed at construction. Entries accumulate through
/// [`Account::add_entry`] and are never removed; every stored entry is dated on
/// or after the opening date and denominated in the account currency.
pub struct Account {
    id: AccountId,
    attributes: AccountAttributes,
    currency: Currency,
    side: AccountSide,
    entries: RwLock<HashMap<EntryId, Arc<Entry>>>,
    validator: Box<dyn AccountValidator>,
}

impl Account {
    /// Create a new account
    pub fn new(side: AccountSide, currency: Currency, attributes: AccountAttributes) -> Arc<Self> {
        Self::with_validator(side, currency, attributes, Box::new(DefaultAccountValidator))
    }

    /// Create a new account with a custom validator
    pub fn with_validator(
        side: AccountSide,
        currency: Currency,
        attributes: AccountAttributes,
        validator: Box<dyn AccountValidator>,
    ) -> Arc<Self> {
        let account = Self {
            id: AccountId::new(),
            attributes,
            currency,
            side,
            entries: RwLock::new(HashMap::new()),
            validator,
        };
        tracing::debug!(
            account = %account.id,
            name = %account.attributes.name,
            currency = %currency,
            side = %side,
            "account created"
        );
        Arc::new(account)
    }

    /// Check an entry against this account without storing it
    ///
    /// The booking date is checked before the currency.
    pub fn validate_entry(&self, entry: &Entry) -> LedgerResult<()> {
        if entry.booking_date() < self.attributes.opening_date {
            return Err(LedgerError::UntimelyBookingDate {
                booking_date: entry.booking_date(),
                opening_date: self.attributes.opening_date,
            });
        }

        if entry.currency() != self.currency {
            return Err(LedgerError::MismatchedCurrency {
                expected: self.currency,
                found: entry.currency(),
            });
        }

        self.validator.validate_entry(self, entry)
    }

    /// Validate and store an entry
    ///
    /// Adding an entry that is already stored is a no-op.
    pub fn add_entry(&self, entry: Arc<Entry>) -> LedgerResult<()> {
        self.validate_entry(&entry)?;
        self.store(entry);
        Ok(())
    }

    /// Store an entry that has already passed [`Account::validate_entry`]
    pub(crate) fn store(&self, entry: Arc<Entry>) {
        tracing::debug!(
            account = %self.id,
            entry = %entry.id(),
            booking_date = %entry.booking_date(),
            amount = %entry.amount(),
            "entry accepted"
        );
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.id(), entry);
    }

    /// Balance of the entries booked within `range`
    pub fn balance_in(&self, range: &DateRange) -> AccountBalance {
        let total: BigDecimal = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| range.includes(entry.booking_date()))
            .map(|entry| entry.amount().amount())
            .sum();

        AccountBalance::new(Money::new(total, self.currency), self.side)
    }

    /// Balance from the opening date up to and including `as_at`
    pub fn balance_as_at(&self, as_at: NaiveDate) -> AccountBalance {
        self.balance_in(&DateRange::new(self.attributes.opening_date, as_at))
    }

    /// Balance as at today
    pub fn balance(&self) -> AccountBalance {
        self.balance_as_at(today())
    }

    /// Snapshot of the stored entries, ordered by booking date
    pub fn entries(&self) -> Vec<Arc<Entry>> {
        let mut entries: Vec<Arc<Entry>> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.booking_date());
        entries
    }

    /// Whether the entry with this id has been stored
    pub fn contains(&self, entry_id: EntryId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&entry_id)
    }

    /// Unique identity of the account
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Human-readable account name
    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    /// Identifying attributes fixed at construction
    pub fn attributes(&self) -> &AccountAttributes {
        &self.attributes
    }

    /// Currency every entry must be denominated in
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Earliest booking date the account accepts
    pub fn opening_date(&self) -> NaiveDate {
        self.attributes.opening_date
    }

    /// Natural balance side of the account
    pub fn side(&self) -> AccountSide {
        self.side
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .field("currency", &self.currency)
            .field("side", &self.side)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.attributes.number, self.attributes.name)
    }
}
