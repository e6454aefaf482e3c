//! Entries: single postings of an amount to an account on a date

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, Weak};

use chrono::NaiveDate;

use crate::ledger::Account;
use crate::types::*;
use crate::units::{Currency, Money};

/// Where an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Created directly by the caller against one account
    Standalone,
    /// Created by a transaction, which assigned its side
    Transactional(TransactionId),
}

/// A single posting of an amount to an account
///
/// Amount, booking date, account and side are fixed at construction. The
/// attributes may be written exactly once: the first write closes the entry
/// and any later write fails with [`LedgerError::ImmutableEntry`].
pub struct Entry {
    id: EntryId,
    account_id: AccountId,
    account: Weak<Account>,
    amount: Money,
    booking_date: NaiveDate,
    side: AccountSide,
    kind: EntryKind,
    attributes: OnceLock<EntryAttributes>,
}

impl Entry {
    /// Create a standalone entry, closed with the given attributes
    pub fn new(
        account: &Arc<Account>,
        attributes: EntryAttributes,
        amount: Money,
        booking_date: NaiveDate,
    ) -> Self {
        let entry = Self::build(
            account,
            amount,
            booking_date,
            account.side(),
            EntryKind::Standalone,
            Some(attributes),
        );
        tracing::debug!(entry = %entry.id, account = %entry.account_id, "standalone entry created");
        entry
    }

    /// Create a standalone entry whose attributes have not been written yet
    pub fn open(account: &Arc<Account>, amount: Money, booking_date: NaiveDate) -> Self {
        Self::build(
            account,
            amount,
            booking_date,
            account.side(),
            EntryKind::Standalone,
            None,
        )
    }

    pub(crate) fn directed(
        side: AccountSide,
        account: &Arc<Account>,
        amount: Money,
        booking_date: NaiveDate,
        attributes: EntryAttributes,
        transaction: TransactionId,
    ) -> Self {
        let entry = Self::build(
            account,
            amount,
            booking_date,
            side,
            EntryKind::Transactional(transaction),
            Some(attributes),
        );
        tracing::debug!(
            entry = %entry.id,
            account = %entry.account_id,
            transaction = %transaction,
            side = %side,
            "transaction entry created"
        );
        entry
    }

    fn build(
        account: &Arc<Account>,
        amount: Money,
        booking_date: NaiveDate,
        side: AccountSide,
        kind: EntryKind,
        attributes: Option<EntryAttributes>,
    ) -> Self {
        let cell = OnceLock::new();
        if let Some(attributes) = attributes {
            let _ = cell.set(attributes);
        }

        Self {
            id: EntryId::new(),
            account_id: account.id(),
            account: Arc::downgrade(account),
            amount,
            booking_date,
            side,
            kind,
            attributes: cell,
        }
    }

    /// Create a new entry of the same kind, bound to `account`
    ///
    /// Transaction entries keep this entry's side and transaction; standalone
    /// entries take the side of the new account. This entry is left untouched.
    pub fn new_entry(
        &self,
        account: &Arc<Account>,
        attributes: EntryAttributes,
        amount: Money,
        booking_date: NaiveDate,
    ) -> Entry {
        match self.kind {
            EntryKind::Standalone => Entry::new(account, attributes, amount, booking_date),
            EntryKind::Transactional(transaction) => Entry::directed(
                self.side,
                account,
                amount,
                booking_date,
                attributes,
                transaction,
            ),
        }
    }

    /// Write the attributes, closing the entry
    pub fn set_attributes(&self, attributes: EntryAttributes) -> LedgerResult<()> {
        self.attributes.set(attributes).map_err(|_| {
            LedgerError::ImmutableEntry(format!(
                "entry {} is closed, its attributes cannot be changed",
                self.id
            ))
        })
    }

    /// Submit this entry to its account, logging instead of failing
    ///
    /// A rejected entry is reported through `tracing` at error level and simply
    /// not posted; callers that need to react use [`Entry::try_post`].
    pub fn post(self: &Arc<Self>) {
        if let Err(err) = self.try_post() {
            match &err {
                LedgerError::UntimelyBookingDate { opening_date, .. } => tracing::error!(
                    entry = %self.id,
                    account = %self.account_id,
                    booking_date = %self.booking_date,
                    opening_date = %opening_date,
                    "entry not posted: booking date precedes the account opening date"
                ),
                LedgerError::MismatchedCurrency { expected, found } => tracing::error!(
                    entry = %self.id,
                    account = %self.account_id,
                    currency = %found,
                    account_currency = %expected,
                    "entry not posted: currency does not match the account"
                ),
                other => tracing::error!(
                    entry = %self.id,
                    account = %self.account_id,
                    error = %other,
                    "entry not posted"
                ),
            }
        }
    }

    /// Submit this entry to its account, propagating any rejection
    pub fn try_post(self: &Arc<Self>) -> LedgerResult<()> {
        self.account()?.add_entry(Arc::clone(self))
    }

    /// The account this entry targets, if it is still alive
    pub fn account(&self) -> LedgerResult<Arc<Account>> {
        self.account
            .upgrade()
            .ok_or(LedgerError::AccountUnavailable(self.account_id))
    }

    /// Unique identity of the entry
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Identity of the target account
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// The amount posted
    pub fn amount(&self) -> &Money {
        &self.amount
    }

    /// Currency of the amount
    pub fn currency(&self) -> Currency {
        self.amount.currency()
    }

    /// Day the entry is effective
    pub fn booking_date(&self) -> NaiveDate {
        self.booking_date
    }

    /// Side of the double entry this posting sits on
    pub fn side(&self) -> AccountSide {
        self.side
    }

    /// Whether the entry is standalone or belongs to a transaction
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The attributes, once written
    pub fn attributes(&self) -> Option<&EntryAttributes> {
        self.attributes.get()
    }

    /// Whether the attributes have been written
    pub fn is_closed(&self) -> bool {
        self.attributes.get().is_some()
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.attributes.get() == other.attributes.get()
            && self.booking_date == other.booking_date
            && self.account_id == other.account_id
            && self.amount == other.amount
    }
}

impl Eq for Entry {}

impl Hash for Entry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.attributes.get().hash(state);
        self.booking_date.hash(state);
        self.account_id.hash(state);
        self.amount.hash(state);
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("account", &self.account_id)
            .field("amount", &self.amount)
            .field("booking_date", &self.booking_date)
            .field("side", &self.side)
            .field("kind", &self.kind)
            .field("attributes", &self.attributes.get())
            .finish()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.booking_date, self.side, self.amount)?;
        if let Some(attributes) = self.attributes.get() {
            write!(f, " {}", attributes)?;
        }
        Ok(())
    }
}
