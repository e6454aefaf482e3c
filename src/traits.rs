//! Traits for pluggable validation rules

use std::sync::Arc;

use crate::ledger::{Account, Entry};
use crate::types::*;
use crate::utils::validation::{validate_distinct_postings, validate_positive_amount};

/// Extra acceptance rules for entries posted into an account
///
/// Runs after the built-in opening-date and currency checks, so implementations
/// can assume both already hold. When a transaction posts, every one of its
/// entries is validated against the account as it was before the transaction;
/// none of its sibling entries are visible yet.
pub trait AccountValidator: Send + Sync {
    /// Validate an entry before the account stores it
    fn validate_entry(&self, account: &Account, entry: &Entry) -> LedgerResult<()>;
}

/// Extra rules checked when a transaction is posted
///
/// Runs after the debits-equal-credits check and before any entry is committed.
pub trait TransactionValidator: Send + Sync {
    /// Validate the pending entries of a transaction
    fn validate_entries(&self, entries: &[Arc<Entry>]) -> LedgerResult<()>;
}

/// Account validator that adds no rules of its own
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_entry(&self, _account: &Account, _entry: &Entry) -> LedgerResult<()> {
        Ok(())
    }
}

/// Account validator that rejects zero and negative amounts
pub struct EnhancedAccountValidator;

impl AccountValidator for EnhancedAccountValidator {
    fn validate_entry(&self, _account: &Account, entry: &Entry) -> LedgerResult<()> {
        validate_positive_amount(entry.amount().amount())
    }
}

/// Transaction validator that adds no rules of its own
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_entries(&self, _entries: &[Arc<Entry>]) -> LedgerResult<()> {
        Ok(())
    }
}

/// Transaction validator with the stricter double-entry rules
///
/// Requires at least two entries, positive amounts, and no account appearing
/// twice on the same side.
pub struct EnhancedTransactionValidator;

impl TransactionValidator for EnhancedTransactionValidator {
    fn validate_entries(&self, entries: &[Arc<Entry>]) -> LedgerResult<()> {
        if entries.len() < 2 {
            return Err(LedgerError::Validation(
                "Transaction must have at least two entries for double-entry bookkeeping"
                    .to_string(),
            ));
        }

        for entry in entries {
            validate_positive_amount(entry.amount().amount())?;
        }

        validate_distinct_postings(entries)
    }
}
