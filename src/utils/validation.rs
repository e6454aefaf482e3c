//! Validation utilities

use bigdecimal::{BigDecimal, Zero};
use std::collections::HashSet;
use std::sync::Arc;

use crate::ledger::Entry;
use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::zero() {
        Err(LedgerError::Validation(format!(
            "Amount must be positive, got {}",
            amount
        )))
    } else {
        Ok(())
    }
}

/// Validate that no account appears twice on the same side
pub fn validate_distinct_postings(entries: &[Arc<Entry>]) -> LedgerResult<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert((entry.account_id(), entry.side())) {
            return Err(LedgerError::Validation(format!(
                "Account '{}' appears multiple times on the {} side of the transaction",
                entry.account_id(),
                entry.side()
            )));
        }
    }

    Ok(())
}
