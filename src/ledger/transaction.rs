//! Transactions: balanced multi-entry postings

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::ledger::{Account, Entry};
use crate::traits::*;
use crate::types::*;
use crate::units::{Currency, Money};

#[derive(Default)]
struct TransactionState {
    currency: Option<Currency>,
    posted: bool,
    entries: Vec<Arc<Entry>>,
}

/// A unit of work that posts entries to several accounts at once
///
/// The currency is bound by the first entry added. Posting succeeds only when
/// debits equal credits and every entry is acceptable to its account; either
/// all entries reach their accounts or none do.
pub struct Transaction {
    id: TransactionId,
    date: NaiveDate,
    state: RwLock<TransactionState>,
    validator: Box<dyn TransactionValidator>,
}

impl Transaction {
    /// Create a new transaction booking its entries on `date`
    pub fn new(date: NaiveDate) -> Self {
        Self::with_validator(date, Box::new(DefaultTransactionValidator))
    }

    /// Create a new transaction with a custom validator
    pub fn with_validator(date: NaiveDate, validator: Box<dyn TransactionValidator>) -> Self {
        Self {
            id: TransactionId::new(),
            date,
            state: RwLock::new(TransactionState::default()),
            validator,
        }
    }

    /// Add an entry on `side` of the transaction
    pub fn add_entry(
        &self,
        side: AccountSide,
        amount: Money,
        account: &Arc<Account>,
        attributes: EntryAttributes,
    ) -> LedgerResult<Arc<Entry>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.posted {
            return Err(LedgerError::ImmutableEntry(format!(
                "cannot add an entry to transaction {}, it has already been posted",
                self.id
            )));
        }

        match state.currency {
            None => {
                if amount.currency() != account.currency() {
                    return Err(LedgerError::MismatchedCurrency {
                        expected: account.currency(),
                        found: amount.currency(),
                    });
                }
                state.currency = Some(account.currency());
            }
            Some(currency) => {
                for found in [account.currency(), amount.currency()] {
                    if found != currency {
                        return Err(LedgerError::MismatchedCurrency {
                            expected: currency,
                            found,
                        });
                    }
                }
            }
        }

        let entry = Arc::new(Entry::directed(
            side, account, amount, self.date, attributes, self.id,
        ));
        state.entries.push(Arc::clone(&entry));
        Ok(entry)
    }

    /// Commit every entry to its account
    ///
    /// Fails with [`LedgerError::UnableToPost`] when debits and credits differ.
    /// Every entry is checked against its account before any is stored, so a
    /// failed post leaves all accounts untouched and the transaction open.
    /// Account validators see each account as it was before the transaction.
    pub fn post(&self) -> LedgerResult<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.posted {
            return Err(LedgerError::ImmutableEntry(format!(
                "transaction {} has already been posted",
                self.id
            )));
        }

        let delta = side_total(&state.entries, AccountSide::Debit)
            - side_total(&state.entries, AccountSide::Credit);
        if !delta.is_zero() {
            let heavier = if delta > BigDecimal::zero() {
                AccountSide::Debit
            } else {
                AccountSide::Credit
            };
            return Err(LedgerError::UnableToPost {
                heavier,
                difference: delta.abs(),
            });
        }

        self.validator.validate_entries(&state.entries)?;

        let mut targets = Vec::with_capacity(state.entries.len());
        for entry in &state.entries {
            let account = entry.account()?;
            account.validate_entry(entry)?;
            targets.push(account);
        }

        for (entry, account) in state.entries.iter().zip(&targets) {
            account.store(Arc::clone(entry));
        }

        state.posted = true;
        tracing::info!(
            transaction = %self.id,
            date = %self.date,
            entries = state.entries.len(),
            "transaction posted"
        );
        Ok(())
    }

    /// Snapshot of the entries added so far
    pub fn entries(&self) -> Vec<Arc<Entry>> {
        self.read_state().entries.clone()
    }

    /// Sum of the debit entries
    pub fn total_debits(&self) -> BigDecimal {
        side_total(&self.read_state().entries, AccountSide::Debit)
    }

    /// Sum of the credit entries
    pub fn total_credits(&self) -> BigDecimal {
        side_total(&self.read_state().entries, AccountSide::Credit)
    }

    /// Check if the transaction is balanced (debits = credits)
    pub fn is_balanced(&self) -> bool {
        let state = self.read_state();
        side_total(&state.entries, AccountSide::Debit)
            == side_total(&state.entries, AccountSide::Credit)
    }

    /// The currency bound by the first entry, if any
    pub fn currency(&self) -> Option<Currency> {
        self.read_state().currency
    }

    /// Whether the transaction has been posted
    pub fn is_posted(&self) -> bool {
        self.read_state().posted
    }

    /// Unique identity of the transaction
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Booking date applied to every entry
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, TransactionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn side_total(entries: &[Arc<Entry>], side: AccountSide) -> BigDecimal {
    entries
        .iter()
        .filter(|entry| entry.side() == side)
        .map(|entry| entry.amount().amount())
        .sum()
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("date", &self.date)
            .field("currency", &state.currency)
            .field("posted", &state.posted)
            .field("entries", &state.entries)
            .finish_non_exhaustive()
    }
}

/// Common two-legged transaction patterns
///
/// Each returns an unposted transaction; call [`Transaction::post`] to commit it.
pub mod patterns {
    use super::*;

    fn two_legged(
        date: NaiveDate,
        debit_account: &Arc<Account>,
        credit_account: &Arc<Account>,
        amount: Money,
        attributes: EntryAttributes,
    ) -> LedgerResult<Transaction> {
        let transaction = Transaction::new(date);
        transaction.add_entry(
            AccountSide::Debit,
            amount.clone(),
            debit_account,
            attributes.clone(),
        )?;
        transaction.add_entry(AccountSide::Credit, amount, credit_account, attributes)?;
        Ok(transaction)
    }

    /// Simple payment (debit expense, credit cash)
    pub fn expense_payment(
        date: NaiveDate,
        expense_account: &Arc<Account>,
        cash_account: &Arc<Account>,
        amount: Money,
        attributes: EntryAttributes,
    ) -> LedgerResult<Transaction> {
        two_legged(date, expense_account, cash_account, amount, attributes)
    }

    /// Sale (debit cash or receivables, credit revenue)
    pub fn sale(
        date: NaiveDate,
        cash_or_receivables_account: &Arc<Account>,
        revenue_account: &Arc<Account>,
        amount: Money,
        attributes: EntryAttributes,
    ) -> LedgerResult<Transaction> {
        two_legged(
            date,
            cash_or_receivables_account,
            revenue_account,
            amount,
            attributes,
        )
    }

    /// Owner investment (debit cash, credit equity)
    pub fn owner_investment(
        date: NaiveDate,
        cash_account: &Arc<Account>,
        equity_account: &Arc<Account>,
        amount: Money,
        attributes: EntryAttributes,
    ) -> LedgerResult<Transaction> {
        two_legged(date, cash_account, equity_account, amount, attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::EntryKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn money(amount: &str, code: &str) -> Money {
        Money::parse(amount, Currency::new(code).unwrap()).unwrap()
    }

    fn kes(amount: &str) -> Money {
        money(amount, "KES")
    }

    fn account(name: &str, side: AccountSide, code: &str) -> Arc<Account> {
        Account::new(
            side,
            Currency::new(code).unwrap(),
            AccountAttributes::new(name, name, date(2017, 1, 1)),
        )
    }

    fn details(narration: &str) -> EntryAttributes {
        EntryAttributes::new(narration)
    }

    #[test]
    fn test_balanced_transaction_posts() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let payables = account("payables", AccountSide::Credit, "KES");
        let transaction = Transaction::new(date(2018, 1, 10));

        let debit = transaction
            .add_entry(AccountSide::Debit, kes("100"), &cash, details("in"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Credit, kes("100"), &payables, details("out"))
            .unwrap();

        assert_eq!(transaction.currency(), Currency::new("KES").ok());
        assert!(transaction.is_balanced());
        transaction.post().unwrap();

        assert!(transaction.is_posted());
        assert!(cash.contains(debit.id()));
        assert_eq!(debit.kind(), EntryKind::Transactional(transaction.id()));
        assert_eq!(debit.booking_date(), date(2018, 1, 10));
        assert_eq!(cash.balance_as_at(date(2018, 1, 10)).amount(), &kes("100"));
        assert_eq!(payables.balance_as_at(date(2018, 1, 10)).amount(), &kes("100"));
        assert_eq!(
            payables.balance_as_at(date(2018, 1, 10)).side(),
            AccountSide::Credit
        );
    }

    #[test]
    fn test_unbalanced_transaction_is_rejected() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let payables = account("payables", AccountSide::Credit, "KES");
        let transaction = Transaction::new(date(2018, 1, 10));
        transaction
            .add_entry(AccountSide::Debit, kes("100"), &cash, details("in"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Credit, kes("80"), &payables, details("out"))
            .unwrap();

        let err = transaction.post().unwrap_err();
        assert_eq!(
            err,
            LedgerError::UnableToPost {
                heavier: AccountSide::Debit,
                difference: BigDecimal::from(20),
            }
        );
        assert_eq!(err.to_string(), "Unable to post: debits exceed credits by 20");
        assert!(!transaction.is_posted());
        assert!(cash.entries().is_empty());
        assert!(payables.entries().is_empty());
    }

    #[test]
    fn test_credit_heavy_transaction_reports_credits() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let payables = account("payables", AccountSide::Credit, "KES");
        let transaction = Transaction::new(date(2018, 1, 10));
        transaction
            .add_entry(AccountSide::Debit, kes("10.50"), &cash, details("in"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Credit, kes("12.75"), &payables, details("out"))
            .unwrap();

        assert_eq!(
            transaction.post().unwrap_err(),
            LedgerError::UnableToPost {
                heavier: AccountSide::Credit,
                difference: "2.25".parse().unwrap(),
            }
        );
    }

    #[test]
    fn test_failed_post_can_be_corrected() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let payables = account("payables", AccountSide::Credit, "KES");
        let transaction = Transaction::new(date(2018, 1, 10));
        transaction
            .add_entry(AccountSide::Debit, kes("100"), &cash, details("in"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Credit, kes("80"), &payables, details("out"))
            .unwrap();
        assert!(transaction.post().is_err());

        transaction
            .add_entry(AccountSide::Credit, kes("20"), &payables, details("fee"))
            .unwrap();
        transaction.post().unwrap();

        assert_eq!(transaction.entries().len(), 3);
        assert_eq!(payables.balance().amount(), &kes("100"));
    }

    #[test]
    fn test_first_entry_currency_must_match_account() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let transaction = Transaction::new(date(2018, 1, 10));

        let err = transaction
            .add_entry(AccountSide::Debit, money("5", "USD"), &cash, details("x"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::MismatchedCurrency { .. }));
        assert_eq!(transaction.currency(), None);
        assert!(transaction.entries().is_empty());
    }

    #[test]
    fn test_later_entries_must_match_bound_currency() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let dollars = account("dollars", AccountSide::Credit, "USD");
        let transaction = Transaction::new(date(2018, 1, 10));
        transaction
            .add_entry(AccountSide::Debit, kes("5"), &cash, details("x"))
            .unwrap();

        assert_eq!(
            transaction
                .add_entry(AccountSide::Credit, money("5", "USD"), &dollars, details("y"))
                .unwrap_err(),
            LedgerError::MismatchedCurrency {
                expected: Currency::new("KES").unwrap(),
                found: Currency::new("USD").unwrap(),
            }
        );
        assert!(transaction
            .add_entry(AccountSide::Credit, money("5", "USD"), &cash, details("z"))
            .is_err());
        assert_eq!(transaction.entries().len(), 1);
    }

    #[test]
    fn test_posted_transaction_is_closed() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let payables = account("payables", AccountSide::Credit, "KES");
        let transaction = Transaction::new(date(2018, 1, 10));
        transaction
            .add_entry(AccountSide::Debit, kes("1"), &cash, details("a"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Credit, kes("1"), &payables, details("b"))
            .unwrap();
        transaction.post().unwrap();

        assert!(matches!(
            transaction.add_entry(AccountSide::Debit, kes("1"), &cash, details("c")),
            Err(LedgerError::ImmutableEntry(_))
        ));
        assert!(matches!(
            transaction.post(),
            Err(LedgerError::ImmutableEntry(_))
        ));
        assert_eq!(cash.entries().len(), 1);
    }

    #[test]
    fn test_empty_transaction_posted_is_closed_to_additions() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let transaction = Transaction::new(date(2018, 1, 10));
        transaction.post().unwrap();

        assert!(matches!(
            transaction.add_entry(AccountSide::Debit, kes("1"), &cash, details("late")),
            Err(LedgerError::ImmutableEntry(_))
        ));
        assert_eq!(transaction.currency(), None);
    }

    #[test]
    fn test_account_rejection_commits_nothing() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let late = Account::new(
            AccountSide::Credit,
            Currency::new("KES").unwrap(),
            AccountAttributes::new("late", "9", date(2019, 1, 1)),
        );
        let transaction = Transaction::new(date(2018, 1, 10));
        transaction
            .add_entry(AccountSide::Debit, kes("50"), &cash, details("a"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Credit, kes("50"), &late, details("b"))
            .unwrap();

        assert!(matches!(
            transaction.post(),
            Err(LedgerError::UntimelyBookingDate { .. })
        ));
        assert!(!transaction.is_posted());
        assert!(cash.entries().is_empty());
        assert!(late.entries().is_empty());
    }

    #[test]
    fn test_dropped_account_commits_nothing() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let payables = account("payables", AccountSide::Credit, "KES");
        let transaction = Transaction::new(date(2018, 1, 10));
        transaction
            .add_entry(AccountSide::Debit, kes("1"), &cash, details("a"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Credit, kes("1"), &payables, details("b"))
            .unwrap();
        let payables_id = payables.id();
        drop(payables);

        assert_eq!(
            transaction.post().unwrap_err(),
            LedgerError::AccountUnavailable(payables_id)
        );
        assert!(cash.entries().is_empty());
    }

    #[test]
    fn test_enhanced_validator() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let transaction =
            Transaction::with_validator(date(2018, 1, 10), Box::new(EnhancedTransactionValidator));
        transaction
            .add_entry(AccountSide::Debit, kes("0"), &cash, details("a"))
            .unwrap();

        assert!(matches!(
            transaction.post(),
            Err(LedgerError::Validation(_))
        ));

        transaction
            .add_entry(AccountSide::Credit, kes("0"), &cash, details("b"))
            .unwrap();
        assert!(matches!(
            transaction.post(),
            Err(LedgerError::Validation(_))
        ));
        assert!(cash.entries().is_empty());
    }

    #[test]
    fn test_enhanced_validator_rejects_repeated_postings() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let payables = account("payables", AccountSide::Credit, "KES");
        let transaction =
            Transaction::with_validator(date(2018, 1, 10), Box::new(EnhancedTransactionValidator));
        transaction
            .add_entry(AccountSide::Debit, kes("1"), &cash, details("a"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Debit, kes("1"), &cash, details("b"))
            .unwrap();
        transaction
            .add_entry(AccountSide::Credit, kes("2"), &payables, details("c"))
            .unwrap();

        assert!(matches!(
            transaction.post(),
            Err(LedgerError::Validation(_))
        ));
    }

    struct BalanceLimit(BigDecimal);

    impl AccountValidator for BalanceLimit {
        fn validate_entry(&self, account: &Account, entry: &Entry) -> LedgerResult<()> {
            let projected = account.balance().amount().amount() + entry.amount().amount();
            if projected > self.0 {
                return Err(LedgerError::Validation("limit".to_string()));
            }
            Ok(())
        }
    }

    fn limited(name: &str, side: AccountSide) -> Arc<Account> {
        Account::with_validator(
            side,
            Currency::new("KES").unwrap(),
            AccountAttributes::new(name, name, date(2017, 1, 1)),
            Box::new(BalanceLimit(BigDecimal::from(100))),
        )
    }

    #[test]
    fn test_state_dependent_validator_commits_all_or_nothing() {
        let assets = limited("assets", AccountSide::Debit);
        let payables = limited("payables", AccountSide::Credit);

        let within = Transaction::new(date(2018, 1, 10));
        within
            .add_entry(AccountSide::Debit, kes("60"), &assets, details("a"))
            .unwrap();
        within
            .add_entry(AccountSide::Debit, kes("30"), &assets, details("b"))
            .unwrap();
        within
            .add_entry(AccountSide::Credit, kes("90"), &payables, details("c"))
            .unwrap();
        within.post().unwrap();
        assert_eq!(assets.entries().len(), 2);
        assert_eq!(payables.entries().len(), 1);

        let over = Transaction::new(date(2018, 1, 11));
        over.add_entry(AccountSide::Debit, kes("5"), &assets, details("d"))
            .unwrap();
        over.add_entry(AccountSide::Debit, kes("20"), &assets, details("e"))
            .unwrap();
        over.add_entry(AccountSide::Credit, kes("25"), &payables, details("f"))
            .unwrap();

        assert_eq!(
            over.post().unwrap_err(),
            LedgerError::Validation("limit".to_string())
        );
        assert!(!over.is_posted());
        assert_eq!(assets.entries().len(), 2);
        assert_eq!(payables.entries().len(), 1);
        assert_eq!(assets.balance().amount(), &kes("90"));
    }

    #[test]
    fn test_patterns() {
        let cash = account("cash", AccountSide::Debit, "KES");
        let equity = account("equity", AccountSide::Credit, "KES");
        let revenue = account("revenue", AccountSide::Credit, "KES");

        patterns::owner_investment(date(2018, 1, 1), &cash, &equity, kes("1000"), details("capital"))
            .unwrap()
            .post()
            .unwrap();
        let sale = patterns::sale(date(2018, 1, 2), &cash, &revenue, kes("150"), details("sale"))
            .unwrap();

        assert_eq!(sale.total_debits(), BigDecimal::from(150));
        assert_eq!(sale.total_credits(), BigDecimal::from(150));
        sale.post().unwrap();

        assert_eq!(cash.balance_as_at(date(2018, 1, 31)).amount(), &kes("1150"));
        assert_eq!(equity.balance_as_at(date(2018, 1, 31)).amount(), &kes("1000"));
        assert_eq!(revenue.balance_as_at(date(2018, 1, 31)).amount(), &kes("150"));
    }
}
