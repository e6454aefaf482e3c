//! Basic ledger usage example

use std::sync::Arc;

use bookkeeper_core::{
    patterns, Account, AccountAttributes, AccountSide, Currency, Entry, EntryAttributes, Money,
    Transaction,
};
use chrono::NaiveDate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Bookkeeper Core - Basic Ledger Example\n");

    let kes = Currency::new("KES")?;
    let opened = NaiveDate::from_ymd_opt(2017, 5, 12).ok_or("invalid date")?;

    // 1. Open a few accounts
    let cash = Account::new(
        AccountSide::Debit,
        kes,
        AccountAttributes::new("Cash", "1000", opened),
    );
    let electronics = Account::new(
        AccountSide::Debit,
        kes,
        AccountAttributes::new("Electronics", "001548418", opened),
    );
    let equity = Account::new(
        AccountSide::Credit,
        kes,
        AccountAttributes::new("Owner's Equity", "3000", opened),
    );
    for account in [&cash, &electronics, &equity] {
        println!("  Opened {} ({}, {})", account, account.currency(), account.side());
    }
    println!();

    // 2. Owner invests cash
    let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).ok_or("invalid date");
    patterns::owner_investment(
        day(2018, 1, 2)?,
        &cash,
        &equity,
        Money::parse("50000", kes)?,
        EntryAttributes::new("Initial owner investment"),
    )?
    .post()?;
    println!("  Recorded owner investment of 50000 KES");

    // 3. Buy a television, balanced against cash
    let purchase = Transaction::new(day(2018, 2, 12)?);
    let price = Money::parse("105.23", kes)?;
    purchase.add_entry(
        AccountSide::Debit,
        price.clone(),
        &electronics,
        EntryAttributes::new("Television set").with_reference("inv 10"),
    )?;
    purchase.add_entry(
        AccountSide::Credit,
        price,
        &cash,
        EntryAttributes::new("Paid for television"),
    )?;
    purchase.post()?;
    println!("  Recorded television purchase");

    // 4. An unbalanced transaction is refused
    let broken = Transaction::new(day(2018, 2, 15)?);
    broken.add_entry(
        AccountSide::Debit,
        Money::parse("100", kes)?,
        &electronics,
        EntryAttributes::new("Fridge"),
    )?;
    broken.add_entry(
        AccountSide::Credit,
        Money::parse("80", kes)?,
        &cash,
        EntryAttributes::new("Part payment"),
    )?;
    if let Err(err) = broken.post() {
        println!("  Refused: {}", err);
    }

    // 5. A standalone entry that predates the account is logged and dropped
    let untimely = Arc::new(Entry::new(
        &electronics,
        EntryAttributes::new("Backdated radio"),
        Money::parse("12", kes)?,
        day(2016, 1, 1)?,
    ));
    untimely.post();
    if let Err(err) = untimely.try_post() {
        println!("  Refused: {}", err);
    }
    println!();

    // 6. Balances
    println!("Balances as at 2018-02-28:");
    let as_at = day(2018, 2, 28)?;
    for account in [&cash, &electronics, &equity] {
        println!("  {:<20} {}", account.name(), account.balance_as_at(as_at));
    }

    Ok(())
}
