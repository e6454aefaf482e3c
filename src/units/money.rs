//! Currency codes and exact-decimal monetary amounts

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{LedgerError, LedgerResult};

/// Three-letter currency code such as "KES" or "USD"
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// Parse a currency code; it must be exactly three ASCII letters
    pub fn new(code: &str) -> LedgerResult<Self> {
        let code = code.trim();
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(LedgerError::InvalidCurrency(code.to_string()));
        }

        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    /// The code as a string slice
    pub fn code(&self) -> &str {
        // only ever built from ASCII letters
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.code())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A decimal amount denominated in a single currency
///
/// Equality is numeric, so `105.23 KES` equals `105.230 KES`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: BigDecimal,
    currency: Currency,
}

impl Money {
    /// Create an amount in the given currency
    pub fn new(amount: BigDecimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Parse a decimal string such as "105.23"
    pub fn parse(amount: &str, currency: Currency) -> LedgerResult<Self> {
        let amount = BigDecimal::from_str(amount.trim())
            .map_err(|e| LedgerError::InvalidAmount(format!("'{}': {}", amount, e)))?;
        Ok(Self::new(amount, currency))
    }

    /// Zero in the given currency
    pub fn zero(currency: Currency) -> Self {
        Self::new(BigDecimal::zero(), currency)
    }

    /// The decimal amount
    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    /// The currency of the amount
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Whether the amount is exactly zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Absolute value in the same currency
    pub fn abs(&self) -> Self {
        Self::new(self.amount.abs(), self.currency)
    }

    /// Add two amounts of the same currency
    pub fn plus(&self, other: &Money) -> LedgerResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(Self::new(&self.amount + &other.amount, self.currency))
    }

    /// Subtract an amount of the same currency
    pub fn minus(&self, other: &Money) -> LedgerResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(Self::new(&self.amount - &other.amount, self.currency))
    }

    fn ensure_same_currency(&self, other: &Money) -> LedgerResult<()> {
        if self.currency != other.currency {
            return Err(LedgerError::MismatchedCurrency {
                expected: self.currency,
                found: other.currency,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
