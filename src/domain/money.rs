use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits every stored amount carries.
pub const AMOUNT_SCALE: u32 = 2;

/// Represents a positive monetary amount with two decimal places precision.
///
/// This is a wrapper around `rust_decimal::Decimal` so that payment and refund
/// amounts can never be zero, negative or carry sub-cent digits. Values are
/// never rounded: `10.004` is rejected rather than charged as `10.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Checks `value` is positive and has at most two decimal places, and
    /// fixes its scale to cents.
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value <= Decimal::ZERO {
            return Err(PaymentError::InvalidInput(
                "Amount must be greater than 0".to_string(),
            ));
        }
        if !has_cent_precision(value) {
            return Err(PaymentError::InvalidInput(format!(
                "Amount cannot have more than {} decimal places",
                AMOUNT_SCALE
            )));
        }
        let mut cents = value;
        cents.rescale(AMOUNT_SCALE);
        Ok(Self(cents))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Whether `value` is representable in whole cents without rounding.
pub fn has_cent_precision(value: Decimal) -> bool {
    value.normalize().scale() <= AMOUNT_SCALE
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "CRC")]
    Crc,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Gbp, Currency::Crc];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Crc => "CRC",
        }
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    /// Parses an ISO code, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                PaymentError::InvalidInput("Currency must be USD, EUR, GBP, or CRC".to_string())
            })
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
