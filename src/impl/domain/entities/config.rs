use chrono::{FixedOffset, Offset as _, Utc};
use iso_currency::Currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Deserialize)]
pub enum SymbolPosition {
    Before,
    After,
}

/// How lines with a negative quantity (credit-note-like lines) are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Deserialize)]
pub enum NegativeQuantityPolicy {
    /// Same arithmetic as positive lines, producing a negative payout.
    Clawback,
    /// The line does not qualify and never reaches the ledger.
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub currency: Currency,
    pub position: SymbolPosition,
    pub decimal_places: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionConfig {
    pub currency_format: CurrencyFormat,
    pub negative_quantities: NegativeQuantityPolicy,
    /// Offset used when displaying payment timestamps.
    pub display_offset: FixedOffset,
}

// --

impl CurrencyFormat {
    /// Standard format for the currency: ISO exponent as decimal places
    /// (ex. JPY = 0, USD = 2), symbol after the amount.
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            position: SymbolPosition::After,
            decimal_places: currency.exponent().unwrap_or(0) as u32,
        }
    }

    pub fn with_position(mut self, position: SymbolPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_decimal_places(mut self, decimal_places: u32) -> Self {
        self.decimal_places = decimal_places;
        self
    }
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            currency_format: CurrencyFormat::new(Currency::USD),
            negative_quantities: NegativeQuantityPolicy::Clawback,
            display_offset: Utc.fix(),
        }
    }
}
