use std::str::FromStr as _;

use chrono::FixedOffset;
use fractic_server_error::ServerError;
use ron::from_str;

use crate::{
    data::models::iso_currency_model::ISOCurrencyModel,
    entities::{CommissionConfig, CurrencyFormat, NegativeQuantityPolicy, SymbolPosition},
    errors::{InvalidCode, InvalidRon},
};

/// RON form of `CommissionConfig`. Every field can be left out.
#[derive(Debug, serde_derive::Deserialize)]
#[serde(default, rename = "CommissionConfig")]
pub(crate) struct CommissionConfigModel {
    currency: String,
    symbol_position: SymbolPosition,
    /// `None` uses the ISO exponent of the currency.
    decimal_places: Option<u32>,
    negative_quantities: NegativeQuantityPolicy,
    utc_offset_minutes: i32,
}

impl Default for CommissionConfigModel {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            symbol_position: SymbolPosition::After,
            decimal_places: None,
            negative_quantities: NegativeQuantityPolicy::Clawback,
            utc_offset_minutes: 0,
        }
    }
}

impl CommissionConfigModel {
    pub(crate) fn from_ron(s: &str) -> Result<Self, ServerError> {
        from_str(s).map_err(|e| InvalidRon::with_debug("CommissionConfig", &e))
    }
}

impl TryFrom<CommissionConfigModel> for CommissionConfig {
    type Error = ServerError;

    fn try_from(m: CommissionConfigModel) -> Result<Self, Self::Error> {
        let mut currency_format =
            CurrencyFormat::new(ISOCurrencyModel::from_str(&m.currency)?.into())
                .with_position(m.symbol_position);
        if let Some(places) = m.decimal_places {
            currency_format = currency_format.with_decimal_places(places);
        }
        let display_offset = FixedOffset::east_opt(m.utc_offset_minutes * 60).ok_or_else(|| {
            InvalidCode::new("utc_offset_minutes", &m.utc_offset_minutes.to_string())
        })?;
        Ok(CommissionConfig {
            currency_format,
            negative_quantities: m.negative_quantities,
            display_offset,
        })
    }
}
