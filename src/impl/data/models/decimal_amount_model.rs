use std::str::FromStr;

use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::errors::InvalidDecimalAmount;

/// Decimal read from a spreadsheet-style cell: thousands separators are
/// ignored and a parenthesized value is negative, ex. "(1,250.50)".
#[derive(Debug)]
pub(crate) struct DecimalAmountModel(pub Decimal);
impl FromStr for DecimalAmountModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.replace(",", "");
        let is_negative = raw.trim().starts_with("(") && raw.trim().ends_with(")");
        let numeric_part = raw.trim().trim_matches(|c| c == '(' || c == ')').trim();
        let amount = Decimal::from_str(numeric_part)
            .map_err(|e| InvalidDecimalAmount::with_debug(numeric_part, &e))?;
        Ok(DecimalAmountModel(if is_negative { -amount } else { amount }))
    }
}

impl From<DecimalAmountModel> for Decimal {
    fn from(m: DecimalAmountModel) -> Self {
        m.0
    }
}
