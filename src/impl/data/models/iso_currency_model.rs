use std::str::FromStr;

use fractic_server_error::ServerError;
use iso_currency::Currency;

use crate::errors::InvalidIsoCurrencyCode;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ISOCurrencyModel(Currency);
impl FromStr for ISOCurrencyModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(&s.trim().to_uppercase())
            .map(ISOCurrencyModel)
            .ok_or_else(|| InvalidIsoCurrencyCode::new(s))
    }
}

impl From<ISOCurrencyModel> for Currency {
    fn from(m: ISOCurrencyModel) -> Self {
        m.0
    }
}
