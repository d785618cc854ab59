use std::str::FromStr;

use chrono::NaiveDate;
use fractic_server_error::ServerError;

use crate::errors::InvalidIsoDate;

#[derive(Debug)]
pub(crate) struct ISODateModel(NaiveDate);
impl FromStr for ISODateModel {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| InvalidIsoDate::with_debug(s, &e))?;
        Ok(ISODateModel(d))
    }
}

impl From<ISODateModel> for NaiveDate {
    fn from(m: ISODateModel) -> Self {
        m.0
    }
}
