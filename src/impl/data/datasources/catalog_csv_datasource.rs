use std::{collections::HashMap, str::FromStr as _};

use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    data::models::decimal_amount_model::DecimalAmountModel,
    entities::{product, seller, team, ProductRef, Seller, SellerId, ServiceRate, TeamId},
    errors::{InvalidCsv, InvalidCsvContent},
};

pub(crate) trait CatalogCsvDatasource {
    fn service_rates_from_string(
        &self,
        s: &str,
    ) -> Result<HashMap<ProductRef, ServiceRate>, ServerError>;

    fn team_rates_from_string(&self, s: &str) -> Result<HashMap<TeamId, Decimal>, ServerError>;

    fn sellers_from_string(&self, s: &str) -> Result<HashMap<SellerId, Seller>, ServerError>;
}

pub(crate) struct CatalogCsvDatasourceImpl;

fn key_cell<'a>(raw: &'a str, table: &str, row: usize) -> Result<&'a str, ServerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(InvalidCsvContent::new(&format!(
            "{} row {} has an empty key",
            table,
            row + 1
        )))
    } else {
        Ok(trimmed)
    }
}

fn optional_amount(raw: &str) -> Result<Option<Decimal>, ServerError> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(DecimalAmountModel::from_str(raw)?.into()))
    }
}

impl CatalogCsvDatasource for CatalogCsvDatasourceImpl {
    fn service_rates_from_string(
        &self,
        s: &str,
    ) -> Result<HashMap<ProductRef, ServiceRate>, ServerError> {
        csv::Reader::from_reader(s.as_bytes())
            .records()
            .enumerate()
            .map(|(i, r)| {
                r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                    let raw_product = r.get(0).unwrap_or("");
                    let raw_hours = r.get(1).unwrap_or("0");
                    let raw_cost = r.get(2).unwrap_or("0");

                    let hours = DecimalAmountModel::from_str(raw_hours)?;
                    let cost = DecimalAmountModel::from_str(raw_cost)?;

                    Ok((
                        product(key_cell(raw_product, "service_rates", i)?),
                        ServiceRate::new(hours.into(), cost.into()),
                    ))
                })
            })
            .collect()
    }

    fn team_rates_from_string(&self, s: &str) -> Result<HashMap<TeamId, Decimal>, ServerError> {
        csv::Reader::from_reader(s.as_bytes())
            .records()
            .enumerate()
            .map(|(i, r)| {
                r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                    let raw_team = r.get(0).unwrap_or("");
                    let raw_percent = r.get(1).unwrap_or("0");
                    let percent = DecimalAmountModel::from_str(raw_percent)?;
                    Ok((team(key_cell(raw_team, "teams", i)?), percent.into()))
                })
            })
            .collect()
    }

    fn sellers_from_string(&self, s: &str) -> Result<HashMap<SellerId, Seller>, ServerError> {
        csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(s.as_bytes())
            .records()
            .enumerate()
            .map(|(i, r)| {
                r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                    // Extract from CSV record. Team and rate columns may be
                    // left out.
                    let raw_seller = r.get(0).unwrap_or("");
                    let raw_name = r.get(1).unwrap_or("");
                    let raw_team = r.get(2).unwrap_or("");
                    let raw_percent = r.get(3).unwrap_or("");

                    // Build.
                    let id = seller(key_cell(raw_seller, "sellers", i)?);
                    let name = match raw_name.trim() {
                        "" => id.to_string(),
                        n => n.to_string(),
                    };
                    let team_id = match raw_team.trim() {
                        "" => None,
                        t => Some(team(t)),
                    };
                    Ok((
                        id.clone(),
                        Seller {
                            id,
                            name,
                            team: team_id,
                            commission_percent: optional_amount(raw_percent)?,
                        },
                    ))
                })
            })
            .collect()
    }
}
