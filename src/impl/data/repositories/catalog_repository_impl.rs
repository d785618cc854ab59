use std::collections::HashMap;

use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    data::datasources::catalog_csv_datasource::{CatalogCsvDatasource, CatalogCsvDatasourceImpl},
    domain::repositories::catalog_repository::CatalogRepository,
    entities::{ProductRef, Seller, SellerId, ServiceRate, TeamId},
};

/// Rate catalog held in memory.
#[derive(Debug, Default, Clone)]
pub struct CatalogRepositoryImpl {
    service_rates: HashMap<ProductRef, ServiceRate>,
    team_rates: HashMap<TeamId, Decimal>,
    sellers: HashMap<SellerId, Seller>,
}

impl CatalogRepository for CatalogRepositoryImpl {
    fn service_rate(&self, product: &ProductRef) -> ServiceRate {
        self.service_rates.get(product).copied().unwrap_or_default()
    }

    fn commission_percent(&self, seller: &SellerId) -> Decimal {
        let Some(s) = self.sellers.get(seller) else {
            return Decimal::ZERO;
        };
        if let Some(percent) = s.commission_percent {
            return percent;
        }
        s.team
            .as_ref()
            .and_then(|t| self.team_rates.get(t))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn seller(&self, seller: &SellerId) -> Option<Seller> {
        self.sellers.get(seller).cloned()
    }
}

impl CatalogRepositoryImpl {
    pub fn new(
        service_rates: HashMap<ProductRef, ServiceRate>,
        team_rates: HashMap<TeamId, Decimal>,
        sellers: impl IntoIterator<Item = Seller>,
    ) -> Self {
        Self {
            service_rates,
            team_rates,
            sellers: sellers.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub(crate) fn from_string(
        service_rates_csv: &str,
        teams_csv: &str,
        sellers_csv: &str,
    ) -> Result<Self, ServerError> {
        let datasource = CatalogCsvDatasourceImpl;
        Ok(Self {
            service_rates: datasource.service_rates_from_string(service_rates_csv)?,
            team_rates: datasource.team_rates_from_string(teams_csv)?,
            sellers: datasource.sellers_from_string(sellers_csv)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::entities::{product, seller, team};

    fn catalog() -> CatalogRepositoryImpl {
        CatalogRepositoryImpl::from_string(
            "product_ref,hours_required,cost_per_hour\ntune,2,100\n",
            "team,commission_percent\nfloor,5\n",
            "seller,name,team,commission_percent\n\
             ana,Ana,floor,\n\
             ben,Ben,floor,8\n\
             carla,Carla,,\n\
             dani,Dani,unrated,\n",
        )
        .unwrap()
    }

    #[test]
    fn test_service_rate_defaults_to_zero() {
        let c = catalog();
        assert_eq!(c.service_rate(&product("tune")), ServiceRate::new(dec!(2), dec!(100)));
        assert_eq!(c.service_rate(&product("missing")), ServiceRate::default());
    }

    #[test]
    fn test_commission_percent_resolution() {
        let c = catalog();
        assert_eq!(c.commission_percent(&seller("ana")), dec!(5));
        assert_eq!(c.commission_percent(&seller("ben")), dec!(8));
        assert_eq!(c.commission_percent(&seller("carla")), Decimal::ZERO);
        assert_eq!(c.commission_percent(&seller("dani")), Decimal::ZERO);
        assert_eq!(c.commission_percent(&seller("nobody")), Decimal::ZERO);
    }

    #[test]
    fn test_new_from_entities() {
        let c = CatalogRepositoryImpl::new(
            HashMap::new(),
            vec![(team("floor"), dec!(3))].into_iter().collect(),
            vec![Seller {
                id: seller("ana"),
                name: "Ana".to_string(),
                team: Some(team("floor")),
                commission_percent: None,
            }],
        );
        assert_eq!(c.commission_percent(&seller("ana")), dec!(3));
        assert_eq!(c.seller(&seller("ana")).unwrap().name, "Ana");
    }
}
