use rust_decimal::Decimal;

use crate::entities::{ProductRef, Seller, SellerId, ServiceRate};

/// Read-only rate catalog. Lookups never fail: missing data resolves to zero.
pub trait CatalogRepository: Send + Sync {
    fn service_rate(&self, product: &ProductRef) -> ServiceRate;

    /// Seller's own rate if set, otherwise the rate of the seller's team,
    /// otherwise zero.
    fn commission_percent(&self, seller: &SellerId) -> Decimal;

    fn seller(&self, seller: &SellerId) -> Option<Seller>;
}
