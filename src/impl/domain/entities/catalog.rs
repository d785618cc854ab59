use rust_decimal::Decimal;

#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct ProductRef(pub(crate) String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    Service,
    Product,
    Consumable,
}

/// Labor rate of a service item, per unit sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceRate {
    pub hours_required: Decimal,
    pub cost_per_hour: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommissionRate {
    /// Percentage (0-100) of the untaxed base.
    pub percent: Decimal,
}

// Shorthand constructors.

pub fn product(id: impl Into<String>) -> ProductRef {
    ProductRef(id.into())
}

// --

impl ProductRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ServiceRate {
    pub fn new(hours_required: Decimal, cost_per_hour: Decimal) -> Self {
        Self {
            hours_required,
            cost_per_hour,
        }
    }
}

impl CommissionRate {
    pub fn new(percent: Decimal) -> Self {
        Self { percent }
    }
}
