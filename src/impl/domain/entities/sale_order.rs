use iso_currency::Currency;
use rust_decimal::Decimal;

use super::{
    catalog::{ProductRef, ProductType},
    invoice::{InvoiceLine, InvoiceLineId},
    party::{MechanicId, SellerId},
};

#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct SaleOrderId(pub(crate) String);

#[derive(Debug, Clone)]
pub struct SaleOrderLine {
    pub id: String,
    pub product_ref: ProductRef,
    pub product_name: String,
    pub product_type: ProductType,
    pub quantity: Decimal,
    pub mechanic: Option<MechanicId>,
    pub line_base_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct SaleOrder {
    pub id: SaleOrderId,
    pub name: String,
    pub partner_name: String,
    pub salesperson: Option<SellerId>,
    pub base_amount: Decimal,
    pub currency: Currency,
    pub lines: Vec<SaleOrderLine>,

    // Derived, refreshed whenever the salesperson or the base amount changes.
    pub seller_name: String,
    pub commission_percent: Decimal,
    pub commission_amount: Decimal,
}

/// Outcome of assigning a mechanic to the service lines of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MechanicAssignment {
    pub affected_lines: Vec<String>,
}

// Shorthand constructors.

pub fn sale_order(id: impl Into<String>) -> SaleOrderId {
    SaleOrderId(id.into())
}

// --

impl SaleOrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SaleOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SaleOrderLine {
    pub fn is_service(&self) -> bool {
        self.product_type == ProductType::Service
    }

    /// Invoice line billing this order line. The mechanic carries over.
    pub fn to_invoice_line(&self, id: InvoiceLineId) -> InvoiceLine {
        InvoiceLine {
            id,
            product_ref: self.product_ref.clone(),
            product_name: self.product_name.clone(),
            product_type: self.product_type,
            quantity: self.quantity,
            mechanic: self.mechanic.clone(),
            line_base_amount: self.line_base_amount,
        }
    }
}

impl SaleOrder {
    /// Service lines that should name a mechanic but don't.
    pub fn service_lines_missing_mechanic(&self) -> Vec<&SaleOrderLine> {
        self.lines
            .iter()
            .filter(|l| l.is_service() && l.mechanic.is_none())
            .collect()
    }

    /// Lines that `assign_mechanic` would touch.
    pub(crate) fn mechanic_targets(&self, only_empty: bool) -> Vec<&SaleOrderLine> {
        self.lines
            .iter()
            .filter(|l| l.is_service())
            .filter(|l| !only_empty || l.mechanic.is_none())
            .collect()
    }

    pub fn line(&self, id: &str) -> Option<&SaleOrderLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub(crate) fn assign_mechanic(
        &mut self,
        mechanic: &MechanicId,
        only_empty: bool,
    ) -> MechanicAssignment {
        let affected_lines = self
            .lines
            .iter_mut()
            .filter(|l| l.is_service())
            .filter(|l| !only_empty || l.mechanic.is_none())
            .map(|l| {
                l.mechanic = Some(mechanic.clone());
                l.id.clone()
            })
            .collect();
        MechanicAssignment { affected_lines }
    }
}

impl MechanicAssignment {
    pub fn affected_count(&self) -> usize {
        self.affected_lines.len()
    }
}
