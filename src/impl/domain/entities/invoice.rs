use chrono::NaiveDate;
use iso_currency::Currency;
use rust_decimal::Decimal;

use super::{
    catalog::{ProductRef, ProductType},
    party::{MechanicId, SellerId},
};

#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct InvoiceId(pub(crate) String);

#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct InvoiceLineId(pub(crate) String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Draft,
    Posted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    NotPaid,
    InPayment,
    Partial,
    Paid,
    Reversed,
}

#[derive(Debug, Clone)]
pub struct InvoiceLine {
    pub id: InvoiceLineId,
    pub product_ref: ProductRef,
    pub product_name: String,
    pub product_type: ProductType,
    pub quantity: Decimal,
    pub mechanic: Option<MechanicId>,
    /// Untaxed subtotal charged to the customer for this line.
    pub line_base_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub id: InvoiceId,
    /// Folio shown to users (falls back to the id when empty).
    pub name: String,
    pub partner_name: String,
    pub status: DocumentStatus,
    pub payment_status: PaymentStatus,
    pub date: NaiveDate,
    pub salesperson: Option<SellerId>,
    /// Untaxed amount of the whole document.
    pub base_amount: Decimal,
    pub currency: Currency,
    pub lines: Vec<InvoiceLine>,

    // Derived from the commission rate of the salesperson. Refreshed whenever
    // the salesperson or the base amount changes.
    pub commission_percent: Decimal,
    pub commission_amount: Decimal,
}

// Shorthand constructors.

pub fn invoice(id: impl Into<String>) -> InvoiceId {
    InvoiceId(id.into())
}

pub fn invoice_line(id: impl Into<String>) -> InvoiceLineId {
    InvoiceLineId(id.into())
}

// --

impl InvoiceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl InvoiceLineId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for InvoiceLineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl InvoiceDocument {
    /// Posted and fully paid by the customer. Only such documents produce
    /// commissions or payouts.
    pub fn is_settled(&self) -> bool {
        self.status == DocumentStatus::Posted && self.payment_status == PaymentStatus::Paid
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    pub fn line(&self, id: &InvoiceLineId) -> Option<&InvoiceLine> {
        self.lines.iter().find(|l| &l.id == id)
    }
}

impl InvoiceLine {
    pub fn is_service(&self) -> bool {
        self.product_type == ProductType::Service
    }
}
