use chrono::{DateTime, NaiveDate, Utc};
use iso_currency::Currency;
use rust_decimal::Decimal;

use super::{
    invoice::{InvoiceId, InvoiceLineId},
    party::{Beneficiary, OperatorId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

/// Source document (or document line) an entry is derived from. Seller
/// commissions are computed per invoice, mechanic payouts per invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceRef {
    Invoice(InvoiceId),
    InvoiceLine(InvoiceId, InvoiceLineId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

/// Calendar month an entry belongs to, used for month/year filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub(crate) year: i32,
    pub(crate) month: u32,
}

/// Unique key of the ledger.
pub type EntryKey = (SourceRef, Beneficiary);

/// The payable obligation for one (source, beneficiary) pair.
///
/// Everything above `paid` is a cache of the live source documents and is
/// overwritten by every reconciliation. The payment fields are owned by the
/// ledger and never touched by reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionPaymentEntry {
    pub id: EntryId,
    pub source: SourceRef,
    pub beneficiary: Beneficiary,

    pub invoice_name: String,
    pub invoice_date: NaiveDate,
    pub partner_name: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub hours: Decimal,
    pub cost_per_hour: Decimal,
    pub commission_percent: Decimal,
    pub base_amount: Decimal,
    pub payout_amount: Decimal,
    pub currency: Currency,
    pub period: Period,

    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by: Option<OperatorId>,
    pub payment_method: Option<PaymentMethod>,
    pub note: Option<String>,

    /// Bumped on every committed write.
    pub revision: u64,
}

/// Freshly computed descriptive fields for one (source, beneficiary) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub source: SourceRef,
    pub beneficiary: Beneficiary,
    pub invoice_name: String,
    pub invoice_date: NaiveDate,
    pub partner_name: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub hours: Decimal,
    pub cost_per_hour: Decimal,
    pub commission_percent: Decimal,
    pub base_amount: Decimal,
    pub payout_amount: Decimal,
    pub currency: Currency,
    pub period: Period,
}

/// Result of a bulk "mark paid".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkPaymentOutcome {
    pub paid: Vec<EntryId>,
    /// Entries left untouched because they were already paid.
    pub skipped: Vec<EntryId>,
}

// --

impl EntryId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl SourceRef {
    pub fn invoice(&self) -> &InvoiceId {
        match self {
            SourceRef::Invoice(i) => i,
            SourceRef::InvoiceLine(i, _) => i,
        }
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRef::Invoice(i) => write!(f, "invoice:{}", i),
            SourceRef::InvoiceLine(i, l) => write!(f, "invoice:{}/line:{}", i, l),
        }
    }
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Transfer => "Transfer",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Period {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl CommissionPaymentEntry {
    pub fn key(&self) -> EntryKey {
        (self.source.clone(), self.beneficiary.clone())
    }
}

impl EntryDraft {
    pub fn key(&self) -> EntryKey {
        (self.source.clone(), self.beneficiary.clone())
    }
}

impl BulkPaymentOutcome {
    pub fn paid_count(&self) -> usize {
        self.paid.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
