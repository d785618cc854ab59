use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{
    ledger_entry::{EntryId, PaymentMethod},
    party::Beneficiary,
};

/// One row of a commission report. Raw values are kept alongside the
/// formatted strings so renderers can pick either.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub entry_id: EntryId,
    pub document_ref: String,
    pub date: NaiveDate,
    pub date_str: String,
    pub counterparty_name: String,
    pub product_name: String,
    pub quantity_str: String,
    pub hours: Decimal,
    pub hours_str: String,

    /// Rounded to the currency's decimal places.
    pub base_amount: Decimal,
    pub base_amount_str: String,
    /// Seller commissions only.
    pub percent: Option<Decimal>,
    pub percent_str: String,
    /// Rounded to the currency's decimal places.
    pub amount: Decimal,
    pub amount_str: String,
    /// Currency of the source document. Amounts are always formatted with
    /// the report currency.
    pub currency_code: String,

    pub payment_method: Option<PaymentMethod>,
    pub payment_method_str: String,
    pub paid_at_str: String,
    pub paid_by: String,
    pub paid: bool,
    pub paid_str: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTotals {
    pub line_count: usize,
    pub total_hours: Decimal,
    pub total_hours_str: String,
    /// Sum of the rounded line amounts.
    pub total_base_amount: Decimal,
    pub total_base_amount_str: String,
    /// Sum of the rounded line amounts.
    pub total_amount: Decimal,
    pub total_amount_str: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPayload {
    /// `None` when the session has no beneficiary selected yet.
    pub beneficiary: Option<Beneficiary>,
    pub beneficiary_name: String,
    pub period_label: String,
    pub currency_code: String,
    /// Team/seller rate, for seller reports.
    pub commission_percent: Option<Decimal>,
    pub commission_percent_str: String,
    pub lines: Vec<ReportLine>,
    pub totals: ReportTotals,
}

impl ReportPayload {
    /// True when no ledger entry matched; callers show a "nothing to
    /// report" notice instead of an empty document.
    pub fn nothing_to_report(&self) -> bool {
        self.lines.is_empty()
    }
}
