use rust_decimal::Decimal;

use super::{filters::ReportFilter, ledger_entry::CommissionPaymentEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub line_count: usize,
    pub total_hours: Decimal,
    pub total_base_amount: Decimal,
    pub total_payout_amount: Decimal,
}

/// Filtered view of the ledger as materialized by a reporting session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub filter: ReportFilter,
    pub entries: Vec<CommissionPaymentEntry>,
    pub totals: Totals,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
