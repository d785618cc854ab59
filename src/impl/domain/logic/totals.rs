use rust_decimal::Decimal;

use crate::entities::{CommissionPaymentEntry, Totals};

/// Sum of a column, or zero when it does not fit in a `Decimal`.
pub(crate) fn checked_total(values: impl IntoIterator<Item = Decimal>, column: &str) -> Decimal {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .unwrap_or_else(|| {
            tracing::warn!(column, "Total overflows, defaulting to zero");
            Decimal::ZERO
        })
}

impl Totals {
    /// Unrounded sums over the given entries.
    pub fn of<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a CommissionPaymentEntry>,
    {
        let entries: Vec<&CommissionPaymentEntry> = entries.into_iter().collect();
        Totals {
            line_count: entries.len(),
            total_hours: checked_total(entries.iter().map(|e| e.hours), "hours"),
            total_base_amount: checked_total(entries.iter().map(|e| e.base_amount), "base_amount"),
            total_payout_amount: checked_total(
                entries.iter().map(|e| e.payout_amount),
                "payout_amount",
            ),
        }
    }
}
