use rust_decimal::Decimal;

use crate::{
    domain::logic::totals::checked_total,
    entities::{
        Beneficiary, CommissionConfig, CommissionPaymentEntry, ReportLine, ReportPayload,
        ReportTotals,
    },
    presentation::money_fmt::{format_amount, format_number, format_percent, round},
};

/// Header data of a report, resolved by the caller.
pub(crate) struct ReportHeader {
    pub(crate) beneficiary: Option<Beneficiary>,
    pub(crate) beneficiary_name: String,
    pub(crate) period_label: String,
    pub(crate) commission_percent: Option<Decimal>,
}

/// Turns ledger entries into a formatted report payload.
///
/// Every amount is rounded once per line; totals add up the rounded line
/// amounts so the printed columns always sum to the printed total.
pub(crate) struct ReportBuilder<'a> {
    config: &'a CommissionConfig,
}

impl<'a> ReportBuilder<'a> {
    pub(crate) fn new(config: &'a CommissionConfig) -> Self {
        Self { config }
    }

    pub(crate) fn build(
        &self,
        header: ReportHeader,
        entries: &[CommissionPaymentEntry],
    ) -> ReportPayload {
        let lines: Vec<ReportLine> = entries.iter().map(|e| self.line(e)).collect();
        let totals = self.totals(&lines);
        ReportPayload {
            beneficiary: header.beneficiary,
            beneficiary_name: header.beneficiary_name,
            period_label: header.period_label,
            currency_code: self.config.currency_format.currency.code().to_string(),
            commission_percent_str: header
                .commission_percent
                .map(format_percent)
                .unwrap_or_default(),
            commission_percent: header.commission_percent,
            lines,
            totals,
        }
    }

    fn line(&self, e: &CommissionPaymentEntry) -> ReportLine {
        let format = &self.config.currency_format;
        let base_amount = round(e.base_amount, format.decimal_places);
        let amount = round(e.payout_amount, format.decimal_places);
        let percent = e.beneficiary.is_seller().then_some(e.commission_percent);
        if e.currency != format.currency {
            tracing::warn!(
                entry = %e.id,
                entry_currency = e.currency.code(),
                report_currency = format.currency.code(),
                "Entry currency differs from the report currency"
            );
        }
        ReportLine {
            entry_id: e.id,
            document_ref: e.invoice_name.clone(),
            date: e.invoice_date,
            date_str: e.invoice_date.format("%d/%m/%Y").to_string(),
            counterparty_name: e.partner_name.clone(),
            product_name: e.product_name.clone(),
            quantity_str: e.quantity.normalize().to_string(),
            hours: e.hours,
            hours_str: format_number(e.hours, 2),
            base_amount,
            base_amount_str: format_amount(base_amount, format),
            percent,
            percent_str: percent.map(format_percent).unwrap_or_default(),
            amount,
            amount_str: format_amount(amount, format),
            currency_code: e.currency.code().to_string(),
            payment_method: e.payment_method,
            payment_method_str: e
                .payment_method
                .map(|m| m.label().to_string())
                .unwrap_or_default(),
            paid_at_str: e
                .paid_at
                .map(|t| {
                    t.with_timezone(&self.config.display_offset)
                        .format("%d/%m/%Y %H:%M:%S")
                        .to_string()
                })
                .unwrap_or_default(),
            paid_by: e
                .paid_by
                .as_ref()
                .map(|o| o.to_string())
                .unwrap_or_default(),
            paid: e.paid,
            paid_str: if e.paid { "Yes" } else { "No" }.to_string(),
            note: e.note.clone().unwrap_or_default(),
        }
    }

    fn totals(&self, lines: &[ReportLine]) -> ReportTotals {
        let format = &self.config.currency_format;
        let total_hours = checked_total(lines.iter().map(|l| l.hours), "hours");
        let total_base_amount = checked_total(lines.iter().map(|l| l.base_amount), "base_amount");
        let total_amount = checked_total(lines.iter().map(|l| l.amount), "amount");
        ReportTotals {
            line_count: lines.len(),
            total_hours,
            total_hours_str: format_number(total_hours, 2),
            total_base_amount,
            total_base_amount_str: format_amount(total_base_amount, format),
            total_amount,
            total_amount_str: format_amount(total_amount, format),
        }
    }
}
