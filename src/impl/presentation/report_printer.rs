use fractic_server_error::{CriticalError, ServerError};

use crate::entities::ReportPayload;

/// Renders report payloads for humans (plain text) and for spreadsheets
/// (CSV).
pub struct ReportPrinter;

impl ReportPrinter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_text(&self, report: &ReportPayload) -> String {
        let mut out = String::new();

        out.push_str(&format!("Commission report: {}\n", report.beneficiary_name));
        out.push_str(&format!("Period: {}\n", report.period_label));
        if !report.commission_percent_str.is_empty() {
            out.push_str(&format!("Commission rate: {}\n", report.commission_percent_str));
        }
        out.push_str(&format!("Currency: {}\n\n", report.currency_code));

        if report.nothing_to_report() {
            out.push_str("Nothing to report for this period.\n");
            return out;
        }

        out.push_str(&format!(
            "{:<12} {:<10} {:<24} {:>8} {:>16} {:>8} {:>16} {:<9} {:<20} {:<4}\n",
            "Document", "Date", "Customer", "Hours", "Base", "Rate", "Amount", "Method",
            "Paid at", "Paid"
        ));
        out.push_str(&format!("{}\n", "-".repeat(136)));
        for line in &report.lines {
            out.push_str(&format!(
                "{:<12} {:<10} {:<24} {:>8} {:>16} {:>8} {:>16} {:<9} {:<20} {:<4}\n",
                truncate(&line.document_ref, 12),
                line.date_str,
                truncate(&line.counterparty_name, 24),
                line.hours_str,
                line.base_amount_str,
                line.percent_str,
                line.amount_str,
                line.payment_method_str,
                line.paid_at_str,
                line.paid_str,
            ));
            if !line.product_name.is_empty() {
                out.push_str(&format!(
                    "    {} x {}\n",
                    line.quantity_str, line.product_name
                ));
            }
            if !line.note.is_empty() {
                for wrapped in textwrap::wrap(&line.note, 74) {
                    out.push_str(&format!("    ; {}\n", wrapped));
                }
            }
        }
        out.push_str(&format!("{}\n", "-".repeat(136)));
        out.push_str(&format!(
            "{:<48} {:>8} {:>16} {:>8} {:>16}\n",
            format!("Total ({} lines)", report.totals.line_count),
            report.totals.total_hours_str,
            report.totals.total_base_amount_str,
            "",
            report.totals.total_amount_str,
        ));

        out
    }

    pub fn print_csv(&self, report: &ReportPayload) -> Result<String, ServerError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let write_err = |e: csv::Error| CriticalError::with_debug("failed to write report CSV", &e);
        writer
            .write_record([
                "document",
                "date",
                "customer",
                "product",
                "quantity",
                "hours",
                "base_amount",
                "percent",
                "amount",
                "payment_method",
                "paid_at",
                "paid_by",
                "paid",
                "note",
                "currency",
            ])
            .map_err(write_err)?;
        for line in &report.lines {
            writer
                .write_record([
                    line.document_ref.as_str(),
                    line.date.format("%Y-%m-%d").to_string().as_str(),
                    line.counterparty_name.as_str(),
                    line.product_name.as_str(),
                    line.quantity_str.as_str(),
                    line.hours.to_string().as_str(),
                    line.base_amount.to_string().as_str(),
                    line.percent.map(|p| p.to_string()).unwrap_or_default().as_str(),
                    line.amount.to_string().as_str(),
                    line.payment_method_str.as_str(),
                    line.paid_at_str.as_str(),
                    line.paid_by.as_str(),
                    line.paid_str.as_str(),
                    line.note.as_str(),
                    line.currency_code.as_str(),
                ])
                .map_err(write_err)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| CriticalError::with_debug("failed to flush report CSV", &e.to_string()))?;
        String::from_utf8(bytes)
            .map_err(|e| CriticalError::with_debug("report CSV is not valid UTF-8", &e))
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
