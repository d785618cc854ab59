use std::str::FromStr as _;

use chrono::{DateTime, NaiveDate, Utc};
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    data::models::{code_model::PaymentMethodModel, iso_currency_model::ISOCurrencyModel},
    entities::{
        invoice, invoice_line, mechanic, operator, seller, Beneficiary, CommissionPaymentEntry,
        EntryId, Period, SourceRef,
    },
    errors::InvalidCode,
};

/// Row of the JSON ledger snapshot.
#[derive(Debug, serde_derive::Serialize, serde_derive::Deserialize)]
pub(crate) struct LedgerEntryModel {
    id: u64,
    invoice_id: String,
    invoice_line_id: Option<String>,
    beneficiary_kind: String,
    beneficiary_id: String,

    invoice_name: String,
    invoice_date: NaiveDate,
    partner_name: String,
    product_name: String,
    quantity: Decimal,
    hours: Decimal,
    cost_per_hour: Decimal,
    commission_percent: Decimal,
    base_amount: Decimal,
    payout_amount: Decimal,
    currency: String,
    month: u32,
    year: i32,

    paid: bool,
    paid_at: Option<DateTime<Utc>>,
    paid_by: Option<String>,
    payment_method: Option<String>,
    note: Option<String>,
    revision: u64,
}

/// JSON ledger snapshot file.
#[derive(Debug, Default, serde_derive::Serialize, serde_derive::Deserialize)]
pub(crate) struct LedgerSnapshotModel {
    pub(crate) next_id: u64,
    pub(crate) entries: Vec<LedgerEntryModel>,
}

impl From<&CommissionPaymentEntry> for LedgerEntryModel {
    fn from(e: &CommissionPaymentEntry) -> Self {
        let (invoice_id, invoice_line_id) = match &e.source {
            SourceRef::Invoice(i) => (i.to_string(), None),
            SourceRef::InvoiceLine(i, l) => (i.to_string(), Some(l.to_string())),
        };
        let (beneficiary_kind, beneficiary_id) = match &e.beneficiary {
            Beneficiary::Seller(s) => ("seller", s.to_string()),
            Beneficiary::Mechanic(m) => ("mechanic", m.to_string()),
        };
        Self {
            id: e.id.0,
            invoice_id,
            invoice_line_id,
            beneficiary_kind: beneficiary_kind.to_string(),
            beneficiary_id,
            invoice_name: e.invoice_name.clone(),
            invoice_date: e.invoice_date,
            partner_name: e.partner_name.clone(),
            product_name: e.product_name.clone(),
            quantity: e.quantity,
            hours: e.hours,
            cost_per_hour: e.cost_per_hour,
            commission_percent: e.commission_percent,
            base_amount: e.base_amount,
            payout_amount: e.payout_amount,
            currency: e.currency.code().to_string(),
            month: e.period.month,
            year: e.period.year,
            paid: e.paid,
            paid_at: e.paid_at,
            paid_by: e.paid_by.as_ref().map(|o| o.to_string()),
            payment_method: e
                .payment_method
                .map(|m| PaymentMethodModel::code(m).to_string()),
            note: e.note.clone(),
            revision: e.revision,
        }
    }
}

impl TryFrom<LedgerEntryModel> for CommissionPaymentEntry {
    type Error = ServerError;

    fn try_from(m: LedgerEntryModel) -> Result<Self, Self::Error> {
        let source = match m.invoice_line_id {
            Some(l) => SourceRef::InvoiceLine(invoice(m.invoice_id), invoice_line(l)),
            None => SourceRef::Invoice(invoice(m.invoice_id)),
        };
        let beneficiary = match m.beneficiary_kind.as_str() {
            "seller" => Beneficiary::Seller(seller(m.beneficiary_id)),
            "mechanic" => Beneficiary::Mechanic(mechanic(m.beneficiary_id)),
            other => return Err(InvalidCode::new("beneficiary_kind", other)),
        };
        if !(1..=12).contains(&m.month) {
            return Err(InvalidCode::new("month", &m.month.to_string()));
        }
        Ok(CommissionPaymentEntry {
            id: EntryId(m.id),
            source,
            beneficiary,
            invoice_name: m.invoice_name,
            invoice_date: m.invoice_date,
            partner_name: m.partner_name,
            product_name: m.product_name,
            quantity: m.quantity,
            hours: m.hours,
            cost_per_hour: m.cost_per_hour,
            commission_percent: m.commission_percent,
            base_amount: m.base_amount,
            payout_amount: m.payout_amount,
            currency: ISOCurrencyModel::from_str(&m.currency)?.into(),
            period: Period {
                year: m.year,
                month: m.month,
            },
            paid: m.paid,
            paid_at: m.paid_at,
            paid_by: m.paid_by.map(operator),
            payment_method: m
                .payment_method
                .map(|s| PaymentMethodModel::from_str(&s).map(|p| p.0))
                .transpose()?,
            note: m.note,
            revision: m.revision,
        })
    }
}
