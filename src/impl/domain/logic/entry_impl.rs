use chrono::{DateTime, Utc};
use fractic_server_error::ServerError;

use crate::{
    entities::{CommissionPaymentEntry, EntryDraft, EntryId, OperatorId, PaymentMethod},
    errors::LedgerInvariantViolated,
};

impl CommissionPaymentEntry {
    /// New, unpaid entry for a draft.
    pub(crate) fn from_draft(id: EntryId, draft: EntryDraft) -> Self {
        Self {
            id,
            source: draft.source,
            beneficiary: draft.beneficiary,
            invoice_name: draft.invoice_name,
            invoice_date: draft.invoice_date,
            partner_name: draft.partner_name,
            product_name: draft.product_name,
            quantity: draft.quantity,
            hours: draft.hours,
            cost_per_hour: draft.cost_per_hour,
            commission_percent: draft.commission_percent,
            base_amount: draft.base_amount,
            payout_amount: draft.payout_amount,
            currency: draft.currency,
            period: draft.period,
            paid: false,
            paid_at: None,
            paid_by: None,
            payment_method: None,
            note: None,
            revision: 0,
        }
    }

    /// Overwrites the cached descriptive fields with freshly computed ones.
    /// Payment fields are left alone. Returns whether anything changed.
    pub(crate) fn refresh_from(&mut self, draft: &EntryDraft) -> bool {
        let before = self.clone();
        self.invoice_name = draft.invoice_name.clone();
        self.invoice_date = draft.invoice_date;
        self.partner_name = draft.partner_name.clone();
        self.product_name = draft.product_name.clone();
        self.quantity = draft.quantity;
        self.hours = draft.hours;
        self.cost_per_hour = draft.cost_per_hour;
        self.commission_percent = draft.commission_percent;
        self.base_amount = draft.base_amount;
        self.payout_amount = draft.payout_amount;
        self.currency = draft.currency;
        self.period = draft.period;
        *self != before
    }

    /// Marking paid stamps the operator and time and defaults the method to
    /// cash when none was chosen yet. Marking unpaid clears every payment
    /// stamp, method included.
    pub fn set_paid(&mut self, paid: bool, operator: &OperatorId, now: DateTime<Utc>) {
        if paid {
            self.paid = true;
            self.paid_at = Some(now);
            self.paid_by = Some(operator.clone());
            if self.payment_method.is_none() {
                self.payment_method = Some(PaymentMethod::Cash);
            }
        } else {
            self.paid = false;
            self.paid_at = None;
            self.paid_by = None;
            self.payment_method = None;
        }
    }

    /// Choosing a method is paying: always re-stamps operator and time.
    pub fn set_payment_method(
        &mut self,
        method: PaymentMethod,
        operator: &OperatorId,
        now: DateTime<Utc>,
    ) {
        self.paid = true;
        self.paid_at = Some(now);
        self.paid_by = Some(operator.clone());
        self.payment_method = Some(method);
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|n| !n.trim().is_empty());
    }

    /// `paid ⟺ paid_at ⟺ paid_by`, and a method implies paid.
    pub(crate) fn check_invariants(&self) -> Result<(), ServerError> {
        if self.paid != self.paid_at.is_some() || self.paid != self.paid_by.is_some() {
            return Err(LedgerInvariantViolated::new(
                &self.id,
                "paid flag disagrees with payment stamps",
            ));
        }
        if self.payment_method.is_some() && !self.paid {
            return Err(LedgerInvariantViolated::new(
                &self.id,
                "payment method set on an unpaid entry",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{NaiveDate, TimeZone as _};
    use iso_currency::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::entities::{invoice, mechanic, operator, Beneficiary, Period, SourceRef};

    pub(crate) fn draft(invoice_id: &str, payout: Decimal) -> EntryDraft {
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        EntryDraft {
            source: SourceRef::Invoice(invoice(invoice_id)),
            beneficiary: Beneficiary::Mechanic(mechanic("luis")),
            invoice_name: format!("INV/{}", invoice_id),
            invoice_date: date,
            partner_name: "Taller Norte".to_string(),
            product_name: "Brake service".to_string(),
            quantity: dec!(1),
            hours: dec!(2),
            cost_per_hour: payout / dec!(2),
            commission_percent: Decimal::ZERO,
            base_amount: payout * dec!(3),
            payout_amount: payout,
            currency: Currency::MXN,
            period: Period::from_date(date),
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn test_new_entry_is_unpaid() {
        let e = CommissionPaymentEntry::from_draft(EntryId(1), draft("1", dec!(100)));
        assert!(!e.paid);
        assert!(e.paid_at.is_none());
        assert!(e.payment_method.is_none());
        assert!(e.check_invariants().is_ok());
    }

    #[test]
    fn test_set_paid_defaults_method_without_overwriting() {
        let op = operator("ana");
        let mut e = CommissionPaymentEntry::from_draft(EntryId(1), draft("1", dec!(100)));
        e.set_paid(true, &op, at(9));
        assert_eq!(e.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(e.paid_at, Some(at(9)));
        assert_eq!(e.paid_by, Some(op.clone()));

        let mut t = CommissionPaymentEntry::from_draft(EntryId(2), draft("2", dec!(100)));
        t.set_payment_method(PaymentMethod::Transfer, &op, at(9));
        t.set_paid(true, &op, at(10));
        assert_eq!(t.payment_method, Some(PaymentMethod::Transfer));
        assert!(t.check_invariants().is_ok());
    }

    #[test]
    fn test_set_unpaid_clears_all_stamps() {
        let op = operator("ana");
        let mut e = CommissionPaymentEntry::from_draft(EntryId(1), draft("1", dec!(100)));
        e.set_payment_method(PaymentMethod::Transfer, &op, at(9));
        e.set_paid(false, &op, at(10));
        assert!(!e.paid);
        assert!(e.paid_at.is_none());
        assert!(e.paid_by.is_none());
        assert!(e.payment_method.is_none());
        assert!(e.check_invariants().is_ok());
    }

    #[test]
    fn test_refresh_keeps_payment_fields() {
        let op = operator("ana");
        let mut e = CommissionPaymentEntry::from_draft(EntryId(1), draft("1", dec!(100)));
        e.set_payment_method(PaymentMethod::Transfer, &op, at(9));
        e.set_note(Some("paid at front desk".to_string()));

        assert!(e.refresh_from(&draft("1", dec!(150))));
        assert_eq!(e.payout_amount, dec!(150));
        assert!(e.paid);
        assert_eq!(e.payment_method, Some(PaymentMethod::Transfer));
        assert_eq!(e.paid_at, Some(at(9)));
        assert_eq!(e.note.as_deref(), Some("paid at front desk"));

        assert!(!e.refresh_from(&draft("1", dec!(150))));
    }

    #[test]
    fn test_invariant_check_detects_inconsistent_rows() {
        let mut e = CommissionPaymentEntry::from_draft(EntryId(1), draft("1", dec!(100)));
        e.payment_method = Some(PaymentMethod::Cash);
        assert!(e.check_invariants().is_err());
    }
}
