use rust_decimal::Decimal;

use crate::{
    domain::{
        logic::commission_calculator::CommissionCalculator,
        repositories::catalog_repository::CatalogRepository,
    },
    entities::{
        Beneficiary, EntryDraft, InvoiceDocument, InvoiceLine, MechanicId, NegativeQuantityPolicy,
        Period, SellerId, SourceRef,
    },
};

/// Turns qualifying source documents into ledger drafts.
pub(crate) struct Reconciler<'a, C: CatalogRepository + ?Sized> {
    catalog: &'a C,
    negative_quantities: NegativeQuantityPolicy,
}

impl<'a, C: CatalogRepository + ?Sized> Reconciler<'a, C> {
    pub(crate) fn new(catalog: &'a C, negative_quantities: NegativeQuantityPolicy) -> Self {
        Self {
            catalog,
            negative_quantities,
        }
    }

    pub(crate) fn mechanic_drafts(
        &self,
        mechanic: &MechanicId,
        lines: Vec<(InvoiceDocument, InvoiceLine)>,
    ) -> Vec<EntryDraft> {
        lines
            .into_iter()
            .filter_map(|(doc, line)| {
                let rate = self.catalog.service_rate(&line.product_ref);
                if rate.hours_required.is_zero() || rate.cost_per_hour.is_zero() {
                    tracing::debug!(
                        product = %line.product_ref,
                        invoice = %doc.id,
                        "No service rate configured, payout defaults to zero"
                    );
                }
                let Some(payout) = CommissionCalculator::mechanic_payout(
                    line.quantity,
                    rate,
                    line.is_service(),
                    line.mechanic.as_ref() == Some(mechanic),
                    self.negative_quantities,
                ) else {
                    tracing::warn!(
                        invoice = %doc.id,
                        line = %line.id,
                        quantity = %line.quantity,
                        "Skipping line with negative quantity"
                    );
                    return None;
                };
                Some(EntryDraft {
                    source: SourceRef::InvoiceLine(doc.id.clone(), line.id.clone()),
                    beneficiary: Beneficiary::Mechanic(mechanic.clone()),
                    invoice_name: doc.display_name().to_string(),
                    invoice_date: doc.date,
                    partner_name: doc.partner_name.clone(),
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    hours: payout.hours,
                    cost_per_hour: payout.cost_per_hour,
                    commission_percent: Decimal::ZERO,
                    base_amount: line.line_base_amount,
                    payout_amount: payout.payout,
                    currency: doc.currency,
                    period: Period::from_date(doc.date),
                })
            })
            .collect()
    }

    pub(crate) fn seller_drafts(
        &self,
        seller: &SellerId,
        documents: Vec<InvoiceDocument>,
    ) -> Vec<EntryDraft> {
        let percent = self.catalog.commission_percent(seller);
        if percent.is_zero() {
            tracing::debug!(seller = %seller, "No commission rate configured, commission defaults to zero");
        }
        documents
            .into_iter()
            .map(|doc| EntryDraft {
                source: SourceRef::Invoice(doc.id.clone()),
                beneficiary: Beneficiary::Seller(seller.clone()),
                invoice_name: doc.display_name().to_string(),
                invoice_date: doc.date,
                partner_name: doc.partner_name.clone(),
                product_name: String::new(),
                quantity: Decimal::ONE,
                hours: Decimal::ZERO,
                cost_per_hour: Decimal::ZERO,
                commission_percent: percent,
                base_amount: doc.base_amount,
                payout_amount: CommissionCalculator::seller_commission(doc.base_amount, percent),
                currency: doc.currency,
                period: Period::from_date(doc.date),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use iso_currency::Currency;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::entities::{
        invoice, invoice_line, mechanic, product, seller, DocumentStatus, PaymentStatus,
        ProductRef, ProductType, Seller, ServiceRate,
    };

    struct StubCatalog {
        rates: HashMap<ProductRef, ServiceRate>,
        percent: Decimal,
    }

    impl CatalogRepository for StubCatalog {
        fn service_rate(&self, product: &ProductRef) -> ServiceRate {
            self.rates.get(product).copied().unwrap_or_default()
        }

        fn commission_percent(&self, _seller: &SellerId) -> Decimal {
            self.percent
        }

        fn seller(&self, _seller: &SellerId) -> Option<Seller> {
            None
        }
    }

    fn doc(id: &str, base: Decimal) -> InvoiceDocument {
        InvoiceDocument {
            id: invoice(id),
            name: format!("INV/{}", id),
            partner_name: "Cliente".to_string(),
            status: DocumentStatus::Posted,
            payment_status: PaymentStatus::Paid,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            salesperson: Some(seller("ana")),
            base_amount: base,
            currency: Currency::MXN,
            lines: vec![],
            commission_percent: Decimal::ZERO,
            commission_amount: Decimal::ZERO,
        }
    }

    fn line(id: &str, product_id: &str, qty: Decimal) -> InvoiceLine {
        InvoiceLine {
            id: invoice_line(id),
            product_ref: product(product_id),
            product_name: "Tune-up".to_string(),
            product_type: ProductType::Service,
            quantity: qty,
            mechanic: Some(mechanic("luis")),
            line_base_amount: dec!(900),
        }
    }

    fn catalog() -> StubCatalog {
        StubCatalog {
            rates: vec![(product("tune"), ServiceRate::new(dec!(2), dec!(100)))]
                .into_iter()
                .collect(),
            percent: dec!(10),
        }
    }

    #[test]
    fn test_mechanic_drafts_compute_hours_and_payout() {
        let catalog = catalog();
        let r = Reconciler::new(&catalog, NegativeQuantityPolicy::Clawback);
        let drafts = r.mechanic_drafts(
            &mechanic("luis"),
            vec![
                (doc("1", dec!(900)), line("1a", "tune", dec!(3))),
                (doc("1", dec!(900)), line("1b", "unknown", dec!(3))),
            ],
        );
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].hours, dec!(6));
        assert_eq!(drafts[0].payout_amount, dec!(600));
        assert_eq!(
            drafts[0].source,
            SourceRef::InvoiceLine(invoice("1"), invoice_line("1a"))
        );
        assert_eq!(drafts[1].hours, Decimal::ZERO);
        assert_eq!(drafts[1].payout_amount, Decimal::ZERO);
    }

    #[test]
    fn test_excluded_negative_lines_produce_no_draft() {
        let catalog = catalog();
        let r = Reconciler::new(&catalog, NegativeQuantityPolicy::Exclude);
        let drafts = r.mechanic_drafts(
            &mechanic("luis"),
            vec![(doc("1", dec!(900)), line("1a", "tune", dec!(-1)))],
        );
        assert!(drafts.is_empty());
    }

    #[test]
    fn test_seller_drafts_apply_commission_percent() {
        let catalog = catalog();
        let r = Reconciler::new(&catalog, NegativeQuantityPolicy::Clawback);
        let drafts = r.seller_drafts(&seller("ana"), vec![doc("7", dec!(250.50))]);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].source, SourceRef::Invoice(invoice("7")));
        assert_eq!(drafts[0].commission_percent, dec!(10));
        assert_eq!(drafts[0].payout_amount, dec!(25.05));
        assert_eq!(drafts[0].period.month(), 3);
    }
}
