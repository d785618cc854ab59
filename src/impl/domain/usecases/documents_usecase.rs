use std::sync::Arc;

use async_trait::async_trait;
use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    data::repositories::{
        catalog_repository_impl::CatalogRepositoryImpl,
        documents_repository_impl::DocumentsRepositoryImpl,
        ledger_repository_impl::LedgerRepositoryImpl,
    },
    domain::repositories::{
        catalog_repository::CatalogRepository, documents_repository::DocumentsRepository,
        ledger_repository::LedgerRepository,
    },
    entities::{
        InvoiceDocument, InvoiceId, InvoiceLine, InvoiceLineId, MechanicAssignment, MechanicId,
        SaleOrder, SaleOrderId, SaleOrderLine, SellerId,
    },
    errors::{InvalidCode, InvoiceNotFound, SaleOrderNotFound},
};

/// Maintenance of the source documents: keeps their derived commission
/// fields current and propagates mechanics from orders to invoices.
#[async_trait]
pub trait DocumentsUsecase: Send + Sync {
    async fn set_invoice_salesperson(
        &self,
        id: &InvoiceId,
        salesperson: Option<SellerId>,
    ) -> Result<InvoiceDocument, ServerError>;

    async fn set_invoice_base_amount(
        &self,
        id: &InvoiceId,
        base_amount: Decimal,
    ) -> Result<InvoiceDocument, ServerError>;

    async fn set_sale_order_salesperson(
        &self,
        id: &SaleOrderId,
        salesperson: Option<SellerId>,
    ) -> Result<SaleOrder, ServerError>;

    async fn set_sale_order_base_amount(
        &self,
        id: &SaleOrderId,
        base_amount: Decimal,
    ) -> Result<SaleOrder, ServerError>;

    /// Recomputes the derived commission fields of a loaded document set,
    /// ex. after the catalog rates changed.
    async fn recompute_commissions(
        &self,
        invoices: &[InvoiceId],
        sale_orders: &[SaleOrderId],
    ) -> Result<(), ServerError>;

    /// Sets the mechanic on the order's service lines. With `only_empty`,
    /// lines that already name a mechanic are kept.
    async fn assign_mechanic(
        &self,
        id: &SaleOrderId,
        mechanic: &MechanicId,
        only_empty: bool,
    ) -> Result<MechanicAssignment, ServerError>;

    /// Number of lines `assign_mechanic` would change, without writing.
    async fn preview_assign_mechanic(
        &self,
        id: &SaleOrderId,
        only_empty: bool,
    ) -> Result<usize, ServerError>;

    async fn prepare_invoice_line(
        &self,
        order: &SaleOrderId,
        order_line: &str,
        invoice_line: InvoiceLineId,
    ) -> Result<InvoiceLine, ServerError>;

    /// Service lines of the order without a mechanic. A warning list, not an
    /// error.
    async fn service_lines_missing_mechanic(
        &self,
        id: &SaleOrderId,
    ) -> Result<Vec<SaleOrderLine>, ServerError>;

    /// Deletes the invoice and every ledger entry derived from it. Returns
    /// the number of ledger entries removed.
    async fn delete_invoice(&self, id: &InvoiceId) -> Result<usize, ServerError>;
}

pub struct DocumentsUsecaseImpl<
    C = CatalogRepositoryImpl,   // Default.
    D = DocumentsRepositoryImpl, // Default.
    L = LedgerRepositoryImpl,    // Default.
> where
    C: CatalogRepository,
    D: DocumentsRepository,
    L: LedgerRepository,
{
    catalog: Arc<C>,
    documents: Arc<D>,
    ledger: Arc<L>,
}

#[async_trait]
impl<C, D, L> DocumentsUsecase for DocumentsUsecaseImpl<C, D, L>
where
    C: CatalogRepository,
    D: DocumentsRepository,
    L: LedgerRepository,
{
    async fn set_invoice_salesperson(
        &self,
        id: &InvoiceId,
        salesperson: Option<SellerId>,
    ) -> Result<InvoiceDocument, ServerError> {
        let mut doc = self.load_invoice(id)?;
        doc.salesperson = salesperson;
        self.store_invoice(doc)
    }

    async fn set_invoice_base_amount(
        &self,
        id: &InvoiceId,
        base_amount: Decimal,
    ) -> Result<InvoiceDocument, ServerError> {
        let mut doc = self.load_invoice(id)?;
        doc.base_amount = base_amount;
        self.store_invoice(doc)
    }

    async fn set_sale_order_salesperson(
        &self,
        id: &SaleOrderId,
        salesperson: Option<SellerId>,
    ) -> Result<SaleOrder, ServerError> {
        let mut order = self.load_sale_order(id)?;
        order.salesperson = salesperson;
        self.store_sale_order(order)
    }

    async fn set_sale_order_base_amount(
        &self,
        id: &SaleOrderId,
        base_amount: Decimal,
    ) -> Result<SaleOrder, ServerError> {
        let mut order = self.load_sale_order(id)?;
        order.base_amount = base_amount;
        self.store_sale_order(order)
    }

    async fn recompute_commissions(
        &self,
        invoices: &[InvoiceId],
        sale_orders: &[SaleOrderId],
    ) -> Result<(), ServerError> {
        for id in invoices {
            self.store_invoice(self.load_invoice(id)?)?;
        }
        for id in sale_orders {
            self.store_sale_order(self.load_sale_order(id)?)?;
        }
        Ok(())
    }

    async fn assign_mechanic(
        &self,
        id: &SaleOrderId,
        mechanic: &MechanicId,
        only_empty: bool,
    ) -> Result<MechanicAssignment, ServerError> {
        let mut order = self.load_sale_order(id)?;
        let assignment = order.assign_mechanic(mechanic, only_empty);
        if assignment.affected_count() > 0 {
            self.documents.save_sale_order(order)?;
        }
        tracing::info!(
            order = %id,
            mechanic = %mechanic,
            lines = assignment.affected_count(),
            "Assigned mechanic to service lines"
        );
        Ok(assignment)
    }

    async fn preview_assign_mechanic(
        &self,
        id: &SaleOrderId,
        only_empty: bool,
    ) -> Result<usize, ServerError> {
        Ok(self.load_sale_order(id)?.mechanic_targets(only_empty).len())
    }

    async fn prepare_invoice_line(
        &self,
        order: &SaleOrderId,
        order_line: &str,
        invoice_line: InvoiceLineId,
    ) -> Result<InvoiceLine, ServerError> {
        let order = self.load_sale_order(order)?;
        let line = order
            .line(order_line)
            .ok_or_else(|| InvalidCode::new("sale order line", order_line))?;
        if line.is_service() && line.mechanic.is_none() {
            tracing::warn!(order = %order.id, line = %line.id, "Service line has no mechanic");
        }
        Ok(line.to_invoice_line(invoice_line))
    }

    async fn service_lines_missing_mechanic(
        &self,
        id: &SaleOrderId,
    ) -> Result<Vec<SaleOrderLine>, ServerError> {
        let order = self.load_sale_order(id)?;
        let missing: Vec<SaleOrderLine> = order
            .service_lines_missing_mechanic()
            .into_iter()
            .cloned()
            .collect();
        for line in &missing {
            tracing::warn!(order = %id, line = %line.id, "Service line has no mechanic");
        }
        Ok(missing)
    }

    async fn delete_invoice(&self, id: &InvoiceId) -> Result<usize, ServerError> {
        self.load_invoice(id)?;
        // Ledger first: a failed cascade must leave the invoice in place.
        let removed = self.ledger.delete_by_invoice(id)?;
        self.documents.delete_invoice(id)?;
        Ok(removed)
    }
}

impl<C, D, L> DocumentsUsecaseImpl<C, D, L>
where
    C: CatalogRepository,
    D: DocumentsRepository,
    L: LedgerRepository,
{
    pub fn new(catalog: Arc<C>, documents: Arc<D>, ledger: Arc<L>) -> Self {
        Self {
            catalog,
            documents,
            ledger,
        }
    }

    fn load_invoice(&self, id: &InvoiceId) -> Result<InvoiceDocument, ServerError> {
        self.documents
            .invoice(id)?
            .ok_or_else(|| InvoiceNotFound::new(id.as_str()))
    }

    fn load_sale_order(&self, id: &SaleOrderId) -> Result<SaleOrder, ServerError> {
        self.documents
            .sale_order(id)?
            .ok_or_else(|| SaleOrderNotFound::new(id.as_str()))
    }

    fn store_invoice(&self, mut doc: InvoiceDocument) -> Result<InvoiceDocument, ServerError> {
        let percent = doc
            .salesperson
            .as_ref()
            .map_or(Decimal::ZERO, |s| self.catalog.commission_percent(s));
        doc.recompute_commission(percent);
        self.documents.save_invoice(doc.clone())?;
        Ok(doc)
    }

    fn store_sale_order(&self, mut order: SaleOrder) -> Result<SaleOrder, ServerError> {
        let (seller_name, percent) = match &order.salesperson {
            Some(s) => (
                self.catalog
                    .seller(s)
                    .map_or_else(|| s.to_string(), |seller| seller.name),
                self.catalog.commission_percent(s),
            ),
            None => (String::new(), Decimal::ZERO),
        };
        order.recompute_commission(seller_name, percent);
        self.documents.save_sale_order(order.clone())?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::entities::{
        invoice, invoice_line, mechanic, sale_order, seller, Beneficiary, CommissionPaymentEntry,
        DateRange, EntryDraft, EntryId, LedgerQuery, NegativeQuantityPolicy, SourceRef,
    };
    use crate::errors::LedgerLockPoisoned;
    use crate::domain::usecases::reconcile_usecase::{ReconcileUsecase as _, ReconcileUsecaseImpl};

    fn setup() -> (
        DocumentsUsecaseImpl,
        ReconcileUsecaseImpl,
        Arc<DocumentsRepositoryImpl>,
    ) {
        let catalog = Arc::new(
            CatalogRepositoryImpl::from_string(
                "product_ref,hours_required,cost_per_hour\ntune,2,100\n",
                "team,commission_percent\nfloor,5\n",
                "seller,name,team,commission_percent\nana,Ana Ruiz,floor,\nben,Ben Ortiz,,8\n",
            )
            .unwrap(),
        );
        let documents = Arc::new(
            DocumentsRepositoryImpl::from_string(
                "id,name,partner,status,payment_status,date,salesperson,base_amount,currency\n\
                 1,INV/001,Taller Norte,posted,paid,2024-03-15,ana,1000,MXN\n",
                "invoice_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount\n\
                 1,1a,tune,Tune-up,service,3,luis,900\n",
                "id,name,partner,salesperson,base_amount,currency\n\
                 S1,SO001,Taller Norte,ana,500,MXN\n",
                "order_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount\n\
                 S1,l1,tune,Tune-up,service,1,,300\n\
                 S1,l2,tune,Tune-up,service,1,marta,100\n\
                 S1,l3,oil,Oil,product,2,,100\n",
            )
            .unwrap(),
        );
        let ledger = Arc::new(LedgerRepositoryImpl::new());
        (
            DocumentsUsecaseImpl::new(catalog.clone(), documents.clone(), ledger.clone()),
            ReconcileUsecaseImpl::new(
                catalog,
                documents.clone(),
                ledger,
                NegativeQuantityPolicy::Clawback,
            ),
            documents,
        )
    }

    #[tokio::test]
    async fn test_invoice_commission_follows_salesperson_and_amount() {
        let (usecase, _, _) = setup();
        let doc = usecase
            .set_invoice_base_amount(&invoice("1"), dec!(2000))
            .await
            .unwrap();
        assert_eq!(doc.commission_percent, dec!(5));
        assert_eq!(doc.commission_amount, dec!(100));

        let doc = usecase
            .set_invoice_salesperson(&invoice("1"), Some(seller("ben")))
            .await
            .unwrap();
        assert_eq!(doc.commission_percent, dec!(8));
        assert_eq!(doc.commission_amount, dec!(160));

        let doc = usecase
            .set_invoice_salesperson(&invoice("1"), None)
            .await
            .unwrap();
        assert_eq!(doc.commission_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_sale_order_commission_and_seller_name() {
        let (usecase, _, _) = setup();
        usecase
            .recompute_commissions(&[], &[sale_order("S1")])
            .await
            .unwrap();
        let order = usecase
            .set_sale_order_salesperson(&sale_order("S1"), Some(seller("ben")))
            .await
            .unwrap();
        assert_eq!(order.seller_name, "Ben Ortiz");
        assert_eq!(order.commission_amount, dec!(40));

        let order = usecase
            .set_sale_order_base_amount(&sale_order("S1"), dec!(1000))
            .await
            .unwrap();
        assert_eq!(order.commission_amount, dec!(80));
    }

    #[tokio::test]
    async fn test_assign_mechanic_only_empty() {
        let (usecase, _, documents) = setup();
        assert_eq!(
            usecase
                .preview_assign_mechanic(&sale_order("S1"), true)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            usecase
                .preview_assign_mechanic(&sale_order("S1"), false)
                .await
                .unwrap(),
            2
        );

        let assignment = usecase
            .assign_mechanic(&sale_order("S1"), &mechanic("luis"), true)
            .await
            .unwrap();
        assert_eq!(assignment.affected_lines, vec!["l1".to_string()]);

        let order = documents.sale_order(&sale_order("S1")).unwrap().unwrap();
        assert_eq!(order.lines[0].mechanic, Some(mechanic("luis")));
        assert_eq!(order.lines[1].mechanic, Some(mechanic("marta")));
        assert_eq!(order.lines[2].mechanic, None);
        assert!(usecase
            .service_lines_missing_mechanic(&sale_order("S1"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_prepare_invoice_line_carries_mechanic() {
        let (usecase, _, _) = setup();
        let line = usecase
            .prepare_invoice_line(&sale_order("S1"), "l2", invoice_line("9a"))
            .await
            .unwrap();
        assert_eq!(line.id, invoice_line("9a"));
        assert_eq!(line.mechanic, Some(mechanic("marta")));
        assert!(usecase
            .prepare_invoice_line(&sale_order("S1"), "nope", invoice_line("9b"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_invoice_cascades_to_ledger() {
        let (usecase, reconcile, documents) = setup();
        let march = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        reconcile
            .reconcile(&Beneficiary::Mechanic(mechanic("luis")), &march)
            .await
            .unwrap();
        reconcile
            .reconcile(&Beneficiary::Seller(seller("ana")), &march)
            .await
            .unwrap();

        assert_eq!(usecase.delete_invoice(&invoice("1")).await.unwrap(), 2);
        assert!(documents.invoice(&invoice("1")).unwrap().is_none());
        assert!(usecase.delete_invoice(&invoice("1")).await.is_err());
    }

    /// Ledger whose invoice cascade always fails.
    struct BrokenCascadeLedger(LedgerRepositoryImpl);

    impl LedgerRepository for BrokenCascadeLedger {
        fn get(&self, id: EntryId) -> Result<CommissionPaymentEntry, ServerError> {
            self.0.get(id)
        }

        fn find_by_key(
            &self,
            source: &SourceRef,
            beneficiary: &Beneficiary,
        ) -> Result<Option<CommissionPaymentEntry>, ServerError> {
            self.0.find_by_key(source, beneficiary)
        }

        fn create(&self, draft: EntryDraft) -> Result<CommissionPaymentEntry, ServerError> {
            self.0.create(draft)
        }

        fn reconcile(
            &self,
            drafts: Vec<EntryDraft>,
        ) -> Result<Vec<CommissionPaymentEntry>, ServerError> {
            self.0.reconcile(drafts)
        }

        fn commit(
            &self,
            entries: Vec<CommissionPaymentEntry>,
        ) -> Result<Vec<CommissionPaymentEntry>, ServerError> {
            self.0.commit(entries)
        }

        fn search(&self, query: &LedgerQuery) -> Result<Vec<CommissionPaymentEntry>, ServerError> {
            self.0.search(query)
        }

        fn delete_by_invoice(&self, _invoice: &InvoiceId) -> Result<usize, ServerError> {
            Err(LedgerLockPoisoned::with_debug(&"cascade unavailable"))
        }
    }

    #[tokio::test]
    async fn test_failed_cascade_keeps_invoice() {
        let (_, _, documents) = setup();
        let catalog = Arc::new(
            CatalogRepositoryImpl::from_string(
                "product_ref,hours_required,cost_per_hour\ntune,2,100\n",
                "team,commission_percent\nfloor,5\n",
                "seller,name,team,commission_percent\nana,Ana Ruiz,floor,\n",
            )
            .unwrap(),
        );
        let usecase = DocumentsUsecaseImpl::new(
            catalog,
            documents.clone(),
            Arc::new(BrokenCascadeLedger(LedgerRepositoryImpl::new())),
        );

        assert!(usecase.delete_invoice(&invoice("1")).await.is_err());
        assert!(documents.invoice(&invoice("1")).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_documents() {
        let (usecase, _, _) = setup();
        assert!(usecase
            .set_invoice_base_amount(&invoice("404"), dec!(1))
            .await
            .is_err());
        assert!(usecase
            .assign_mechanic(&sale_order("404"), &mechanic("luis"), false)
            .await
            .is_err());
    }
}
