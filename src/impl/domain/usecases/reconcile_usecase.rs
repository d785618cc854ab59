use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::{
    data::repositories::{
        catalog_repository_impl::CatalogRepositoryImpl,
        documents_repository_impl::DocumentsRepositoryImpl,
        ledger_repository_impl::LedgerRepositoryImpl,
    },
    domain::{
        logic::reconciler::Reconciler,
        repositories::{
            catalog_repository::CatalogRepository, documents_repository::DocumentsRepository,
            ledger_repository::LedgerRepository,
        },
    },
    entities::{
        Beneficiary, CommissionPaymentEntry, DateRange, EntryDraft, EntryKey,
        NegativeQuantityPolicy,
    },
};

#[async_trait]
pub trait ReconcileUsecase: Send + Sync {
    /// Brings the ledger in line with the documents qualifying for the
    /// beneficiary in the range, and returns the matching entries (paid or
    /// not) in document order. Running it twice changes nothing.
    async fn reconcile(
        &self,
        beneficiary: &Beneficiary,
        range: &DateRange,
    ) -> Result<Vec<CommissionPaymentEntry>, ServerError>;

    /// Keys of the entries the documents currently support for the
    /// beneficiary in the range, without touching the ledger. Ledger rows
    /// outside this set belong to documents that stopped qualifying.
    async fn qualifying_keys(
        &self,
        beneficiary: &Beneficiary,
        range: &DateRange,
    ) -> Result<HashSet<EntryKey>, ServerError>;
}

pub struct ReconcileUsecaseImpl<
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
    negative_quantities: NegativeQuantityPolicy,
}

#[async_trait]
impl<C, D, L> ReconcileUsecase for ReconcileUsecaseImpl<C, D, L>
where
    C: CatalogRepository,
    D: DocumentsRepository,
    L: LedgerRepository,
{
    async fn reconcile(
        &self,
        beneficiary: &Beneficiary,
        range: &DateRange,
    ) -> Result<Vec<CommissionPaymentEntry>, ServerError> {
        let entries = self.ledger.reconcile(self.drafts(beneficiary, range)?)?;
        tracing::info!(
            beneficiary = %beneficiary,
            period = %range.label(),
            entries = entries.len(),
            "Reconciled commission ledger"
        );
        Ok(entries)
    }

    async fn qualifying_keys(
        &self,
        beneficiary: &Beneficiary,
        range: &DateRange,
    ) -> Result<HashSet<EntryKey>, ServerError> {
        Ok(self
            .drafts(beneficiary, range)?
            .iter()
            .map(EntryDraft::key)
            .collect())
    }
}

impl<C, D, L> ReconcileUsecaseImpl<C, D, L>
where
    C: CatalogRepository,
    D: DocumentsRepository,
    L: LedgerRepository,
{
    pub fn new(
        catalog: Arc<C>,
        documents: Arc<D>,
        ledger: Arc<L>,
        negative_quantities: NegativeQuantityPolicy,
    ) -> Self {
        Self {
            catalog,
            documents,
            ledger,
            negative_quantities,
        }
    }

    fn drafts(
        &self,
        beneficiary: &Beneficiary,
        range: &DateRange,
    ) -> Result<Vec<EntryDraft>, ServerError> {
        let reconciler = Reconciler::new(self.catalog.as_ref(), self.negative_quantities);
        Ok(match beneficiary {
            Beneficiary::Seller(s) => {
                reconciler.seller_drafts(s, self.documents.find_qualifying_documents(s, range)?)
            }
            Beneficiary::Mechanic(m) => {
                reconciler.mechanic_drafts(m, self.documents.find_qualifying_lines(m, range)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::entities::{invoice, mechanic, seller, SourceRef};

    const INVOICES: &str = "\
id,name,partner,status,payment_status,date,salesperson,base_amount,currency
1,INV/001,Taller Norte,posted,paid,2024-03-15,ana,100.00,MXN
2,INV/002,Cliente Sur,posted,paid,2024-03-16,ana,250.50,MXN
3,INV/003,Flotilla,posted,paid,2024-03-17,ana,99.99,MXN
4,INV/004,Pendiente,posted,not_paid,2024-03-18,ana,500,MXN
";

    const LINES: &str = "\
invoice_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount
1,1a,tune,Tune-up,service,3,luis,900
1,1b,wash,Wash,service,1,luis,50
2,2a,tune,Tune-up,service,1,marta,300
4,4a,tune,Tune-up,service,1,luis,300
";

    fn usecase() -> (
        ReconcileUsecaseImpl,
        Arc<DocumentsRepositoryImpl>,
        Arc<LedgerRepositoryImpl>,
    ) {
        let catalog = Arc::new(
            CatalogRepositoryImpl::from_string(
                "product_ref,hours_required,cost_per_hour\ntune,2,100\n",
                "team,commission_percent\nfloor,10\n",
                "seller,name,team,commission_percent\nana,Ana,floor,\n",
            )
            .unwrap(),
        );
        let documents = Arc::new(
            DocumentsRepositoryImpl::from_string(
                INVOICES,
                LINES,
                "id,name,partner,salesperson,base_amount,currency\n",
                "order_id,line_id\n",
            )
            .unwrap(),
        );
        let ledger = Arc::new(LedgerRepositoryImpl::new());
        let usecase = ReconcileUsecaseImpl::new(
            catalog,
            documents.clone(),
            ledger.clone(),
            NegativeQuantityPolicy::Clawback,
        );
        (usecase, documents, ledger)
    }

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_mechanic_reconciliation() {
        let (usecase, _, _) = usecase();
        let entries = usecase
            .reconcile(&Beneficiary::Mechanic(mechanic("luis")), &march())
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].hours, dec!(6));
        assert_eq!(entries[0].payout_amount, dec!(600));
        // No rate configured for the wash: zero, not an error.
        assert_eq!(entries[1].hours, dec!(0));
        assert_eq!(entries[1].payout_amount, dec!(0));
    }

    #[tokio::test]
    async fn test_seller_reconciliation() {
        let (usecase, _, _) = usecase();
        let entries = usecase
            .reconcile(&Beneficiary::Seller(seller("ana")), &march())
            .await
            .unwrap();
        let payouts: Vec<_> = entries.iter().map(|e| e.payout_amount).collect();
        assert_eq!(payouts, vec![dec!(10), dec!(25.05), dec!(9.999)]);
        assert_eq!(entries[0].source, SourceRef::Invoice(invoice("1")));
    }

    #[tokio::test]
    async fn test_reconciliation_is_idempotent() {
        let (usecase, _, ledger) = usecase();
        let who = Beneficiary::Mechanic(mechanic("luis"));
        let first = usecase.reconcile(&who, &march()).await.unwrap();
        let second = usecase.reconcile(&who, &march()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(ledger.delete_by_invoice(&invoice("1")).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_document_changes_flow_into_existing_entries() {
        let (usecase, documents, _) = usecase();
        let who = Beneficiary::Seller(seller("ana"));
        let before = usecase.reconcile(&who, &march()).await.unwrap();

        let mut doc = documents.invoice(&invoice("1")).unwrap().unwrap();
        doc.base_amount = dec!(200);
        documents.save_invoice(doc).unwrap();

        let after = usecase.reconcile(&who, &march()).await.unwrap();
        assert_eq!(after[0].id, before[0].id);
        assert_eq!(after[0].payout_amount, dec!(20));
        assert_eq!(after.len(), before.len());
    }

    #[tokio::test]
    async fn test_nothing_qualifies() {
        let (usecase, _, _) = usecase();
        let entries = usecase
            .reconcile(&Beneficiary::Mechanic(mechanic("nobody")), &march())
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_qualifying_keys_follow_the_documents() {
        let (usecase, documents, ledger) = usecase();
        let ana = Beneficiary::Seller(seller("ana"));
        usecase.reconcile(&ana, &march()).await.unwrap();

        let mut doc = documents.invoice(&invoice("2")).unwrap().unwrap();
        doc.salesperson = Some(seller("ben"));
        documents.save_invoice(doc).unwrap();

        let keys = usecase.qualifying_keys(&ana, &march()).await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(!keys.contains(&(SourceRef::Invoice(invoice("2")), ana.clone())));
        // The old row is kept, it just no longer qualifies.
        assert!(ledger
            .find_by_key(&SourceRef::Invoice(invoice("2")), &ana)
            .unwrap()
            .is_some());
    }
}
