use std::{collections::HashSet, sync::Arc};

use fractic_server_error::ServerError;

use crate::{
    data::repositories::{
        catalog_repository_impl::CatalogRepositoryImpl,
        documents_repository_impl::DocumentsRepositoryImpl,
        ledger_repository_impl::LedgerRepositoryImpl,
    },
    domain::{
        repositories::{
            catalog_repository::CatalogRepository, documents_repository::DocumentsRepository,
            ledger_repository::LedgerRepository,
        },
        usecases::{
            payment_usecase::{PaymentUsecase as _, PaymentUsecaseImpl},
            reconcile_usecase::{ReconcileUsecase as _, ReconcileUsecaseImpl},
        },
    },
    entities::{
        Beneficiary, BulkPaymentOutcome, Clock, CommissionConfig, CommissionPaymentEntry,
        EntryId, EntryKey, LedgerQuery, OperatorContext, PaymentMethod, ReportFilter, ReportPayload,
        Snapshot, Totals,
    },
    presentation::report_builder::{ReportBuilder, ReportHeader},
};

/// Transient, parameterized view over the ledger for one operator.
///
/// Every filter change reconciles the ledger against the current documents
/// before the snapshot is rebuilt. Only entries whose source still
/// qualifies are shown; rows left behind by documents that changed
/// beneficiary, status or date stay in the ledger but drop out of view.
/// Payment actions write through to the shared ledger and refresh the
/// snapshot afterwards.
pub struct ReportingSession<
    C = CatalogRepositoryImpl,   // Default.
    D = DocumentsRepositoryImpl, // Default.
    L = LedgerRepositoryImpl,    // Default.
> where
    C: CatalogRepository,
    D: DocumentsRepository,
    L: LedgerRepository,
{
    catalog: Arc<C>,
    ledger: Arc<L>,
    reconcile_usecase: ReconcileUsecaseImpl<C, D, L>,
    payment_usecase: PaymentUsecaseImpl<L>,
    config: CommissionConfig,
    clock: Arc<dyn Clock>,
    operator: Arc<dyn OperatorContext>,
    snapshot: Snapshot,
    qualifying: HashSet<EntryKey>,
}

impl<C, D, L> ReportingSession<C, D, L>
where
    C: CatalogRepository,
    D: DocumentsRepository,
    L: LedgerRepository,
{
    pub fn new(
        catalog: Arc<C>,
        documents: Arc<D>,
        ledger: Arc<L>,
        config: CommissionConfig,
        clock: Arc<dyn Clock>,
        operator: Arc<dyn OperatorContext>,
    ) -> Self {
        Self {
            reconcile_usecase: ReconcileUsecaseImpl::new(
                catalog.clone(),
                documents,
                ledger.clone(),
                config.negative_quantities,
            ),
            payment_usecase: PaymentUsecaseImpl::new(ledger.clone()),
            catalog,
            ledger,
            config,
            clock,
            operator,
            snapshot: Snapshot::default(),
            qualifying: HashSet::new(),
        }
    }

    pub fn filter(&self) -> &ReportFilter {
        &self.snapshot.filter
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Replaces the filters, reconciles and rebuilds the snapshot. Period
    /// values are validated when the filter is built, so an invalid period
    /// never reaches this point. A filter without beneficiary or period
    /// yields an empty snapshot.
    pub async fn set_filters(&mut self, filter: ReportFilter) -> Result<&Snapshot, ServerError> {
        self.qualifying = match filter.query() {
            Some(query) => self
                .reconcile_usecase
                .reconcile(&query.beneficiary, &query.range)
                .await?
                .iter()
                .map(CommissionPaymentEntry::key)
                .collect(),
            None => HashSet::new(),
        };
        self.snapshot.filter = filter;
        self.refresh()?;
        Ok(&self.snapshot)
    }

    /// Pays every unpaid entry in the current snapshot with the given method.
    pub async fn mark_all_unpaid_as_paid(
        &mut self,
        method: PaymentMethod,
        note: Option<String>,
    ) -> Result<BulkPaymentOutcome, ServerError> {
        let ids: Vec<EntryId> = self
            .snapshot
            .entries
            .iter()
            .filter(|e| !e.paid)
            .map(|e| e.id)
            .collect();
        let outcome = self
            .payment_usecase
            .bulk_mark_paid(
                &ids,
                method,
                &self.operator.current_operator(),
                self.clock.now(),
                note,
            )
            .await?;
        self.refresh()?;
        Ok(outcome)
    }

    pub async fn set_paid(
        &mut self,
        id: EntryId,
        paid: bool,
    ) -> Result<CommissionPaymentEntry, ServerError> {
        let seen = self.seen_entry(id)?;
        let updated = self
            .payment_usecase
            .set_paid(&seen, paid, &self.operator.current_operator(), self.clock.now())
            .await?;
        self.refresh()?;
        Ok(updated)
    }

    pub async fn set_payment_method(
        &mut self,
        id: EntryId,
        method: PaymentMethod,
    ) -> Result<CommissionPaymentEntry, ServerError> {
        let seen = self.seen_entry(id)?;
        let updated = self
            .payment_usecase
            .set_payment_method(
                &seen,
                method,
                &self.operator.current_operator(),
                self.clock.now(),
            )
            .await?;
        self.refresh()?;
        Ok(updated)
    }

    pub async fn set_note(
        &mut self,
        id: EntryId,
        note: Option<String>,
    ) -> Result<CommissionPaymentEntry, ServerError> {
        let seen = self.seen_entry(id)?;
        let updated = self.payment_usecase.set_note(&seen, note).await?;
        self.refresh()?;
        Ok(updated)
    }

    /// Builds the report from the ledger and the documents as they are now,
    /// not from the snapshot, so payments made by other sessions show up and
    /// documents that stopped qualifying drop out.
    pub async fn render_report(&self) -> Result<ReportPayload, ServerError> {
        let filter = &self.snapshot.filter;
        let entries = match filter.query() {
            Some(query) => {
                let qualifying = self
                    .reconcile_usecase
                    .qualifying_keys(&query.beneficiary, &query.range)
                    .await?;
                self.search_qualifying(&query, &qualifying)?
            }
            None => Vec::new(),
        };
        let header = ReportHeader {
            beneficiary: filter.beneficiary.clone(),
            beneficiary_name: filter
                .beneficiary
                .as_ref()
                .map(|b| self.beneficiary_name(b))
                .unwrap_or_default(),
            period_label: filter.period.map(|p| p.label()).unwrap_or_default(),
            commission_percent: match &filter.beneficiary {
                Some(Beneficiary::Seller(s)) => Some(self.catalog.commission_percent(s)),
                _ => None,
            },
        };
        Ok(ReportBuilder::new(&self.config).build(header, &entries))
    }

    fn beneficiary_name(&self, beneficiary: &Beneficiary) -> String {
        match beneficiary {
            Beneficiary::Seller(s) => self
                .catalog
                .seller(s)
                .map_or_else(|| s.to_string(), |seller| seller.name),
            Beneficiary::Mechanic(m) => m.to_string(),
        }
    }

    /// The entry as this session last saw it; writes against it fail if
    /// someone else changed it since.
    fn seen_entry(&self, id: EntryId) -> Result<CommissionPaymentEntry, ServerError> {
        match self.snapshot.entries.iter().find(|e| e.id == id) {
            Some(e) => Ok(e.clone()),
            None => self.ledger.get(id),
        }
    }

    fn search_qualifying(
        &self,
        query: &LedgerQuery,
        qualifying: &HashSet<EntryKey>,
    ) -> Result<Vec<CommissionPaymentEntry>, ServerError> {
        Ok(self
            .ledger
            .search(query)?
            .into_iter()
            .filter(|e| qualifying.contains(&e.key()))
            .collect())
    }

    /// Re-reads the snapshot from the ledger without reconciling.
    fn refresh(&mut self) -> Result<(), ServerError> {
        let entries = match self.snapshot.filter.query() {
            Some(query) => self.search_qualifying(&query, &self.qualifying)?,
            None => Vec::new(),
        };
        self.snapshot.totals = Totals::of(&entries);
        self.snapshot.entries = entries;
        Ok(())
    }
}
