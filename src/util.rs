use std::{path::Path, sync::Arc};

use fractic_server_error::ServerError;

use crate::{
    data::{
        models::config_model::CommissionConfigModel,
        repositories::{
            catalog_repository_impl::CatalogRepositoryImpl,
            documents_repository_impl::DocumentsRepositoryImpl,
            ledger_repository_impl::LedgerRepositoryImpl,
        },
    },
    domain::usecases::{
        documents_usecase::{DocumentsUsecase as _, DocumentsUsecaseImpl},
        payment_usecase::PaymentUsecaseImpl,
        reconcile_usecase::ReconcileUsecaseImpl,
        reporting_session::ReportingSession,
    },
    entities::{
        Clock, CommissionConfig, FixedOperator, OperatorContext, OperatorId, ReportPayload,
        SystemClock,
    },
    errors::{ReadError, WriteError},
    presentation::report_printer::ReportPrinter,
};

/// CSV and RON contents the engine is loaded from.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommissionSources<'a> {
    /// `None` uses the default configuration.
    pub config_ron: Option<&'a str>,
    pub service_rates_csv: &'a str,
    pub teams_csv: &'a str,
    pub sellers_csv: &'a str,
    pub invoices_csv: &'a str,
    pub invoice_lines_csv: &'a str,
    pub sale_orders_csv: &'a str,
    pub sale_order_lines_csv: &'a str,
}

// Files expected by `CommissionUtil::from_dir`.
const CONFIG_FILE: &str = "config.ron";
const SERVICE_RATES_FILE: &str = "service_rates.csv";
const TEAMS_FILE: &str = "teams.csv";
const SELLERS_FILE: &str = "sellers.csv";
const INVOICES_FILE: &str = "invoices.csv";
const INVOICE_LINES_FILE: &str = "invoice_lines.csv";
const SALE_ORDERS_FILE: &str = "sale_orders.csv";
const SALE_ORDER_LINES_FILE: &str = "sale_order_lines.csv";

/// Wires the default repositories together and hands out use cases and
/// reporting sessions sharing one ledger.
pub struct CommissionUtil {
    catalog: Arc<CatalogRepositoryImpl>,
    documents: Arc<DocumentsRepositoryImpl>,
    ledger: Arc<LedgerRepositoryImpl>,
    config: CommissionConfig,
    printer: ReportPrinter,
}

impl CommissionUtil {
    pub async fn from_string(sources: &CommissionSources<'_>) -> Result<Self, ServerError> {
        let config = match sources.config_ron {
            Some(ron) => CommissionConfig::try_from(CommissionConfigModel::from_ron(ron)?)?,
            None => CommissionConfig::default(),
        };
        let catalog = Arc::new(CatalogRepositoryImpl::from_string(
            sources.service_rates_csv,
            sources.teams_csv,
            sources.sellers_csv,
        )?);
        let documents = Arc::new(DocumentsRepositoryImpl::from_string(
            sources.invoices_csv,
            sources.invoice_lines_csv,
            sources.sale_orders_csv,
            sources.sale_order_lines_csv,
        )?);
        let util = Self {
            catalog,
            documents,
            ledger: Arc::new(LedgerRepositoryImpl::new()),
            config,
            printer: ReportPrinter::new(),
        };

        // Derived commission fields are not part of the exports.
        let (invoices, sale_orders) = util.documents.document_ids()?;
        util.documents_usecase()
            .recompute_commissions(&invoices, &sale_orders)
            .await?;
        tracing::info!(
            invoices = invoices.len(),
            sale_orders = sale_orders.len(),
            "Loaded commission sources"
        );
        Ok(util)
    }

    /// Loads the standard file set from a directory. `config.ron` is
    /// optional; every CSV file is required.
    pub async fn from_dir<P>(dir: P) -> Result<Self, ServerError>
    where
        P: AsRef<Path> + Send,
    {
        let dir = dir.as_ref();
        let config_path = dir.join(CONFIG_FILE);
        let config_ron = if tokio::fs::try_exists(&config_path)
            .await
            .map_err(|e| ReadError::with_debug(&e))?
        {
            Some(read(&config_path).await?)
        } else {
            None
        };
        let service_rates_csv = read(dir.join(SERVICE_RATES_FILE)).await?;
        let teams_csv = read(dir.join(TEAMS_FILE)).await?;
        let sellers_csv = read(dir.join(SELLERS_FILE)).await?;
        let invoices_csv = read(dir.join(INVOICES_FILE)).await?;
        let invoice_lines_csv = read(dir.join(INVOICE_LINES_FILE)).await?;
        let sale_orders_csv = read(dir.join(SALE_ORDERS_FILE)).await?;
        let sale_order_lines_csv = read(dir.join(SALE_ORDER_LINES_FILE)).await?;
        Self::from_string(&CommissionSources {
            config_ron: config_ron.as_deref(),
            service_rates_csv: &service_rates_csv,
            teams_csv: &teams_csv,
            sellers_csv: &sellers_csv,
            invoices_csv: &invoices_csv,
            invoice_lines_csv: &invoice_lines_csv,
            sale_orders_csv: &sale_orders_csv,
            sale_order_lines_csv: &sale_order_lines_csv,
        })
        .await
    }

    pub fn config(&self) -> &CommissionConfig {
        &self.config
    }

    /// Session for the operator, stamped with the system clock.
    pub fn session(&self, operator: OperatorId) -> ReportingSession {
        self.session_with(Arc::new(SystemClock), Arc::new(FixedOperator(operator)))
    }

    pub fn session_with(
        &self,
        clock: Arc<dyn Clock>,
        operator: Arc<dyn OperatorContext>,
    ) -> ReportingSession {
        ReportingSession::new(
            self.catalog.clone(),
            self.documents.clone(),
            self.ledger.clone(),
            self.config.clone(),
            clock,
            operator,
        )
    }

    pub fn reconcile_usecase(&self) -> ReconcileUsecaseImpl {
        ReconcileUsecaseImpl::new(
            self.catalog.clone(),
            self.documents.clone(),
            self.ledger.clone(),
            self.config.negative_quantities,
        )
    }

    pub fn payment_usecase(&self) -> PaymentUsecaseImpl {
        PaymentUsecaseImpl::new(self.ledger.clone())
    }

    pub fn documents_usecase(&self) -> DocumentsUsecaseImpl {
        DocumentsUsecaseImpl::new(
            self.catalog.clone(),
            self.documents.clone(),
            self.ledger.clone(),
        )
    }

    pub fn print_text(&self, report: &ReportPayload) -> String {
        self.printer.print_text(report)
    }

    pub fn print_csv(&self, report: &ReportPayload) -> Result<String, ServerError> {
        self.printer.print_csv(report)
    }

    /// Writes the whole ledger to a JSON snapshot file.
    pub async fn save_ledger<P>(&self, path: P) -> Result<(), ServerError>
    where
        P: AsRef<Path> + Send,
    {
        let json = self.ledger.to_json()?;
        tokio::fs::write(path.as_ref(), json)
            .await
            .map_err(|e| WriteError::with_debug(&path.as_ref().display().to_string(), &e))
    }

    /// Replaces the ledger with the contents of a JSON snapshot file and
    /// returns the number of entries loaded.
    pub async fn load_ledger<P>(&self, path: P) -> Result<usize, ServerError>
    where
        P: AsRef<Path> + Send,
    {
        let json = read(path).await?;
        self.ledger.load_json(&json)
    }
}

async fn read<P: AsRef<Path>>(path: P) -> Result<String, ServerError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ReadError::with_debug(&e))
}
