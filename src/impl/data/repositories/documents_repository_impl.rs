use std::{
    collections::{BTreeMap, HashSet},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use fractic_server_error::ServerError;

use crate::{
    data::datasources::documents_csv_datasource::{
        DocumentsCsvDatasource, DocumentsCsvDatasourceImpl,
    },
    domain::repositories::documents_repository::DocumentsRepository,
    entities::{
        DateRange, InvoiceDocument, InvoiceId, InvoiceLine, MechanicId, SaleOrder, SaleOrderId,
        SellerId,
    },
    errors::{DocumentStoreLockPoisoned, DuplicateDocument, DuplicateDocumentLine},
};

#[derive(Debug, Default)]
struct DocumentStore {
    invoices: BTreeMap<InvoiceId, InvoiceDocument>,
    sale_orders: BTreeMap<SaleOrderId, SaleOrder>,
}

/// Source documents held in memory.
#[derive(Debug, Default)]
pub struct DocumentsRepositoryImpl {
    store: RwLock<DocumentStore>,
}

impl DocumentsRepositoryImpl {
    pub fn new(
        invoices: Vec<InvoiceDocument>,
        sale_orders: Vec<SaleOrder>,
    ) -> Result<Self, ServerError> {
        let mut store = DocumentStore::default();
        for doc in invoices {
            check_invoice_lines(&doc)?;
            if store.invoices.contains_key(&doc.id) {
                return Err(DuplicateDocument::new(doc.id.as_str()));
            }
            store.invoices.insert(doc.id.clone(), doc);
        }
        for order in sale_orders {
            check_order_lines(&order)?;
            if store.sale_orders.contains_key(&order.id) {
                return Err(DuplicateDocument::new(order.id.as_str()));
            }
            store.sale_orders.insert(order.id.clone(), order);
        }
        Ok(Self {
            store: RwLock::new(store),
        })
    }

    pub(crate) fn from_string(
        invoices_csv: &str,
        invoice_lines_csv: &str,
        sale_orders_csv: &str,
        sale_order_lines_csv: &str,
    ) -> Result<Self, ServerError> {
        let datasource = DocumentsCsvDatasourceImpl;
        Self::new(
            datasource.invoices_from_string(invoices_csv, invoice_lines_csv)?,
            datasource.sale_orders_from_string(sale_orders_csv, sale_order_lines_csv)?,
        )
    }

    /// Ids of every stored invoice and sale order.
    pub(crate) fn document_ids(&self) -> Result<(Vec<InvoiceId>, Vec<SaleOrderId>), ServerError> {
        let store = self.read()?;
        Ok((
            store.invoices.keys().cloned().collect(),
            store.sale_orders.keys().cloned().collect(),
        ))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DocumentStore>, ServerError> {
        self.store
            .read()
            .map_err(|e| DocumentStoreLockPoisoned::with_debug(&e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DocumentStore>, ServerError> {
        self.store
            .write()
            .map_err(|e| DocumentStoreLockPoisoned::with_debug(&e))
    }

    fn qualifying_invoices<'a>(
        store: &'a DocumentStore,
        range: &'a DateRange,
    ) -> impl Iterator<Item = &'a InvoiceDocument> {
        store
            .invoices
            .values()
            .filter(move |d| d.is_settled() && range.contains(d.date))
    }
}

/// Ledger entries are keyed by line id, so a repeated id would make two
/// lines share one entry.
fn check_invoice_lines(doc: &InvoiceDocument) -> Result<(), ServerError> {
    let mut seen = HashSet::new();
    for line in &doc.lines {
        if !seen.insert(&line.id) {
            return Err(DuplicateDocumentLine::new(line.id.as_str(), doc.id.as_str()));
        }
    }
    Ok(())
}

fn check_order_lines(order: &SaleOrder) -> Result<(), ServerError> {
    let mut seen = HashSet::new();
    for line in &order.lines {
        if !seen.insert(line.id.as_str()) {
            return Err(DuplicateDocumentLine::new(&line.id, order.id.as_str()));
        }
    }
    Ok(())
}

impl DocumentsRepository for DocumentsRepositoryImpl {
    fn find_qualifying_lines(
        &self,
        mechanic: &MechanicId,
        range: &DateRange,
    ) -> Result<Vec<(InvoiceDocument, InvoiceLine)>, ServerError> {
        let store = self.read()?;
        let mut found: Vec<(InvoiceDocument, InvoiceLine)> =
            Self::qualifying_invoices(&store, range)
                .flat_map(|d| {
                    d.lines
                        .iter()
                        .filter(|l| l.is_service() && l.mechanic.as_ref() == Some(mechanic))
                        .map(move |l| (d.clone(), l.clone()))
                })
                .collect();
        found.sort_by(|(da, la), (db, lb)| {
            (da.date, &da.id, &la.id).cmp(&(db.date, &db.id, &lb.id))
        });
        Ok(found)
    }

    fn find_qualifying_documents(
        &self,
        seller: &SellerId,
        range: &DateRange,
    ) -> Result<Vec<InvoiceDocument>, ServerError> {
        let store = self.read()?;
        let mut found: Vec<InvoiceDocument> = Self::qualifying_invoices(&store, range)
            .filter(|d| d.salesperson.as_ref() == Some(seller))
            .cloned()
            .collect();
        found.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        Ok(found)
    }

    fn invoice(&self, id: &InvoiceId) -> Result<Option<InvoiceDocument>, ServerError> {
        Ok(self.read()?.invoices.get(id).cloned())
    }

    fn save_invoice(&self, invoice: InvoiceDocument) -> Result<(), ServerError> {
        check_invoice_lines(&invoice)?;
        self.write()?.invoices.insert(invoice.id.clone(), invoice);
        Ok(())
    }

    fn delete_invoice(&self, id: &InvoiceId) -> Result<Option<InvoiceDocument>, ServerError> {
        Ok(self.write()?.invoices.remove(id))
    }

    fn sale_order(&self, id: &SaleOrderId) -> Result<Option<SaleOrder>, ServerError> {
        Ok(self.read()?.sale_orders.get(id).cloned())
    }

    fn save_sale_order(&self, order: SaleOrder) -> Result<(), ServerError> {
        check_order_lines(&order)?;
        self.write()?.sale_orders.insert(order.id.clone(), order);
        Ok(())
    }
}
