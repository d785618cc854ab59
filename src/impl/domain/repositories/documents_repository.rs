use fractic_server_error::ServerError;

use crate::entities::{
    DateRange, InvoiceDocument, InvoiceId, InvoiceLine, MechanicId, SaleOrder, SaleOrderId,
    SellerId,
};

/// Access to the source documents commissions are derived from.
///
/// Query results are ordered by document date, then document id (then line
/// id), and are empty rather than an error when nothing matches.
pub trait DocumentsRepository: Send + Sync {
    /// Service lines performed by the mechanic on settled invoices dated
    /// within the range.
    fn find_qualifying_lines(
        &self,
        mechanic: &MechanicId,
        range: &DateRange,
    ) -> Result<Vec<(InvoiceDocument, InvoiceLine)>, ServerError>;

    /// Settled invoices sold by the seller dated within the range.
    fn find_qualifying_documents(
        &self,
        seller: &SellerId,
        range: &DateRange,
    ) -> Result<Vec<InvoiceDocument>, ServerError>;

    fn invoice(&self, id: &InvoiceId) -> Result<Option<InvoiceDocument>, ServerError>;

    fn save_invoice(&self, invoice: InvoiceDocument) -> Result<(), ServerError>;

    fn delete_invoice(&self, id: &InvoiceId) -> Result<Option<InvoiceDocument>, ServerError>;

    fn sale_order(&self, id: &SaleOrderId) -> Result<Option<SaleOrder>, ServerError>;

    fn save_sale_order(&self, order: SaleOrder) -> Result<(), ServerError>;
}
