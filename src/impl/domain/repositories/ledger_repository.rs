use fractic_server_error::ServerError;

use crate::entities::{
    Beneficiary, CommissionPaymentEntry, EntryDraft, EntryId, InvoiceId, LedgerQuery, SourceRef,
};

/// Persistent store of commission payment entries, unique per
/// (source, beneficiary).
///
/// Every mutating call is one atomic transaction: it either commits all of
/// its changes or none of them.
pub trait LedgerRepository: Send + Sync {
    fn get(&self, id: EntryId) -> Result<CommissionPaymentEntry, ServerError>;

    fn find_by_key(
        &self,
        source: &SourceRef,
        beneficiary: &Beneficiary,
    ) -> Result<Option<CommissionPaymentEntry>, ServerError>;

    /// Inserts a new unpaid entry. Fails with `DuplicateEntry` if one
    /// already exists for the same key.
    fn create(&self, draft: EntryDraft) -> Result<CommissionPaymentEntry, ServerError>;

    /// Creates the missing entries and refreshes the descriptive fields of
    /// the existing ones, leaving payment fields untouched. Returns the
    /// resulting entries in draft order.
    fn reconcile(&self, drafts: Vec<EntryDraft>)
        -> Result<Vec<CommissionPaymentEntry>, ServerError>;

    /// Writes back modified entries. Each entry must carry the revision it
    /// was read at; a stale revision fails the whole batch with
    /// `ConcurrentModification`.
    fn commit(
        &self,
        entries: Vec<CommissionPaymentEntry>,
    ) -> Result<Vec<CommissionPaymentEntry>, ServerError>;

    /// Entries of the beneficiary within the date range, filtered by paid
    /// state, ordered by invoice date then source.
    fn search(&self, query: &LedgerQuery) -> Result<Vec<CommissionPaymentEntry>, ServerError>;

    /// Removes the entries derived from the invoice or any of its lines.
    fn delete_by_invoice(&self, invoice: &InvoiceId) -> Result<usize, ServerError>;
}
