use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
};

use fractic_server_error::ServerError;

use crate::{
    data::models::ledger_entry_model::{LedgerEntryModel, LedgerSnapshotModel},
    entities::{CommissionPaymentEntry, EntryDraft, EntryId, EntryKey, InvoiceId},
    errors::{
        ConcurrentModification, DuplicateEntry, InvalidJson, LedgerEntryNotFound,
        LedgerLockPoisoned,
    },
};

/// In-memory ledger table with a unique index on (source, beneficiary).
#[derive(Debug, Clone, Default)]
pub(crate) struct LedgerTable {
    entries: BTreeMap<EntryId, CommissionPaymentEntry>,
    index: HashMap<EntryKey, EntryId>,
    next_id: u64,
}

impl LedgerTable {
    pub(crate) fn get(&self, id: EntryId) -> Option<&CommissionPaymentEntry> {
        self.entries.get(&id)
    }

    pub(crate) fn find(&self, key: &EntryKey) -> Option<&CommissionPaymentEntry> {
        self.index.get(key).and_then(|id| self.entries.get(id))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &CommissionPaymentEntry> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts a new unpaid entry for the draft.
    pub(crate) fn insert(&mut self, draft: EntryDraft) -> Result<CommissionPaymentEntry, ServerError> {
        let key = draft.key();
        if self.index.contains_key(&key) {
            return Err(DuplicateEntry::new(&key.0, &key.1));
        }
        self.next_id += 1;
        let id = EntryId(self.next_id);
        let entry = CommissionPaymentEntry::from_draft(id, draft);
        self.index.insert(key, id);
        self.entries.insert(id, entry.clone());
        Ok(entry)
    }

    /// Replaces a stored entry with a modified copy read at `entry.revision`,
    /// bumping the revision. The key of an entry cannot change.
    pub(crate) fn update(
        &mut self,
        mut entry: CommissionPaymentEntry,
    ) -> Result<CommissionPaymentEntry, ServerError> {
        let stored = self
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| LedgerEntryNotFound::new(&entry.id))?;
        if stored.revision != entry.revision {
            return Err(ConcurrentModification::new(
                &entry.id,
                entry.revision,
                stored.revision,
            ));
        }
        if stored.key() != entry.key() {
            return Err(DuplicateEntry::new(&entry.source, &entry.beneficiary));
        }
        entry.check_invariants()?;
        entry.revision += 1;
        *stored = entry.clone();
        Ok(entry)
    }

    /// Removes every entry derived from the invoice or one of its lines.
    pub(crate) fn remove_by_invoice(&mut self, invoice: &InvoiceId) -> usize {
        let doomed: Vec<EntryId> = self
            .entries
            .values()
            .filter(|e| e.source.invoice() == invoice)
            .map(|e| e.id)
            .collect();
        for id in &doomed {
            if let Some(e) = self.entries.remove(id) {
                self.index.remove(&e.key());
            }
        }
        doomed.len()
    }

    fn to_model(&self) -> LedgerSnapshotModel {
        LedgerSnapshotModel {
            next_id: self.next_id,
            entries: self.entries.values().map(LedgerEntryModel::from).collect(),
        }
    }

    /// Rebuilds the table, re-checking the unique index and the payment
    /// invariants of every row.
    fn from_model(model: LedgerSnapshotModel) -> Result<Self, ServerError> {
        let mut table = LedgerTable {
            next_id: model.next_id,
            ..Default::default()
        };
        for row in model.entries {
            let entry = CommissionPaymentEntry::try_from(row)?;
            entry.check_invariants()?;
            let key = entry.key();
            if table.index.contains_key(&key) || table.entries.contains_key(&entry.id) {
                return Err(DuplicateEntry::new(&key.0, &key.1));
            }
            table.next_id = table.next_id.max(entry.id.0);
            table.index.insert(key, entry.id);
            table.entries.insert(entry.id, entry);
        }
        Ok(table)
    }
}

pub(crate) trait LedgerDatasource: Send + Sync {
    /// Runs `f` against a consistent view of the table.
    fn read<T>(&self, f: impl FnOnce(&LedgerTable) -> T) -> Result<T, ServerError>;

    /// Runs `f` against a working copy of the table and swaps it in only if
    /// `f` succeeds.
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut LedgerTable) -> Result<T, ServerError>,
    ) -> Result<T, ServerError>;

    fn to_json(&self) -> Result<String, ServerError>;

    /// Replaces the whole table with the contents of a JSON snapshot.
    fn load_json(&self, s: &str) -> Result<usize, ServerError>;
}

#[derive(Default)]
pub struct LedgerDatasourceImpl {
    table: Mutex<LedgerTable>,
}

impl LedgerDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl LedgerDatasource for LedgerDatasourceImpl {
    fn read<T>(&self, f: impl FnOnce(&LedgerTable) -> T) -> Result<T, ServerError> {
        let table = self
            .table
            .lock()
            .map_err(|e| LedgerLockPoisoned::with_debug(&e))?;
        Ok(f(&*table))
    }

    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut LedgerTable) -> Result<T, ServerError>,
    ) -> Result<T, ServerError> {
        let mut table = self
            .table
            .lock()
            .map_err(|e| LedgerLockPoisoned::with_debug(&e))?;
        let mut working = table.clone();
        let result = f(&mut working)?;
        *table = working;
        Ok(result)
    }

    fn to_json(&self) -> Result<String, ServerError> {
        let model = self.read(|t| t.to_model())?;
        serde_json::to_string_pretty(&model).map_err(|e| InvalidJson::with_debug("ledger", &e))
    }

    fn load_json(&self, s: &str) -> Result<usize, ServerError> {
        let model: LedgerSnapshotModel =
            serde_json::from_str(s).map_err(|e| InvalidJson::with_debug("ledger", &e))?;
        let loaded = LedgerTable::from_model(model)?;
        let count = loaded.len();
        self.transaction(|t| {
            *t = loaded;
            Ok(())
        })?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        domain::logic::entry_impl::tests::draft,
        entities::{invoice, operator, PaymentMethod},
    };

    #[test]
    fn test_insert_enforces_unique_key() {
        let mut table = LedgerTable::default();
        let first = table.insert(draft("1", dec!(100))).unwrap();
        assert_eq!(first.id, EntryId(1));
        assert!(table.insert(draft("1", dec!(200))).is_err());
        assert_eq!(table.len(), 1);
        assert_eq!(table.find(&draft("1", dec!(0)).key()).unwrap().id, first.id);
    }

    #[test]
    fn test_update_checks_revision() {
        let mut table = LedgerTable::default();
        let entry = table.insert(draft("1", dec!(100))).unwrap();

        let mut a = entry.clone();
        a.set_note(Some("first".to_string()));
        let a = table.update(a).unwrap();
        assert_eq!(a.revision, 1);

        let mut stale = entry;
        stale.set_note(Some("second".to_string()));
        assert!(table.update(stale).is_err());
        assert_eq!(table.get(a.id).unwrap().note.as_deref(), Some("first"));
    }

    #[test]
    fn test_failed_transaction_leaves_table_untouched() {
        let ds = LedgerDatasourceImpl::new();
        ds.transaction(|t| t.insert(draft("1", dec!(100))).map(|_| ()))
            .unwrap();
        let result = ds.transaction(|t| {
            t.insert(draft("2", dec!(100)))?;
            t.insert(draft("1", dec!(100)))?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(ds.read(|t| t.len()).unwrap(), 1);
    }

    #[test]
    fn test_remove_by_invoice() {
        let mut table = LedgerTable::default();
        table.insert(draft("1", dec!(100))).unwrap();
        table.insert(draft("2", dec!(100))).unwrap();
        assert_eq!(table.remove_by_invoice(&invoice("1")), 1);
        assert_eq!(table.len(), 1);
        assert!(table.insert(draft("1", dec!(100))).is_ok());
    }

    #[test]
    fn test_json_snapshot_round_trip_keeps_payments() {
        let ds = LedgerDatasourceImpl::new();
        ds.transaction(|t| {
            let mut e = t.insert(draft("1", dec!(100)))?;
            t.insert(draft("2", dec!(50)))?;
            e.set_payment_method(
                PaymentMethod::Transfer,
                &operator("ana"),
                Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            );
            t.update(e)
        })
        .unwrap();
        let json = ds.to_json().unwrap();

        let restored = LedgerDatasourceImpl::new();
        assert_eq!(restored.load_json(&json).unwrap(), 2);
        let paid = restored.read(|t| t.get(EntryId(1)).cloned()).unwrap().unwrap();
        assert!(paid.paid);
        assert_eq!(paid.payment_method, Some(PaymentMethod::Transfer));
        assert_eq!(paid.revision, 1);

        // Ids keep growing after a load.
        let next = restored
            .transaction(|t| t.insert(draft("3", dec!(10))))
            .unwrap();
        assert_eq!(next.id, EntryId(3));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let ds = LedgerDatasourceImpl::new();
        assert!(ds.load_json("{ not json").is_err());
    }
}
