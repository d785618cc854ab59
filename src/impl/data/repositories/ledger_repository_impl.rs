use fractic_server_error::ServerError;

use crate::{
    data::datasources::ledger_datasource::{LedgerDatasource, LedgerDatasourceImpl},
    domain::repositories::ledger_repository::LedgerRepository,
    entities::{
        Beneficiary, CommissionPaymentEntry, EntryDraft, EntryId, InvoiceId, LedgerQuery,
        SourceRef,
    },
    errors::LedgerEntryNotFound,
};

/// Ledger backed by an in-memory table that can be saved to and restored
/// from a JSON snapshot.
#[derive(Default)]
pub struct LedgerRepositoryImpl<DS: LedgerDatasource = LedgerDatasourceImpl> {
    datasource: DS,
}

impl LedgerRepositoryImpl {
    pub fn new() -> Self {
        Self {
            datasource: LedgerDatasourceImpl::new(),
        }
    }
}

impl<DS: LedgerDatasource> LedgerRepositoryImpl<DS> {
    pub(crate) fn to_json(&self) -> Result<String, ServerError> {
        self.datasource.to_json()
    }

    pub(crate) fn load_json(&self, s: &str) -> Result<usize, ServerError> {
        let count = self.datasource.load_json(s)?;
        tracing::info!(entries = count, "Loaded ledger snapshot");
        Ok(count)
    }
}

impl<DS: LedgerDatasource> LedgerRepository for LedgerRepositoryImpl<DS> {
    fn get(&self, id: EntryId) -> Result<CommissionPaymentEntry, ServerError> {
        self.datasource
            .read(|t| t.get(id).cloned())?
            .ok_or_else(|| LedgerEntryNotFound::new(&id))
    }

    fn find_by_key(
        &self,
        source: &SourceRef,
        beneficiary: &Beneficiary,
    ) -> Result<Option<CommissionPaymentEntry>, ServerError> {
        let key = (source.clone(), beneficiary.clone());
        self.datasource.read(|t| t.find(&key).cloned())
    }

    fn create(&self, draft: EntryDraft) -> Result<CommissionPaymentEntry, ServerError> {
        self.datasource.transaction(|t| t.insert(draft))
    }

    fn reconcile(
        &self,
        drafts: Vec<EntryDraft>,
    ) -> Result<Vec<CommissionPaymentEntry>, ServerError> {
        self.datasource.transaction(|t| {
            drafts
                .into_iter()
                .map(|draft| match t.find(&draft.key()).cloned() {
                    Some(mut existing) => {
                        if existing.refresh_from(&draft) {
                            tracing::debug!(
                                entry = %existing.id,
                                source = %existing.source,
                                "Refreshed ledger entry"
                            );
                            t.update(existing)
                        } else {
                            Ok(existing)
                        }
                    }
                    None => {
                        let created = t.insert(draft)?;
                        tracing::debug!(
                            entry = %created.id,
                            source = %created.source,
                            beneficiary = %created.beneficiary,
                            "Created ledger entry"
                        );
                        Ok(created)
                    }
                })
                .collect()
        })
    }

    fn commit(
        &self,
        entries: Vec<CommissionPaymentEntry>,
    ) -> Result<Vec<CommissionPaymentEntry>, ServerError> {
        self.datasource
            .transaction(|t| entries.into_iter().map(|e| t.update(e)).collect())
    }

    fn search(&self, query: &LedgerQuery) -> Result<Vec<CommissionPaymentEntry>, ServerError> {
        let mut found = self.datasource.read(|t| {
            t.iter()
                .filter(|e| e.beneficiary == query.beneficiary)
                .filter(|e| query.range.contains(e.invoice_date))
                .filter(|e| query.paid.matches(e.paid))
                .cloned()
                .collect::<Vec<_>>()
        })?;
        found.sort_by(|a, b| (a.invoice_date, &a.source).cmp(&(b.invoice_date, &b.source)));
        Ok(found)
    }

    fn delete_by_invoice(&self, invoice: &InvoiceId) -> Result<usize, ServerError> {
        let removed = self
            .datasource
            .transaction(|t| Ok(t.remove_by_invoice(invoice)))?;
        if removed > 0 {
            tracing::info!(invoice = %invoice, removed, "Removed ledger entries of deleted invoice");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone as _, Utc};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        domain::logic::entry_impl::tests::draft,
        entities::{invoice, mechanic, operator, seller, DateRange, PaidFilter, PaymentMethod},
    };

    fn query(paid: PaidFilter) -> LedgerQuery {
        LedgerQuery {
            beneficiary: Beneficiary::Mechanic(mechanic("luis")),
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            )
            .unwrap(),
            paid,
        }
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let repo = LedgerRepositoryImpl::new();
        let drafts = vec![draft("1", dec!(100)), draft("2", dec!(50))];
        let first = repo.reconcile(drafts.clone()).unwrap();
        let second = repo.reconcile(drafts).unwrap();
        assert_eq!(first, second);
        assert_eq!(repo.search(&query(PaidFilter::All)).unwrap().len(), 2);
    }

    #[test]
    fn test_reconcile_keeps_payment_state() {
        let repo = LedgerRepositoryImpl::new();
        let mut entry = repo.reconcile(vec![draft("1", dec!(100))]).unwrap().remove(0);
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        entry.set_payment_method(PaymentMethod::Transfer, &operator("ana"), at);
        repo.commit(vec![entry]).unwrap();

        let refreshed = repo.reconcile(vec![draft("1", dec!(120))]).unwrap().remove(0);
        assert_eq!(refreshed.payout_amount, dec!(120));
        assert!(refreshed.paid);
        assert_eq!(refreshed.paid_at, Some(at));
        assert_eq!(refreshed.payment_method, Some(PaymentMethod::Transfer));
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let repo = LedgerRepositoryImpl::new();
        repo.create(draft("1", dec!(100))).unwrap();
        assert!(repo.create(draft("1", dec!(100))).is_err());
        let d = draft("1", dec!(0));
        assert!(repo.find_by_key(&d.source, &d.beneficiary).unwrap().is_some());
    }

    #[test]
    fn test_same_source_for_different_beneficiaries() {
        let repo = LedgerRepositoryImpl::new();
        let mut other = draft("1", dec!(100));
        other.beneficiary = Beneficiary::Seller(seller("ana"));
        repo.create(draft("1", dec!(100))).unwrap();
        assert!(repo.create(other).is_ok());
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let repo = LedgerRepositoryImpl::new();
        let entries = repo
            .reconcile(vec![draft("1", dec!(100)), draft("2", dec!(50))])
            .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

        // Someone else pays entry 2 first.
        let mut concurrent = entries[1].clone();
        concurrent.set_paid(true, &operator("ben"), at);
        repo.commit(vec![concurrent]).unwrap();

        let batch: Vec<_> = entries
            .into_iter()
            .map(|mut e| {
                e.set_paid(true, &operator("ana"), at);
                e
            })
            .collect();
        assert!(repo.commit(batch).is_err());
        assert_eq!(repo.search(&query(PaidFilter::Paid)).unwrap().len(), 1);
        assert_eq!(
            repo.search(&query(PaidFilter::Paid)).unwrap()[0].paid_by,
            Some(operator("ben"))
        );
    }

    #[test]
    fn test_search_filters_and_orders() {
        let repo = LedgerRepositoryImpl::new();
        let mut late = draft("0", dec!(10));
        late.invoice_date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let mut outside = draft("9", dec!(10));
        outside.invoice_date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        repo.reconcile(vec![late, draft("2", dec!(10)), draft("1", dec!(10)), outside])
            .unwrap();

        let found = repo.search(&query(PaidFilter::Unpaid)).unwrap();
        let ids: Vec<&str> = found.iter().map(|e| e.source.invoice().as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "0"]);
        assert!(repo.search(&query(PaidFilter::Paid)).unwrap().is_empty());
    }

    #[test]
    fn test_delete_by_invoice() {
        let repo = LedgerRepositoryImpl::new();
        repo.reconcile(vec![draft("1", dec!(100)), draft("2", dec!(50))])
            .unwrap();
        assert_eq!(repo.delete_by_invoice(&invoice("1")).unwrap(), 1);
        assert_eq!(repo.delete_by_invoice(&invoice("1")).unwrap(), 0);
        assert_eq!(repo.search(&query(PaidFilter::All)).unwrap().len(), 1);
    }

    #[test]
    fn test_get_unknown_entry_fails() {
        let repo = LedgerRepositoryImpl::new();
        assert!(repo.get(EntryId(42)).is_err());
    }
}
