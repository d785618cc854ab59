use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fractic_server_error::ServerError;

use crate::{
    data::repositories::ledger_repository_impl::LedgerRepositoryImpl,
    domain::repositories::ledger_repository::LedgerRepository,
    entities::{BulkPaymentOutcome, CommissionPaymentEntry, EntryId, OperatorId, PaymentMethod},
};

/// Payment-state writes on ledger entries.
///
/// Single-entry operations take the entry as the caller last saw it. If
/// somebody else changed it in the meantime the write fails with
/// `ConcurrentModification` instead of overwriting their payment.
#[async_trait]
pub trait PaymentUsecase: Send + Sync {
    async fn set_paid(
        &self,
        entry: &CommissionPaymentEntry,
        paid: bool,
        operator: &OperatorId,
        now: DateTime<Utc>,
    ) -> Result<CommissionPaymentEntry, ServerError>;

    async fn set_payment_method(
        &self,
        entry: &CommissionPaymentEntry,
        method: PaymentMethod,
        operator: &OperatorId,
        now: DateTime<Utc>,
    ) -> Result<CommissionPaymentEntry, ServerError>;

    async fn set_note(
        &self,
        entry: &CommissionPaymentEntry,
        note: Option<String>,
    ) -> Result<CommissionPaymentEntry, ServerError>;

    /// Pays every listed entry that is currently unpaid with the given
    /// method. Entries already paid are left exactly as they are. Either all
    /// unpaid entries are paid or, on any failure, none are.
    async fn bulk_mark_paid(
        &self,
        ids: &[EntryId],
        method: PaymentMethod,
        operator: &OperatorId,
        now: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<BulkPaymentOutcome, ServerError>;
}

pub struct PaymentUsecaseImpl<
    L = LedgerRepositoryImpl, // Default.
> where
    L: LedgerRepository,
{
    ledger: Arc<L>,
}

#[async_trait]
impl<L> PaymentUsecase for PaymentUsecaseImpl<L>
where
    L: LedgerRepository,
{
    async fn set_paid(
        &self,
        entry: &CommissionPaymentEntry,
        paid: bool,
        operator: &OperatorId,
        now: DateTime<Utc>,
    ) -> Result<CommissionPaymentEntry, ServerError> {
        let mut updated = entry.clone();
        updated.set_paid(paid, operator, now);
        self.commit_one(updated)
    }

    async fn set_payment_method(
        &self,
        entry: &CommissionPaymentEntry,
        method: PaymentMethod,
        operator: &OperatorId,
        now: DateTime<Utc>,
    ) -> Result<CommissionPaymentEntry, ServerError> {
        let mut updated = entry.clone();
        updated.set_payment_method(method, operator, now);
        self.commit_one(updated)
    }

    async fn set_note(
        &self,
        entry: &CommissionPaymentEntry,
        note: Option<String>,
    ) -> Result<CommissionPaymentEntry, ServerError> {
        let mut updated = entry.clone();
        updated.set_note(note);
        self.commit_one(updated)
    }

    async fn bulk_mark_paid(
        &self,
        ids: &[EntryId],
        method: PaymentMethod,
        operator: &OperatorId,
        now: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<BulkPaymentOutcome, ServerError> {
        let mut outcome = BulkPaymentOutcome::default();
        let mut to_pay = Vec::new();
        for id in ids {
            let mut entry = self.ledger.get(*id)?;
            if entry.paid {
                outcome.skipped.push(entry.id);
                continue;
            }
            entry.set_payment_method(method, operator, now);
            if note.is_some() {
                entry.set_note(note.clone());
            }
            outcome.paid.push(entry.id);
            to_pay.push(entry);
        }
        if !to_pay.is_empty() {
            self.ledger.commit(to_pay)?;
        }
        tracing::info!(
            operator = %operator,
            method = %method,
            paid = outcome.paid_count(),
            skipped = outcome.skipped_count(),
            "Bulk payment committed"
        );
        Ok(outcome)
    }
}

impl<L> PaymentUsecaseImpl<L>
where
    L: LedgerRepository,
{
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    fn commit_one(
        &self,
        entry: CommissionPaymentEntry,
    ) -> Result<CommissionPaymentEntry, ServerError> {
        let id = entry.id;
        self.ledger
            .commit(vec![entry])?
            .pop()
            .map_or_else(|| self.ledger.get(id), Ok)
    }
}
