use chrono::NaiveDate;

use super::{ledger_entry::Period, party::Beneficiary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaidFilter {
    #[default]
    All,
    Paid,
    Unpaid,
}

/// Inclusive date range. Construct through `DateRange::new`, which rejects
/// ranges ending before they start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFilter {
    Range(DateRange),
    Month(Period),
}

/// Parameters of a reporting session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportFilter {
    pub beneficiary: Option<Beneficiary>,
    pub period: Option<PeriodFilter>,
    pub paid: PaidFilter,
}

/// Ledger search criteria, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerQuery {
    pub beneficiary: Beneficiary,
    pub range: DateRange,
    pub paid: PaidFilter,
}

// --

impl DateRange {
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl PaidFilter {
    pub fn matches(&self, paid: bool) -> bool {
        match self {
            PaidFilter::All => true,
            PaidFilter::Paid => paid,
            PaidFilter::Unpaid => !paid,
        }
    }
}

impl ReportFilter {
    pub fn new(
        beneficiary: Option<Beneficiary>,
        period: Option<PeriodFilter>,
        paid: PaidFilter,
    ) -> Self {
        Self {
            beneficiary,
            period,
            paid,
        }
    }

    /// Resolves the filter into a ledger query. `None` when the beneficiary
    /// or the period is still missing, in which case there is nothing to
    /// show.
    pub fn query(&self) -> Option<LedgerQuery> {
        let beneficiary = self.beneficiary.clone()?;
        let range = match self.period? {
            PeriodFilter::Range(r) => r,
            PeriodFilter::Month(p) => p.date_range(),
        };
        Some(LedgerQuery {
            beneficiary,
            range,
            paid: self.paid,
        })
    }
}
