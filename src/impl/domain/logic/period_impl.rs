use chrono::{Datelike as _, NaiveDate};
use fractic_server_error::ServerError;

use crate::{
    entities::{DateRange, Period, PeriodFilter},
    errors::{InvalidDateRange, InvalidPeriodMonth, InvalidPeriodYear},
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Period {
    /// Parses a period from its "MM" and "YYYY" parts.
    pub fn parse(month: &str, year: &str) -> Result<Self, ServerError> {
        if month.len() != 2 || !month.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidPeriodMonth::new(month));
        }
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidPeriodYear::new(year));
        }
        let m: u32 = month.parse().map_err(|e| InvalidPeriodMonth::with_debug(month, &e))?;
        let y: i32 = year.parse().map_err(|e| InvalidPeriodYear::with_debug(year, &e))?;
        if !(1..=12).contains(&m) {
            return Err(InvalidPeriodMonth::new(month));
        }
        Ok(Period { year: y, month: m })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // Month is validated on construction, so day 1 always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month as usize).saturating_sub(1) % 12]
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ServerError> {
        if end < start {
            return Err(InvalidDateRange::new(&start, &end));
        }
        Ok(DateRange { start, end })
    }

    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

impl PeriodFilter {
    pub fn month(month: &str, year: &str) -> Result<Self, ServerError> {
        Ok(PeriodFilter::Month(Period::parse(month, year)?))
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self, ServerError> {
        Ok(PeriodFilter::Range(DateRange::new(start, end)?))
    }

    pub fn label(&self) -> String {
        match self {
            PeriodFilter::Range(r) => r.label(),
            PeriodFilter::Month(p) => p.label(),
        }
    }
}
