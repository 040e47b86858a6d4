//! Resolves which window of time a summary covers.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime, Time, UtcOffset};

use crate::{
    ValidationError,
    calendar::{first_day_of_month, last_day_of_month},
    transaction::{Bound, TransactionFilter, parse_date_bound},
};

/// The query string accepted by the summary endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    /// "month" (the default), "year" or "all".
    pub period: Option<String>,
    /// The start of a custom range, requires `end_date`.
    pub start_date: Option<String>,
    /// The end of a custom range, requires `start_date`.
    pub end_date: Option<String>,
}

/// The kind of window a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// The current calendar month.
    Month,
    /// The current calendar year.
    Year,
    /// A client supplied date range.
    Custom,
    /// Every transaction.
    All,
}

/// A resolved summary window. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// What kind of window this is.
    #[serde(rename = "type")]
    pub kind: PeriodKind,
    /// The earliest included moment, `None` for [PeriodKind::All].
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<OffsetDateTime>,
    /// The latest included moment, `None` for [PeriodKind::All].
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<OffsetDateTime>,
}

impl Period {
    /// The store filter selecting the transactions in this window.
    pub fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            created_from: self.start_date,
            created_to: self.end_date,
            ..Default::default()
        }
    }

    fn bounded(kind: PeriodKind, first_day: Date, last_day: Date, offset: UtcOffset) -> Self {
        Self {
            kind,
            start_date: Some(first_day.midnight().assume_offset(offset)),
            end_date: Some(last_day.with_time(Time::MAX).assume_offset(offset)),
        }
    }
}

/// Work out the summary window for `query`.
///
/// A `startDate` and `endDate` pair takes precedence over `period` and may
/// span any length of time. An `endDate` without a time covers that whole day.
/// A missing `period` means the current month and an unrecognised one means
/// all time. Month and year windows are computed in the offset of `now` and
/// include the whole of their last day.
///
/// # Errors
/// Returns a [ValidationError] if a custom date cannot be parsed or the start
/// is after the end.
pub fn resolve_period(query: &SummaryQuery, now: OffsetDateTime) -> Result<Period, ValidationError> {
    if let (Some(start), Some(end)) = (non_empty(&query.start_date), non_empty(&query.end_date)) {
        let start = parse_date_bound(start, Bound::Start)
            .ok_or_else(|| ValidationError::new("Invalid start date format"))?;
        let end = parse_date_bound(end, Bound::End)
            .ok_or_else(|| ValidationError::new("Invalid end date format"))?;

        if start > end {
            return Err(ValidationError::new("Start date must be before end date"));
        }

        return Ok(Period {
            kind: PeriodKind::Custom,
            start_date: Some(start),
            end_date: Some(end),
        });
    }

    let today = now.date();
    let offset = now.offset();

    let period = match non_empty(&query.period).unwrap_or("month") {
        "month" => {
            let first_day = first_day_of_month(today);
            let last_day = last_day_of_month(today);
            Period::bounded(PeriodKind::Month, first_day, last_day, offset)
        }
        "year" => {
            let first_day = first_day_of_year(today);
            let last_day = first_day_of_year(first_day + Duration::days(366)) - Duration::DAY;
            Period::bounded(PeriodKind::Year, first_day, last_day, offset)
        }
        _ => Period {
            kind: PeriodKind::All,
            start_date: None,
            end_date: None,
        },
    };

    Ok(period)
}

fn first_day_of_year(date: Date) -> Date {
    date - Duration::days(i64::from(date.ordinal()) - 1)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}
