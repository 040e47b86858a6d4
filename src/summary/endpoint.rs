//! Endpoint for income and expense totals over a period.

use std::collections::BTreeMap;

use axum::extract::{FromRef, Query, State};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    response::ApiResponse,
    summary::{
        aggregation::{Summary, summarize},
        period::{Period, SummaryQuery, resolve_period},
    },
    timezone::local_now,
    transaction::{SQLiteTransactionStore, TransactionStore},
};

/// The state needed to summarise transactions.
#[derive(Debug, Clone)]
pub struct SummaryState {
    store: SQLiteTransactionStore,
    local_timezone: String,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The totals section of a summary response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    income: f64,
    expense: f64,
    net_income: f64,
    transaction_count: usize,
}

/// The per-category section of a summary response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    expense_by_category: BTreeMap<String, f64>,
    income_by_category: BTreeMap<String, f64>,
}

/// The `data` of a summary response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResponse {
    summary: SummaryTotals,
    breakdown: CategoryBreakdown,
    period: Period,
}

impl SummaryResponse {
    fn new(summary: Summary, period: Period) -> Self {
        Self {
            summary: SummaryTotals {
                income: summary.income,
                expense: summary.expense,
                net_income: summary.net_income,
                transaction_count: summary.transaction_count,
            },
            breakdown: CategoryBreakdown {
                expense_by_category: summary.expense_by_category,
                income_by_category: summary.income_by_category,
            },
            period,
        }
    }
}

/// A route handler for income and expense totals over a period.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    Query(query): Query<SummaryQuery>,
) -> Result<ApiResponse<SummaryResponse>, Error> {
    let now = local_now(&state.local_timezone)?;

    get_summary(&state.store, &query, now).map(ApiResponse::ok)
}

/// Resolve the period in `query` relative to `now` and summarise it.
///
/// # Errors
/// Returns [Error::Validation] for an invalid custom range, or a store error.
pub fn get_summary(
    store: &impl TransactionStore,
    query: &SummaryQuery,
    now: OffsetDateTime,
) -> Result<SummaryResponse, Error> {
    let period = resolve_period(query, now)?;
    let transactions = store.find_many(&period.filter(), None)?;

    Ok(SummaryResponse::new(summarize(&transactions), period))
}
