//! Endpoint for listing transactions a page at a time.

use axum::extract::{FromRef, Query, State};

use crate::{
    AppState, Error,
    pagination::{Pagination, PaginationConfig, validate_pagination_params},
    response::PaginatedResponse,
    transaction::{
        core::Transaction,
        filter::{TransactionQuery, build_filter},
        store::{SQLiteTransactionStore, TransactionStore},
    },
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The store to read transactions from.
    store: SQLiteTransactionStore,
    /// The default and maximum page sizes.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::from_ref(state),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler for listing transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(query): Query<TransactionQuery>,
) -> Result<PaginatedResponse<Transaction>, Error> {
    list_transactions(&state.store, &query, &state.pagination_config)
}

/// Validate `query` and fetch one page of matching transactions.
///
/// # Errors
/// Returns [Error::Validation] if the paging or date parameters are invalid,
/// or a store error.
pub fn list_transactions(
    store: &impl TransactionStore,
    query: &TransactionQuery,
    pagination_config: &PaginationConfig,
) -> Result<PaginatedResponse<Transaction>, Error> {
    let params = validate_pagination_params(
        query.page.as_deref(),
        query.limit.as_deref(),
        pagination_config,
    )?;
    let filter = build_filter(query)?;

    let transactions = store.find_many(&filter, Some(params))?;
    let total_count = store.count(&filter)?;

    Ok(PaginatedResponse {
        data: transactions,
        pagination: Pagination::new(params, total_count),
    })
}
