//! Endpoint for reading a single transaction.

use axum::extract::{Path, State};

use crate::{
    Error,
    response::ApiResponse,
    transaction::{
        core::Transaction,
        store::{SQLiteTransactionStore, TransactionStore},
        validation::validate_id,
    },
};

/// A route handler for getting a transaction by its ID.
pub async fn get_transaction_endpoint(
    State(store): State<SQLiteTransactionStore>,
    Path(transaction_id): Path<String>,
) -> Result<ApiResponse<Transaction>, Error> {
    get_transaction(&store, &transaction_id).map(ApiResponse::ok)
}

/// Parse `transaction_id` and fetch the transaction from `store`.
///
/// # Errors
/// Returns [Error::InvalidRequest] if `transaction_id` is not a positive
/// integer, or [Error::NotFound] if there is no such transaction.
pub fn get_transaction(
    store: &impl TransactionStore,
    transaction_id: &str,
) -> Result<Transaction, Error> {
    let transaction_id = validate_id(transaction_id).map_err(Error::InvalidRequest)?;

    store.get(transaction_id)
}
