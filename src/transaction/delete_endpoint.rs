//! Endpoints for deleting a transaction by path or by query string.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::{
    Error,
    response::ApiResponse,
    transaction::{
        store::{SQLiteTransactionStore, TransactionStore},
        validation::validate_id,
    },
};

/// The query string for deleting a transaction with `DELETE /api/transactions?id=N`.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    id: Option<String>,
}

/// A route handler for deleting a transaction by the ID in the path.
pub async fn delete_transaction_endpoint(
    State(store): State<SQLiteTransactionStore>,
    Path(transaction_id): Path<String>,
) -> Result<ApiResponse<()>, Error> {
    delete_transaction(&store, &transaction_id)?;

    Ok(ApiResponse::message("Transaction deleted successfully"))
}

/// A route handler for deleting a transaction by the `id` query parameter.
pub async fn delete_transaction_by_query_endpoint(
    State(store): State<SQLiteTransactionStore>,
    Query(query): Query<DeleteQuery>,
) -> Result<ApiResponse<()>, Error> {
    delete_transaction(&store, query.id.as_deref().unwrap_or_default())?;

    Ok(ApiResponse::message("Transaction deleted successfully"))
}

fn delete_transaction(store: &impl TransactionStore, transaction_id: &str) -> Result<(), Error> {
    let transaction_id = validate_id(transaction_id).map_err(Error::InvalidRequest)?;

    store.delete(transaction_id).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
        }
    })?;

    tracing::info!("Deleted transaction {transaction_id}");

    Ok(())
}
