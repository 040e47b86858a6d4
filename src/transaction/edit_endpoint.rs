//! Endpoint for partially updating a transaction.

use axum::extract::{Path, State};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::TransactionId,
    extract::JsonBody,
    response::ApiResponse,
    transaction::{
        core::Transaction,
        store::{SQLiteTransactionStore, TransactionStore},
        validation::{TransactionInput, ValidationMode, validate_id, validate_transaction_data},
    },
};

/// A route handler for updating a transaction, used for both PUT and PATCH.
///
/// Only the fields present in the body are changed. The ID and the existence
/// of the transaction are checked before the body, so a missing transaction
/// is reported as not found even if the body is malformed.
pub async fn edit_transaction_endpoint(
    State(store): State<SQLiteTransactionStore>,
    Path(transaction_id): Path<String>,
    body: Result<JsonBody<TransactionInput>, Error>,
) -> Result<ApiResponse<Transaction>, Error> {
    let transaction_id = validate_id(&transaction_id).map_err(Error::InvalidRequest)?;

    let input = match body {
        Ok(JsonBody(input)) => input,
        Err(error) => {
            store.get(transaction_id)?;
            return Err(error);
        }
    };
    let transaction = update_transaction(&store, transaction_id, &input, OffsetDateTime::now_utc())?;

    tracing::info!("Updated transaction {}", transaction.id);

    Ok(ApiResponse::ok(transaction).with_message("Transaction updated successfully"))
}

/// Validate `input` as a partial update and apply it to the transaction `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such transaction,
/// [Error::Validation] if `input` breaks a rule, or another store error.
pub fn update_transaction(
    store: &impl TransactionStore,
    id: TransactionId,
    input: &TransactionInput,
    now: OffsetDateTime,
) -> Result<Transaction, Error> {
    store.get(id)?;

    let update = validate_transaction_data(input, ValidationMode::Update, now)?.into_update();

    store.update(id, &update, now)
}
