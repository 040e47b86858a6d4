//! Endpoint for creating a transaction.

use axum::extract::State;
use time::OffsetDateTime;

use crate::{
    Error,
    extract::JsonBody,
    response::ApiResponse,
    transaction::{
        core::Transaction,
        store::{SQLiteTransactionStore, TransactionStore},
        validation::{TransactionInput, ValidationMode, validate_transaction_data},
    },
};

/// A route handler for creating a new transaction.
///
/// Responds with 201 Created and the stored transaction.
pub async fn create_transaction_endpoint(
    State(store): State<SQLiteTransactionStore>,
    JsonBody(input): JsonBody<TransactionInput>,
) -> Result<ApiResponse<Transaction>, Error> {
    let transaction = create_transaction(&store, &input, OffsetDateTime::now_utc())?;

    tracing::info!("Created transaction {}", transaction.id);

    Ok(ApiResponse::created(transaction).with_message("Transaction created successfully"))
}

/// Validate `input` and insert it into `store`.
///
/// `now` is used when `input` has no `createdAt`.
///
/// # Errors
/// Returns [Error::Validation] if `input` breaks a rule, or a store error.
pub fn create_transaction(
    store: &impl TransactionStore,
    input: &TransactionInput,
    now: OffsetDateTime,
) -> Result<Transaction, Error> {
    let new_transaction =
        validate_transaction_data(input, ValidationMode::Create, now)?.into_new_transaction(now)?;

    store.create(new_transaction)
}
