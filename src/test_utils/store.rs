use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState,
    db::initialize,
    pagination::PaginationConfig,
    rate_limit::RateLimitConfig,
    transaction::{SQLiteTransactionStore, Transaction, TransactionStore, TransactionType},
};

pub(crate) fn get_test_store() -> SQLiteTransactionStore {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)))
}

pub(crate) fn get_test_app_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(
        connection,
        "Etc/UTC",
        PaginationConfig::default(),
        RateLimitConfig::default(),
    )
    .expect("Could not create app state.")
}

pub(crate) fn insert_transaction(
    store: &impl TransactionStore,
    transaction_type: TransactionType,
    amount: f64,
    category: &str,
    created_at: OffsetDateTime,
) -> Transaction {
    store
        .create(Transaction::build(transaction_type, amount, category).created_at(created_at))
        .expect("Could not create transaction")
}
