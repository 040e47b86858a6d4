//! Defines the transaction store trait and its SQLite implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use rusqlite::{Connection, params_from_iter, types::Value};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    pagination::PaginationParams,
    transaction::{
        core::{
            NewTransaction, TRANSACTION_COLUMNS, Transaction, TransactionUpdate,
            map_transaction_row, to_timestamp,
        },
        filter::TransactionFilter,
    },
};

/// Handles the creation, retrieval and modification of transactions.
pub trait TransactionStore {
    /// Insert a new transaction and return it with its assigned ID.
    fn create(&self, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve a transaction by its `id`.
    ///
    /// Returns [Error::NotFound] if there is no such transaction.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve the transactions matching `filter`, newest first.
    ///
    /// Returns every match if `page` is `None`.
    fn find_many(
        &self,
        filter: &TransactionFilter,
        page: Option<PaginationParams>,
    ) -> Result<Vec<Transaction>, Error>;

    /// Count the transactions matching `filter`.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error>;

    /// Apply `update` to the transaction `id` and set its update time to `now`.
    ///
    /// Returns [Error::NotFound] if there is no such transaction.
    fn update(
        &self,
        id: TransactionId,
        update: &TransactionUpdate,
        now: OffsetDateTime,
    ) -> Result<Transaction, Error>;

    /// Delete the transaction `id`.
    ///
    /// Returns [Error::NotFound] if there is no such transaction.
    fn delete(&self, id: TransactionId) -> Result<(), Error>;

    /// Check that the store can answer queries.
    fn ping(&self) -> Result<(), Error>;
}

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The transaction table must already exist, see [crate::initialize_db].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl FromRef<AppState> for SQLiteTransactionStore {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db_connection.clone())
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn create(&self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let created_at = to_timestamp(transaction.created_at)?;
        let connection = self.lock()?;

        let transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\" (type, amount, category, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    transaction.transaction_type,
                    transaction.amount,
                    transaction.category,
                    transaction.description,
                    created_at,
                    to_timestamp(OffsetDateTime::now_utc())?,
                ),
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], map_transaction_row)?;

        Ok(transaction)
    }

    fn find_many(
        &self,
        filter: &TransactionFilter,
        page: Option<PaginationParams>,
    ) -> Result<Vec<Transaction>, Error> {
        let (where_clause, parameters) = filter.to_where_clause()?;

        let mut query_string_parts = vec![
            format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\""),
            where_clause,
            "ORDER BY created_at DESC, id DESC".to_owned(),
        ];

        if let Some(page) = page {
            query_string_parts.push(format!("LIMIT {} OFFSET {}", page.limit, page.skip()));
        }

        let query_string = query_string_parts.join(" ");
        let connection = self.lock()?;
        let mut statement = connection.prepare(&query_string)?;

        statement
            .query_map(params_from_iter(parameters.iter()), map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let (where_clause, parameters) = filter.to_where_clause()?;

        let count: i64 = self.lock()?.query_row(
            &format!("SELECT COUNT(*) FROM \"transaction\" {where_clause}"),
            params_from_iter(parameters.iter()),
            |row| row.get(0),
        )?;

        Ok(count.unsigned_abs())
    }

    fn update(
        &self,
        id: TransactionId,
        update: &TransactionUpdate,
        now: OffsetDateTime,
    ) -> Result<Transaction, Error> {
        let mut assignments = Vec::new();
        let mut parameters = Vec::new();

        if let Some(transaction_type) = update.transaction_type {
            parameters.push(Value::Text(transaction_type.as_str().to_owned()));
            assignments.push(format!("type = ?{}", parameters.len()));
        }

        if let Some(amount) = update.amount {
            parameters.push(Value::Real(amount));
            assignments.push(format!("amount = ?{}", parameters.len()));
        }

        if let Some(category) = &update.category {
            parameters.push(Value::Text(category.clone()));
            assignments.push(format!("category = ?{}", parameters.len()));
        }

        if let Some(description) = &update.description {
            parameters.push(description.clone().map_or(Value::Null, Value::Text));
            assignments.push(format!("description = ?{}", parameters.len()));
        }

        parameters.push(Value::Text(to_timestamp(now)?));
        assignments.push(format!("updated_at = ?{}", parameters.len()));

        parameters.push(Value::Integer(id));
        let query_string = format!(
            "UPDATE \"transaction\" SET {} WHERE id = ?{} RETURNING {TRANSACTION_COLUMNS}",
            assignments.join(", "),
            parameters.len()
        );

        let transaction = self
            .lock()?
            .prepare(&query_string)?
            .query_row(params_from_iter(parameters.iter()), map_transaction_row)?;

        Ok(transaction)
    }

    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self
            .lock()?
            .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

        match rows_affected {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }

    fn ping(&self) -> Result<(), Error> {
        self.lock()?
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

        Ok(())
    }
}
