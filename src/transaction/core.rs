//! Defines the core data models and database schema for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset, macros::{datetime, format_description}};

use crate::{Error, ValidationError, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money was earned, e.g. a salary payment.
    Income,
    /// Money was spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// Every transaction type, in the order they are listed to clients.
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    /// The wire and database representation of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    /// Parse a transaction type. Matching is exact, "income" is not accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|transaction_type| transaction_type.as_str() == s)
            .ok_or_else(|| {
                let valid_values: Vec<&str> = TransactionType::ALL
                    .iter()
                    .map(|transaction_type| transaction_type.as_str())
                    .collect();

                ValidationError::new(format!(
                    "Invalid transaction type. Must be one of: {}",
                    valid_values.join(", ")
                ))
            })
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or expense, i.e. an event where money was either earned or spent.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money earned or spent, always greater than zero.
    pub amount: f64,
    /// A free-form category such as "Salary" or "Food & Dining".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction dated now.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(transaction_type: TransactionType, amount: f64, category: &str) -> NewTransaction {
        NewTransaction {
            transaction_type,
            amount,
            category: category.to_owned(),
            description: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// The fields needed to insert a [Transaction] into the store.
///
/// Values are expected to have passed validation already, see
/// `validate_transaction_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// The category of the transaction, e.g. "Salary", "Travel".
    pub category: String,
    /// An optional description.
    pub description: Option<String>,
    /// When the transaction happened. May be in the past or up to a year ahead.
    pub created_at: OffsetDateTime,
}

impl NewTransaction {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(ToOwned::to_owned);
        self
    }

    /// Set the date and time the transaction happened.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

/// A partial update to a [Transaction].
///
/// `None` leaves the field unchanged. For `description`, `Some(None)` clears
/// the description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// The new transaction type.
    pub transaction_type: Option<TransactionType>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new category.
    pub category: Option<String>,
    /// The new description, `Some(None)` to remove it.
    pub description: Option<Option<String>>,
}

impl TransactionUpdate {
    /// Whether the update would leave every field unchanged.
    pub fn is_empty(&self) -> bool {
        self.transaction_type.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected for [map_transaction_row], in order.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, type, amount, category, description, created_at, updated_at";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                amount REAL NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    // Listing and summaries filter and sort by creation time.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_created_at ON \"transaction\"(created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in [TRANSACTION_COLUMNS].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        transaction_type: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        created_at: from_timestamp(&row.get::<_, String>(5)?, 5)?,
        updated_at: from_timestamp(&row.get::<_, String>(6)?, 6)?,
    })
}

/// The earliest moment that can be stored in the database.
pub(crate) const MIN_TIMESTAMP: OffsetDateTime = datetime!(0000-01-01 00:00 UTC);

/// The latest moment that can be stored in the database.
pub(crate) const MAX_TIMESTAMP: OffsetDateTime = datetime!(9999-12-31 23:59:59.999_999_999 UTC);

/// Whether `date_time` is within [MIN_TIMESTAMP] and [MAX_TIMESTAMP].
pub(crate) fn is_storable(date_time: OffsetDateTime) -> bool {
    (MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&date_time)
}

/// Convert a date-time to the text stored in the database.
///
/// Timestamps are stored in UTC with a four digit year and nine digit
/// fraction, so comparing them as text in SQL orders them chronologically.
///
/// # Errors
/// Returns [Error::Internal] if `date_time` is not [is_storable].
pub(crate) fn to_timestamp(date_time: OffsetDateTime) -> Result<String, Error> {
    if !is_storable(date_time) {
        return Err(Error::Internal(format!(
            "{date_time} cannot be stored as a timestamp"
        )));
    }

    date_time
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
        ))
        .map_err(|error| Error::Internal(format!("could not format {date_time}: {error}")))
}

/// Convert one end of a date range to a timestamp for comparing in SQL.
///
/// Bounds outside the storable range are clamped to it, which selects the
/// same rows.
pub(crate) fn to_timestamp_bound(date_time: OffsetDateTime) -> Result<String, Error> {
    to_timestamp(date_time.clamp(MIN_TIMESTAMP, MAX_TIMESTAMP))
}

fn from_timestamp(text: &str, column: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|error| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error)))
}

// ============================================================================
// TESTS
// ============================================================================
