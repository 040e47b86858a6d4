//! Turns list query parameters into a filter the store can run.

use rusqlite::types::Value;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error, ValidationError,
    transaction::{
        core::{TransactionType, to_timestamp_bound},
        validation::{Bound, parse_date_bound},
    },
};

/// The query string accepted when listing transactions.
///
/// Everything is optional and kept as text until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    /// The 1-based page number.
    pub page: Option<String>,
    /// The page size.
    pub limit: Option<String>,
    /// Only include this transaction type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Only include categories containing this text, ignoring case.
    pub category: Option<String>,
    /// Only include transactions created at or after this date.
    pub start_date: Option<String>,
    /// Only include transactions created at or before this date.
    pub end_date: Option<String>,
}

/// Which transactions a store query should return.
///
/// Results are always sorted newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include this transaction type.
    pub transaction_type: Option<TransactionType>,
    /// Case-insensitive substring of the category.
    pub category: Option<String>,
    /// The earliest `created_at`, inclusive.
    pub created_from: Option<OffsetDateTime>,
    /// The latest `created_at`, inclusive.
    pub created_to: Option<OffsetDateTime>,
}

impl TransactionFilter {
    /// A filter for transactions created within `start..=end`.
    pub fn created_between(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            created_from: Some(start),
            created_to: Some(end),
            ..Default::default()
        }
    }

    /// Build the SQL `WHERE` clause and its parameters for this filter.
    ///
    /// Returns an empty clause when nothing is filtered.
    pub(crate) fn to_where_clause(&self) -> Result<(String, Vec<Value>), Error> {
        let mut conditions = Vec::new();
        let mut parameters = Vec::new();

        if let Some(transaction_type) = self.transaction_type {
            parameters.push(Value::Text(transaction_type.as_str().to_owned()));
            conditions.push(format!("type = ?{}", parameters.len()));
        }

        if let Some(category) = &self.category {
            parameters.push(Value::Text(category.clone()));
            conditions.push(format!(
                "instr(lower(category), lower(?{})) > 0",
                parameters.len()
            ));
        }

        if let Some(created_from) = self.created_from {
            parameters.push(Value::Text(to_timestamp_bound(created_from)?));
            conditions.push(format!("created_at >= ?{}", parameters.len()));
        }

        if let Some(created_to) = self.created_to {
            parameters.push(Value::Text(to_timestamp_bound(created_to)?));
            conditions.push(format!("created_at <= ?{}", parameters.len()));
        }

        if conditions.is_empty() {
            return Ok((String::new(), parameters));
        }

        Ok((format!("WHERE {}", conditions.join(" AND ")), parameters))
    }
}

/// Build a store filter from the list query.
///
/// An unrecognised `type` is ignored rather than rejected. Empty values are
/// treated as missing. An `endDate` without a time covers that whole day.
///
/// # Errors
/// Returns a [ValidationError] if `startDate` or `endDate` cannot be parsed.
pub fn build_filter(query: &TransactionQuery) -> Result<TransactionFilter, ValidationError> {
    let transaction_type = non_empty(&query.transaction_type)
        .and_then(|transaction_type| transaction_type.parse().ok());

    let created_from = non_empty(&query.start_date)
        .map(|start| {
            parse_date_bound(start, Bound::Start)
                .ok_or_else(|| ValidationError::new("Invalid start date format"))
        })
        .transpose()?;

    let created_to = non_empty(&query.end_date)
        .map(|end| {
            parse_date_bound(end, Bound::End)
                .ok_or_else(|| ValidationError::new("Invalid end date format"))
        })
        .transpose()?;

    Ok(TransactionFilter {
        transaction_type,
        category: non_empty(&query.category).map(ToOwned::to_owned),
        created_from,
        created_to,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}
