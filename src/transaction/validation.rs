//! Validation rules for transaction input, IDs and date ranges.
//!
//! Every function here is pure: nothing touches the database, so requests
//! that fail validation are rejected before the store is consulted.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::{
    Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, format_description::well_known::Rfc3339,
    macros::format_description,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    ValidationError,
    database_id::TransactionId,
    transaction::core::{NewTransaction, TransactionType, TransactionUpdate, is_storable},
};

/// The largest amount a single transaction may have.
pub const MAX_AMOUNT: f64 = 999_999_999.0;
/// The maximum length of a category, in characters.
pub const MAX_CATEGORY_LENGTH: usize = 50;
/// The maximum length of a description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
/// The longest date range, in days, accepted by [validate_date_range].
pub const MAX_DATE_RANGE_DAYS: i64 = 365;

/// Raw transaction fields as sent by a client.
///
/// Fields are kept as loosely typed JSON so that validation can report which
/// rule a field broke, e.g. a numeric category or an amount sent as a string.
/// A field that is absent is `None`, a field that is `null` is
/// `Some(Value::Null)`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    /// "INCOME" or "EXPENSE".
    #[serde(rename = "type", default, deserialize_with = "present")]
    pub transaction_type: Option<Value>,
    /// A number or numeric string.
    #[serde(default, deserialize_with = "present")]
    pub amount: Option<Value>,
    /// A free-form category name.
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Value>,
    /// An optional description, `null` clears it on update.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    /// When the transaction happened, only used on create.
    #[serde(default, deserialize_with = "present")]
    pub created_at: Option<Value>,
}

/// Distinguishes `null` from a missing field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Whether input is for a new transaction or a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// `type`, `amount` and `category` are required, `createdAt` is checked.
    Create,
    /// Every field is optional and `createdAt` is ignored.
    Update,
}

/// Transaction input that passed [validate_transaction_data].
///
/// Fields hold the parsed values of whatever the client supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedTransaction {
    /// The parsed transaction type.
    pub transaction_type: Option<TransactionType>,
    /// The parsed amount.
    pub amount: Option<f64>,
    /// The category exactly as supplied.
    pub category: Option<String>,
    /// `Some(None)` when the client sent `null`.
    pub description: Option<Option<String>>,
    /// The parsed creation date.
    pub created_at: Option<OffsetDateTime>,
}

impl ValidatedTransaction {
    /// Convert create input into the insert model.
    ///
    /// `now` is used when the client did not send `createdAt`. The description
    /// is passed through [sanitize_string].
    ///
    /// # Errors
    /// Returns a [ValidationError] if a required field is missing, i.e. the
    /// input was validated with [ValidationMode::Update].
    pub fn into_new_transaction(self, now: OffsetDateTime) -> Result<NewTransaction, ValidationError> {
        let transaction_type = self
            .transaction_type
            .ok_or_else(|| ValidationError::new("Transaction type is required"))?;
        let amount = self
            .amount
            .ok_or_else(|| ValidationError::new("Amount is required"))?;
        let category = self
            .category
            .ok_or_else(|| ValidationError::new("Category is required"))?;

        Ok(NewTransaction {
            transaction_type,
            amount,
            category,
            description: self.description.flatten().and_then(sanitize_description),
            created_at: self.created_at.unwrap_or(now),
        })
    }

    /// Convert update input into a partial update. Absent fields stay unchanged.
    pub fn into_update(self) -> TransactionUpdate {
        TransactionUpdate {
            transaction_type: self.transaction_type,
            amount: self.amount,
            category: self.category,
            description: self
                .description
                .map(|description| description.and_then(sanitize_description)),
        }
    }
}

fn sanitize_description(description: String) -> Option<String> {
    let sanitized = sanitize_string(&description);

    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Check transaction input against the field rules.
///
/// In [ValidationMode::Create], `type`, `amount` and `category` are required.
/// `createdAt` may be any time up to one calendar year after `now`.
/// Validation stops at the first broken rule.
///
/// # Errors
/// Returns a [ValidationError] describing the first broken rule.
pub fn validate_transaction_data(
    input: &TransactionInput,
    mode: ValidationMode,
    now: OffsetDateTime,
) -> Result<ValidatedTransaction, ValidationError> {
    if mode == ValidationMode::Create {
        if is_blank(input.transaction_type.as_ref()) {
            return Err(ValidationError::new("Transaction type is required"));
        }

        if matches!(input.amount, None | Some(Value::Null)) {
            return Err(ValidationError::new("Amount is required"));
        }

        if is_blank(input.category.as_ref()) {
            return Err(ValidationError::new("Category is required"));
        }
    }

    let transaction_type = match &input.transaction_type {
        value if is_blank(value.as_ref()) => None,
        Some(Value::String(transaction_type)) => Some(transaction_type.parse()?),
        Some(other) => Some(other.to_string().parse()?),
        None => None,
    };

    let amount = match &input.amount {
        None => None,
        Some(value) => Some(validate_amount(value)?),
    };

    let category = match &input.category {
        None => None,
        Some(value) => Some(validate_category(value)?),
    };

    let description = match &input.description {
        None => None,
        Some(Value::Null) => Some(None),
        Some(Value::String(description)) => {
            if char_count(description) > MAX_DESCRIPTION_LENGTH {
                return Err(ValidationError::new(format!(
                    "Description must be {MAX_DESCRIPTION_LENGTH} characters or less"
                )));
            }

            Some(Some(description.clone()))
        }
        Some(_) => return Err(ValidationError::new("Description must be a string")),
    };

    let created_at = match (mode, &input.created_at) {
        (ValidationMode::Create, value) if !is_blank(value.as_ref()) => {
            Some(validate_created_at(value.as_ref(), now)?)
        }
        _ => None,
    };

    Ok(ValidatedTransaction {
        transaction_type,
        amount,
        category,
        description,
        created_at,
    })
}

/// A missing, `null`, `false` or whitespace-only value.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

fn validate_amount(value: &Value) -> Result<f64, ValidationError> {
    let amount = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    let amount = match amount {
        Some(amount) if amount.is_finite() => amount,
        _ => return Err(ValidationError::new("Amount must be a valid number")),
    };

    if amount <= 0.0 {
        return Err(ValidationError::new("Amount must be greater than 0"));
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::new("Amount exceeds maximum limit"));
    }

    Ok(amount)
}

fn validate_category(value: &Value) -> Result<String, ValidationError> {
    let Value::String(category) = value else {
        return Err(ValidationError::new("Category must be a string"));
    };

    if category.trim().is_empty() {
        return Err(ValidationError::new("Category cannot be empty"));
    }

    if char_count(category) > MAX_CATEGORY_LENGTH {
        return Err(ValidationError::new(format!(
            "Category must be {MAX_CATEGORY_LENGTH} characters or less"
        )));
    }

    Ok(category.clone())
}

fn validate_created_at(
    value: Option<&Value>,
    now: OffsetDateTime,
) -> Result<OffsetDateTime, ValidationError> {
    let invalid_format = || ValidationError::new("Invalid date format for createdAt");

    let created_at = match value {
        Some(Value::String(text)) => parse_date_time(text).ok_or_else(invalid_format)?,
        _ => return Err(invalid_format()),
    };

    if !is_storable(created_at) {
        return Err(invalid_format());
    }

    // There is deliberately no lower bound, old transactions may be backfilled.
    let latest_allowed = one_year_after(now).ok_or_else(invalid_format)?;

    if created_at > latest_allowed {
        return Err(ValidationError::new(
            "Transaction date cannot be more than 1 year in the future",
        ));
    }

    Ok(created_at)
}

/// The same moment one calendar year later. February 29th maps to February 28th.
fn one_year_after(date_time: OffsetDateTime) -> Option<OffsetDateTime> {
    let next_year = date_time.year() + 1;

    date_time
        .replace_year(next_year)
        .or_else(|_| date_time.replace_day(28).and_then(|d| d.replace_year(next_year)))
        .ok()
}

/// Counts user-perceived characters rather than bytes.
fn char_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Parse a positive integer ID from a path or query string.
///
/// # Errors
/// Returns a [ValidationError] if `id` is not a positive integer.
pub fn validate_id(id: &str) -> Result<TransactionId, ValidationError> {
    match id.trim().parse::<TransactionId>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ValidationError::new("Invalid ID format")),
    }
}

/// Trim `input` and remove any angle brackets.
pub fn sanitize_string(input: &str) -> String {
    input.trim().replace(['<', '>'], "")
}

/// An inclusive window of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The earliest included moment.
    pub start: OffsetDateTime,
    /// The latest included moment.
    pub end: OffsetDateTime,
}

/// Parse and check a client supplied date range.
///
/// The span is measured between the parsed start and end. In the returned
/// range, an `end` given as a plain date covers that whole day.
///
/// # Errors
/// Returns a [ValidationError] if either date cannot be parsed, if `start`
/// is after `end`, or if the range spans more than [MAX_DATE_RANGE_DAYS] days.
pub fn validate_date_range(start: &str, end: &str) -> Result<DateRange, ValidationError> {
    let parsed_start =
        parse_date_time(start).ok_or_else(|| ValidationError::new("Invalid start date format"))?;
    let parsed_end =
        parse_date_time(end).ok_or_else(|| ValidationError::new("Invalid end date format"))?;

    if parsed_start > parsed_end {
        return Err(ValidationError::new("Start date must be before end date"));
    }

    if parsed_end - parsed_start > Duration::days(MAX_DATE_RANGE_DAYS) {
        return Err(ValidationError::new(format!(
            "Date range cannot exceed {MAX_DATE_RANGE_DAYS} days"
        )));
    }

    Ok(DateRange {
        start: parsed_start,
        end: parse_date_bound(end, Bound::End).unwrap_or(parsed_end),
    })
}

/// Which side of a range a date is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Plain dates start at midnight.
    Start,
    /// Plain dates extend to the last nanosecond of the day.
    End,
}

/// Parse a date or date-time for one side of a range.
pub fn parse_date_bound(text: &str, bound: Bound) -> Option<OffsetDateTime> {
    let text = text.trim();

    match (bound, parse_plain_date(text)) {
        (Bound::End, Some(date)) => Some(end_of_day(date)),
        (Bound::Start, Some(date)) => Some(date.midnight().assume_utc()),
        (_, None) => parse_date_time(text),
    }
}

/// Parse an RFC 3339 date-time, a date-time without an offset, or a plain date.
///
/// Date-times without an offset and plain dates are taken to be UTC.
pub fn parse_date_time(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time);
    }

    if let Some(date) = parse_plain_date(text) {
        return Some(date.midnight().assume_utc());
    }

    let without_offset = format_description!(
        version = 2,
        "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
    );

    PrimitiveDateTime::parse(text, without_offset)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn parse_plain_date(text: &str) -> Option<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

/// The last nanosecond of `date` in UTC.
pub(crate) fn end_of_day(date: Date) -> OffsetDateTime {
    date.with_time(Time::MAX).assume_utc()
}
