//! This modules defines the common functionality for paging data.

use serde::Serialize;

use crate::{Error, ValidationError};

/// The config for pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 50,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Check that the default page size is one a client could ask for.
    ///
    /// # Errors
    /// Returns [Error::InvalidPageSize] if `default_page_size` is zero or
    /// larger than `max_page_size`.
    pub fn validate(&self) -> Result<(), Error> {
        if (1..=self.max_page_size).contains(&self.default_page_size) {
            Ok(())
        } else {
            Err(Error::InvalidPageSize(
                self.default_page_size,
                self.max_page_size,
            ))
        }
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The 1-based page number.
    pub page: u64,
    /// The number of items per page.
    pub limit: u64,
}

/// The largest `OFFSET` SQLite accepts.
const MAX_SKIP: u64 = i64::MAX as u64;

impl PaginationParams {
    /// The number of items before the first item on this page.
    ///
    /// Saturates at the largest offset SQLite accepts, so pages far past the
    /// end are simply empty.
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(MAX_SKIP)
    }
}

/// Parse and check the `page` and `limit` query parameters.
///
/// Missing or empty values fall back to the defaults in `config`.
///
/// # Errors
/// Returns a [ValidationError] if `page` is not a positive integer or `limit`
/// is not an integer between 1 and `config.max_page_size`.
pub fn validate_pagination_params(
    page: Option<&str>,
    limit: Option<&str>,
    config: &PaginationConfig,
) -> Result<PaginationParams, ValidationError> {
    let page = match parse_integer(page) {
        Ok(None) => config.default_page,
        Ok(Some(page)) if page >= 1 => page as u64,
        _ => return Err(ValidationError::new("Page must be a positive integer")),
    };

    let limit = match parse_integer(limit) {
        Ok(None) => config.default_page_size,
        Ok(Some(limit)) if limit >= 1 && limit as u64 <= config.max_page_size => limit as u64,
        _ => {
            return Err(ValidationError::new(format!(
                "Limit must be a positive integer between 1 and {}",
                config.max_page_size
            )));
        }
    };

    Ok(PaginationParams { page, limit })
}

fn parse_integer(value: Option<&str>) -> Result<Option<i64>, std::num::ParseIntError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Paging metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The current page.
    pub page: u64,
    /// The page size.
    pub limit: u64,
    /// The number of items across all pages.
    pub total_count: u64,
    /// The number of pages, zero when there are no items.
    pub total_pages: u64,
    /// Whether there is a page after this one.
    pub has_next: bool,
    /// Whether there is a page before this one.
    pub has_prev: bool,
}

impl Pagination {
    /// Compute the paging metadata for `params` over `total_count` items.
    pub fn new(params: PaginationParams, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(params.limit);

        Self {
            page: params.page,
            limit: params.limit,
            total_count,
            total_pages,
            has_next: params.page < total_pages,
            has_prev: params.page > 1,
        }
    }
}
