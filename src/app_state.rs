//! Implements a struct that holds the state of the REST server.

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    pagination::PaginationConfig,
    rate_limit::{RateLimitConfig, RateLimiter},
    timezone::get_local_offset,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The config that controls how to page lists of transactions.
    pub pagination_config: PaginationConfig,

    /// The per-client request limiter shared by all requests.
    pub rate_limiter: Arc<RateLimiter>,

    /// When the server started, reported by the health check.
    pub started_at: Instant,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if `local_timezone` is not a known timezone, if the
    /// default page size is out of range or if the database cannot be
    /// initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        pagination_config: PaginationConfig,
        rate_limit_config: RateLimitConfig,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezone(local_timezone.to_owned()));
        }

        pagination_config.validate()?;

        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            rate_limiter: Arc::new(RateLimiter::new(rate_limit_config)),
            started_at: Instant::now(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, pagination::PaginationConfig, rate_limit::RateLimitConfig};

    use super::AppState;

    #[test]
    fn rejects_unknown_timezone() {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");

        let got = AppState::new(
            connection,
            "Mars/Olympus_Mons",
            PaginationConfig::default(),
            RateLimitConfig::default(),
        );

        assert!(matches!(got, Err(Error::InvalidTimezone(_))));
    }

    #[test]
    fn rejects_default_page_size_above_maximum() {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");

        let got = AppState::new(
            connection,
            "Etc/UTC",
            PaginationConfig {
                default_page_size: 500,
                ..Default::default()
            },
            RateLimitConfig::default(),
        );

        assert!(matches!(got, Err(Error::InvalidPageSize(500, 100))));
    }

    #[test]
    fn initializes_database() {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");

        let state = AppState::new(
            connection,
            "Etc/UTC",
            PaginationConfig::default(),
            RateLimitConfig::default(),
        )
        .expect("Could not create app state.");

        let connection = state.db_connection.lock().expect("Could not lock database.");
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
            .expect("transaction table should exist");
        assert_eq!(count, 0);
    }
}
