//! The health check endpoint.

use std::time::Instant;

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState,
    transaction::{SQLiteTransactionStore, TransactionStore},
};

/// The state needed for the health check.
#[derive(Debug, Clone)]
pub struct HealthState {
    store: SQLiteTransactionStore,
    started_at: Instant,
}

impl FromRef<AppState> for HealthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::from_ref(state),
            started_at: state.started_at,
        }
    }
}

/// Whether the server can serve requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The database responded.
    Healthy,
    /// The database did not respond.
    Unhealthy,
}

/// Whether the database responded to a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    /// The probe query succeeded.
    Connected,
    /// The probe query failed.
    Disconnected,
}

/// The body of a health check response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    status: HealthStatus,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    version: &'static str,
    database: DatabaseStatus,
    /// Seconds since the server started.
    uptime: f64,
}

/// A route handler reporting whether the server and its database are up.
///
/// Responds with 503 Service Unavailable when the database cannot be reached.
pub async fn get_health_endpoint(State(state): State<HealthState>) -> Response {
    let report = check_health(&state.store, state.started_at);
    let status_code = match report.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(report)).into_response()
}

fn check_health(store: &impl TransactionStore, started_at: Instant) -> HealthReport {
    let (status, database) = match store.ping() {
        Ok(()) => (HealthStatus::Healthy, DatabaseStatus::Connected),
        Err(error) => {
            tracing::error!("Health check could not reach the database: {error}");
            (HealthStatus::Unhealthy, DatabaseStatus::Disconnected)
        }
    };

    HealthReport {
        status,
        timestamp: OffsetDateTime::now_utc(),
        version: env!("CARGO_PKG_VERSION"),
        database,
        uptime: started_at.elapsed().as_secs_f64(),
    }
}
