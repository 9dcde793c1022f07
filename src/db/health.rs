//! Database health check.
//!
//! [`check`] is the failure boundary of the dashboard: whatever happens while
//! connecting or querying is folded into a [`HealthStatus`] and never
//! propagated. At most one connection is opened per check and it is closed
//! before `check` returns.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::timeout;

use super::ConnectionConfig;

/// Outcome of a single health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HealthStatus {
    /// Connected and queried; `version` is the first comma-delimited segment.
    Connected { version: String },
    /// Connection or query failed.
    Unreachable { error: String },
    /// No host provisioned yet, nothing was attempted.
    Pending,
}

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// Opens database connections. Swapped for a fake in tests.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>, HealthError>;
}

/// A single open database connection.
#[async_trait]
pub trait Connection: Send {
    /// Raw output of the server version query.
    async fn server_version(&mut self) -> Result<String, HealthError>;

    /// Terminate the connection.
    async fn close(self: Box<Self>) -> Result<(), HealthError>;
}

/// Probe the database described by `config`.
///
/// Connecting, querying and closing are each bounded by `limit`.
pub async fn check(
    connector: &dyn Connector,
    config: &ConnectionConfig,
    limit: Duration,
) -> HealthStatus {
    if !config.is_provisioned() {
        tracing::debug!("No database host provisioned yet");
        return HealthStatus::Pending;
    }

    let mut conn = match timeout(limit, connector.connect(config)).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => return unreachable(config, e),
        Err(_) => return unreachable(config, HealthError::Timeout(limit)),
    };

    let version = match timeout(limit, conn.server_version()).await {
        Ok(result) => result,
        Err(_) => Err(HealthError::Timeout(limit)),
    };

    // A close failure is logged only; the probe result stands
    let closed = match timeout(limit, conn.close()).await {
        Ok(result) => result,
        Err(_) => Err(HealthError::Timeout(limit)),
    };
    if let Err(e) = closed {
        tracing::warn!(
            host = %config.host,
            port = %config.port,
            error = %e,
            "Failed to close database connection"
        );
    }

    match version {
        Ok(raw) => {
            let version = first_segment(&raw);
            tracing::info!(
                host = %config.host,
                port = %config.port,
                version = %version,
                "Database reachable"
            );
            HealthStatus::Connected { version }
        }
        Err(e) => unreachable(config, e),
    }
}

fn unreachable(config: &ConnectionConfig, error: HealthError) -> HealthStatus {
    tracing::warn!(
        host = %config.host,
        port = %config.port,
        error = %error,
        "Database unreachable"
    );
    HealthStatus::Unreachable {
        error: error.to_string(),
    }
}

/// "PostgreSQL 16.2 on x86_64, compiled by gcc" -> "PostgreSQL 16.2 on x86_64"
fn first_segment(raw: &str) -> String {
    raw.split(',').next().unwrap_or_default().trim().to_string()
}
