//! Database reachability probing.
//!
//! - [`resolver`] builds a [`ConnectionConfig`] from the secret directory,
//!   the environment and built-in defaults, fresh on every call.
//! - [`health`] turns a `ConnectionConfig` into a [`HealthStatus`] through the
//!   [`Connector`] abstraction.
//! - [`postgres`] is the production `Connector` backed by `sqlx`.

pub mod health;
pub mod postgres;
pub mod resolver;

use std::fmt;

pub use health::{check, Connection, Connector, HealthError, HealthStatus};
pub use postgres::PgConnector;
pub use resolver::{process_env, resolve, EnvLookup};

/// Database connection parameters resolved for a single request.
///
/// All fields are kept as strings exactly as provisioned; the port is only
/// parsed when a connection is attempted.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl ConnectionConfig {
    /// True once the provisioner has supplied a host.
    pub fn is_provisioned(&self) -> bool {
        !self.host.is_empty()
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
