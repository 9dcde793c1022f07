//! PostgreSQL connector backed by a single unpooled `sqlx::PgConnection`.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection as _};

use super::health::{Connection, Connector, HealthError};
use super::ConnectionConfig;
use crate::config::VERSION_QUERY;

#[derive(Debug, Default, Clone, Copy)]
pub struct PgConnector;

impl PgConnector {
    pub fn new() -> Self {
        Self
    }

    fn options(config: &ConnectionConfig) -> Result<PgConnectOptions, HealthError> {
        let port: u16 = config
            .port
            .parse()
            .map_err(|_| HealthError::InvalidPort(config.port.clone()))?;

        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(port)
            .database(&config.database)
            .username(&config.user)
            .application_name(env!("CARGO_PKG_NAME"))
            // The per-statement log would record every probe at info level
            .disable_statement_logging();
        if !config.password.is_empty() {
            options = options.password(&config.password);
        }
        Ok(options)
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>, HealthError> {
        let options = Self::options(config)?;
        let conn = PgConnection::connect_with(&options).await?;
        Ok(Box::new(PgProbeConnection { conn }))
    }
}

struct PgProbeConnection {
    conn: PgConnection,
}

#[async_trait]
impl Connection for PgProbeConnection {
    async fn server_version(&mut self) -> Result<String, HealthError> {
        let version: String = sqlx::query_scalar(VERSION_QUERY)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(version)
    }

    async fn close(self: Box<Self>) -> Result<(), HealthError> {
        self.conn.close().await?;
        Ok(())
    }
}
