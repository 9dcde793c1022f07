//! Shared application state for request handlers.

use std::sync::Arc;
use tera::Tera;

use crate::config::AppConfig;
use crate::db::{process_env, Connector, EnvLookup};

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Everything here is read-only after startup. Database credentials are not
/// stored; handlers resolve them per request through `env` and the secret
/// directory named in `config`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub connector: Arc<dyn Connector>,
    pub env: EnvLookup,
}

impl AppState {
    /// Creates application state that reads credentials from the process environment.
    pub fn new(config: AppConfig, tera: Tera, connector: Arc<dyn Connector>) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            connector,
            env: process_env(),
        }
    }

    /// Replace the environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }
}
