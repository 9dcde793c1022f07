//! Global Warning System dashboard.
//!
//! Serves one HTML page reporting whether the backing PostgreSQL database is
//! reachable, plus a liveness probe. Credentials are resolved per request from
//! a provisioned secret directory, the environment, and built-in defaults.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
