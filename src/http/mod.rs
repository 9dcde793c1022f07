//! HTTP server module.
//!
//! Binds the dashboard on plain HTTP and drains in-flight probes on
//! SIGTERM/SIGINT before exiting.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
