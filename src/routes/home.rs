//! Dashboard page handler.
//!
//! Resolves connection parameters, probes the database once and renders the
//! outcome. Every probe outcome, including an unreachable database, renders
//! as 200; only a template failure yields an error page.

use std::time::Instant;

use axum::{extract::State, response::Html};
use chrono::Utc;
use tracing::instrument;

use crate::db::{self, resolver};
use crate::error::AppError;
use crate::state::AppState;
use crate::templates::{render_dashboard, DashboardView};

#[instrument(name = "home::index", skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let started = Instant::now();

    // Secret files are read from disk, keep that off the async workers
    let resolve_state = state.clone();
    let conn_config = tokio::task::spawn_blocking(move || {
        resolver::resolve(&resolve_state.config.database, &*resolve_state.env)
    })
    .await
    .map_err(|e| AppError::Internal(format!("credential resolution panicked: {}", e)))?;

    let status = db::check(
        state.connector.as_ref(),
        &conn_config,
        state.config.database.connect_timeout(),
    )
    .await;

    let view = DashboardView {
        ui: &state.config.ui,
        status: &status,
        host: &conn_config.host,
        port: &conn_config.port,
        checked_at: DashboardView::format_checked_at(Utc::now()),
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    Ok(Html(render_dashboard(&state.tera, &view)?))
}
