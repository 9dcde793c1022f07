use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::Tera;

use crate::config::{UiConfig, HOST_PLACEHOLDER};
use crate::db::HealthStatus;
use crate::error::AppError;

/// Name the dashboard template is registered under
pub const DASHBOARD_TEMPLATE: &str = "index.html";

/// Initialize the Tera template engine with the embedded dashboard template
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_template(DASHBOARD_TEMPLATE, include_str!("../templates/index.html"))?;

    tera.register_filter("or_placeholder", or_placeholder_filter);

    Ok(tera)
}

/// Everything the dashboard page shows for one request
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub ui: &'a UiConfig,
    pub status: &'a HealthStatus,
    pub host: &'a str,
    pub port: &'a str,
    pub checked_at: String,
    pub elapsed_ms: u64,
}

impl<'a> DashboardView<'a> {
    pub fn format_checked_at(at: DateTime<Utc>) -> String {
        at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// Render the dashboard page
pub fn render_dashboard(tera: &Tera, view: &DashboardView<'_>) -> Result<String, AppError> {
    let context = tera::Context::from_serialize(view)?;
    Ok(tera.render(DASHBOARD_TEMPLATE, &context)?)
}

fn display_host(host: &str) -> &str {
    if host.is_empty() {
        HOST_PLACEHOLDER
    } else {
        host
    }
}

/// Replace an empty string with the pending-host placeholder
fn or_placeholder_filter(
    value: &tera::Value,
    _args: &std::collections::HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("or_placeholder filter expects a string"))?;
    Ok(tera::Value::String(display_host(s).to_string()))
}
