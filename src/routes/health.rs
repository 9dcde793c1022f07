//! Liveness endpoint for container orchestration.

/// Liveness probe.
///
/// Returns "ok" whenever the process can answer HTTP. It never resolves
/// credentials or touches the database, so a down database does not get the
/// dashboard restarted.
pub async fn healthz() -> &'static str {
    "ok"
}
