//! Connection parameter resolution.
//!
//! Each credential field is looked up in three tiers: a file named after the
//! field in the secret directory, then an environment variable, then a
//! default. Any missing or unusable tier falls through to the next one; this
//! module never fails. Nothing is cached, so files written by the
//! provisioner are visible on the next request.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use super::ConnectionConfig;
use crate::config::{
    DatabaseSettings, DEFAULT_DB_PORT, ENV_DB_HOST, ENV_DB_NAME, ENV_DB_PASSWORD, ENV_DB_PORT,
    ENV_DB_USER, SECRET_FILE_HOST, SECRET_FILE_PASSWORD, SECRET_FILE_PORT, SECRET_FILE_USER,
};

/// Environment variable lookup, injectable so tests never touch the process environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the real process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

/// Resolve connection parameters from the secret directory, the environment and defaults.
pub fn resolve<F>(settings: &DatabaseSettings, lookup: F) -> ConnectionConfig
where
    F: Fn(&str) -> Option<String>,
{
    let dir = settings.secret_dir.as_path();
    let field = |file: &str, env_key: &str, default: &str| {
        read_secret(dir, file)
            .or_else(|| non_empty(lookup(env_key)))
            .unwrap_or_else(|| default.to_string())
    };

    ConnectionConfig {
        host: field(SECRET_FILE_HOST, ENV_DB_HOST, ""),
        port: field(SECRET_FILE_PORT, ENV_DB_PORT, DEFAULT_DB_PORT),
        user: field(SECRET_FILE_USER, ENV_DB_USER, settings.default_user.as_str()),
        password: field(SECRET_FILE_PASSWORD, ENV_DB_PASSWORD, ""),
        database: non_empty(lookup(ENV_DB_NAME)).unwrap_or_else(|| settings.name.clone()),
    }
}

/// Read one provisioned value, trimmed. `None` when absent, unreadable or blank.
fn read_secret(dir: &Path, name: &str) -> Option<String> {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(contents) => non_empty(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!(
                path = %path.display(),
                error = %e,
                "Secret file unreadable, falling back"
            );
            None
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn settings(dir: &Path) -> DatabaseSettings {
        DatabaseSettings {
            secret_dir: dir.to_path_buf(),
            ..DatabaseSettings::default()
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_provisioned() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve(&settings(dir.path()), env(&[]));
        assert_eq!(config.host, "");
        assert_eq!(config.port, "5432");
        assert_eq!(config.user, "pgadmin");
        assert_eq!(config.password, "");
        assert_eq!(config.database, "postgres");
        assert!(!config.is_provisioned());
    }

    #[test]
    fn test_missing_secret_dir_is_tolerated() {
        let config = resolve(
            &settings(&PathBuf::from("/nonexistent/secret/dir")),
            env(&[]),
        );
        assert_eq!(config.host, "");
        assert_eq!(config.port, "5432");
    }

    #[test]
    fn test_secret_file_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("host"), "db.example.com\n").unwrap();
        let config = resolve(&settings(dir.path()), env(&[]));
        assert_eq!(config.host, "db.example.com");
        assert!(config.is_provisioned());
    }

    #[test]
    fn test_secret_file_wins_over_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("host"), "from-file").unwrap();
        std::fs::write(dir.path().join("username"), "  file-user  ").unwrap();
        std::fs::write(dir.path().join("password"), "s3cret\n").unwrap();
        std::fs::write(dir.path().join("port"), "6543\n").unwrap();
        let config = resolve(
            &settings(dir.path()),
            env(&[
                ("DB_HOST", "from-env"),
                ("DB_USER", "env-user"),
                ("DB_PASSWORD", "env-pass"),
                ("DB_PORT", "7000"),
            ]),
        );
        assert_eq!(config.host, "from-file");
        assert_eq!(config.user, "file-user");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.port, "6543");
    }

    #[test]
    fn test_env_used_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve(
            &settings(dir.path()),
            env(&[
                ("DB_HOST", "env-host"),
                ("DB_PORT", "15432"),
                ("DB_USER", "app"),
                ("DB_PASSWORD", "pw"),
                ("DB_NAME", "warnings"),
            ]),
        );
        assert_eq!(config.host, "env-host");
        assert_eq!(config.port, "15432");
        assert_eq!(config.user, "app");
        assert_eq!(config.password, "pw");
        assert_eq!(config.database, "warnings");
    }

    #[test]
    fn test_blank_file_and_env_fall_through() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("port"), " \n").unwrap();
        let config = resolve(&settings(dir.path()), env(&[("DB_PORT", "")]));
        assert_eq!(config.port, "5432");
    }

    #[test]
    fn test_unreadable_entry_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where a file is expected cannot be read as a string
        std::fs::create_dir(dir.path().join("host")).unwrap();
        let config = resolve(&settings(dir.path()), env(&[("DB_HOST", "fallback")]));
        assert_eq!(config.host, "fallback");
    }

    #[test]
    fn test_configured_default_user() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.default_user = "dashboard".into();
        settings.name = "gws".into();
        let config = resolve(&settings, env(&[]));
        assert_eq!(config.user, "dashboard");
        assert_eq!(config.database, "gws");
    }

    #[test]
    fn test_reflects_files_written_later() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        assert_eq!(resolve(&settings, env(&[])).host, "");

        std::fs::write(dir.path().join("host"), "late.example.com\n").unwrap();
        assert_eq!(resolve(&settings, env(&[])).host, "late.example.com");
    }
}
