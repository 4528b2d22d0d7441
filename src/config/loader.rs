//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{AppConfig, LogFormat, StoreBackend};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay well-known environment variables onto `config`.
///
/// `lookup` abstracts the environment so overrides can be tested without
/// mutating process state.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("SUPABASE_URL") {
        config.store.url = Some(url);
        config.store.backend = StoreBackend::Postgrest;
    }
    if let Some(key) = non_empty("SUPABASE_SERVICE_ROLE_KEY") {
        config.store.api_key = Some(key);
    }
    if let Some(password) = lookup("ADMIN_PASSWORD") {
        config.admin.password = Some(password);
    }
    if let Some(addr) = non_empty("WAITLIST_BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(format) = non_empty("WAITLIST_LOG_FORMAT") {
        match format.to_ascii_lowercase().as_str() {
            "json" => config.observability.log_format = LogFormat::Json,
            "pretty" => config.observability.log_format = LogFormat::Pretty,
            other => tracing::warn!(value = %other, "Ignoring unknown WAITLIST_LOG_FORMAT"),
        }
    }
}
