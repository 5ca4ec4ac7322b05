//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the caller bearer token.
pub const ENV_API_KEY: &str = "API_KEY";
/// Environment variable holding the DKIM signing domain.
pub const ENV_DOMAIN: &str = "DOMAIN";
/// Environment variable holding the DKIM private key.
pub const ENV_DKIM_PRIVATE_KEY: &str = "DKIM_PRIVATE_KEY";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "RELAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
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

/// Parse a configuration from a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay values from the environment using `lookup` to resolve variables.
///
/// Empty variables are ignored so an unset secret never blanks a file value.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(api_key) = get(ENV_API_KEY) {
        config.credentials.api_key = api_key;
    }
    if let Some(domain) = get(ENV_DOMAIN) {
        config.credentials.dkim_domain = domain;
    }
    if let Some(private_key) = get(ENV_DKIM_PRIVATE_KEY) {
        config.credentials.dkim_private_key = private_key;
    }
    if let Some(bind_address) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind_address;
    }
}

/// Load the file (or defaults when `path` is `None`), overlay the process
/// environment and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
