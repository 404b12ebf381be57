//! Configuration loader for tripchat.
//!
//! Reads `config.toml` and deserializes it into [`TripchatConfig`]. The file
//! is looked up from an explicit path, then `$TRIPCHAT_CONFIG`, then
//! `~/.tripchat/config.toml`. Only the last one may be absent.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

use tripchat_types::config::{CompletionConfig, TripchatConfig};
use tripchat_types::error::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "TRIPCHAT_CONFIG";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// Explicit sources (flag or env var) must exist; the default may not.
    pub required: bool,
}

/// `~/.tripchat/config.toml`, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tripchat").join("config.toml"))
}

/// Pick the config file: explicit path, else `$TRIPCHAT_CONFIG`, else the default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<ConfigSource> {
    resolve_from(
        explicit,
        std::env::var_os(CONFIG_ENV_VAR),
        default_config_path(),
    )
}

fn resolve_from(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    default_path: Option<PathBuf>,
) -> Option<ConfigSource> {
    if let Some(path) = explicit {
        return Some(ConfigSource {
            path: path.to_path_buf(),
            required: true,
        });
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Some(ConfigSource {
            path: PathBuf::from(value),
            required: true,
        });
    }
    default_path.map(|path| ConfigSource {
        path,
        required: false,
    })
}

/// Resolve, read, parse and validate the configuration.
pub async fn load_config(explicit: Option<&Path>) -> Result<TripchatConfig, ConfigError> {
    match resolve_config_path(explicit) {
        Some(source) => load_from(&source).await,
        None => {
            tracing::debug!("No home directory; using default configuration");
            Ok(TripchatConfig::default())
        }
    }
}

/// Load one config source.
///
/// - Missing optional file: [`TripchatConfig::default()`].
/// - Missing required file, unreadable file, bad TOML or failed validation: error.
pub async fn load_from(source: &ConfigSource) -> Result<TripchatConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(&source.path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !source.required => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                source.path.display()
            );
            return Ok(TripchatConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: source.path.clone(),
                source: err,
            });
        }
    };

    let config = toml::from_str::<TripchatConfig>(&content).map_err(|err| ConfigError::Parse {
        path: source.path.clone(),
        message: err.to_string(),
    })?;
    config.validate()?;

    tracing::debug!("Loaded configuration from {}", source.path.display());
    Ok(config)
}

/// Read the Completion Service key from the variable named by `api_key_env`.
///
/// Empty values count as unset.
pub fn resolve_api_key(config: &CompletionConfig) -> Option<SecretString> {
    std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
}
