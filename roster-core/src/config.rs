//! Runtime configuration
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional `roster.toml` (or an explicit file), then `ROSTER_*` environment
//! variables.

use ::config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://reqres.in/api";
pub const DEFAULT_API_KEY: &str = "reqres-free-v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Sessions last five minutes from login.
pub const DEFAULT_SESSION_DURATION_SECS: u64 = 300;
pub const DEFAULT_PER_PAGE: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Base URL of the remote user API
    pub api_base: String,
    /// Sent as `x-api-key` and as the `api_key` query parameter
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub session_duration_secs: u64,
    /// Page size assumed until the first page arrives
    pub per_page: u32,
    /// Where session and preference state is persisted
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_duration_secs: DEFAULT_SESSION_DURATION_SECS,
            per_page: DEFAULT_PER_PAGE,
            data_dir: None,
        }
    }
}

impl RosterConfig {
    /// Load configuration, optionally from an explicit file which must exist.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("api_key", DEFAULT_API_KEY)?
            .set_default(
                "request_timeout_secs",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?
            .set_default(
                "session_duration_secs",
                DEFAULT_SESSION_DURATION_SECS,
            )?
            .set_default("per_page", DEFAULT_PER_PAGE)?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("roster").required(false)),
        };

        let config: RosterConfig = builder
            .add_source(Environment::with_prefix("ROSTER").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Message("api_base must not be empty".into()));
        }
        if self.per_page == 0 {
            return Err(ConfigError::Message("per_page must be at least 1".into()));
        }
        if self.session_duration_secs == 0 {
            return Err(ConfigError::Message(
                "session_duration_secs must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_duration(&self) -> Duration {
        Duration::from_secs(self.session_duration_secs)
    }

    /// Configured data directory, else the platform data directory.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            ProjectDirs::from("", "roster", "roster")
                .map(|dirs| dirs.data_dir().to_path_buf())
        })
    }
}
