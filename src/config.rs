//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML config file (`<config dir>/checkin-kiosk/config.toml`, or `--config`)
//! 3. Environment variables prefixed with `CHECKIN_` (e.g. `CHECKIN_COOLDOWN_MS`)
//! 4. Command-line flags ([`Config::apply_args`])
//!
//! # Example file
//!
//! ```toml
//! endpoint = "https://attendance.example.edu/checkin"
//! cooldown_ms = 3000
//! status_clear_ms = 3000
//! request_timeout_secs = 10
//! time_format = "%H:%M:%S"
//! output = "screen"
//! theme = "dark"
//! title = "Lecture Hall B"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::{OutputFormat, RunArgs, ThemeArg};
use crate::clock::is_valid_time_format;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CHECKIN_";

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or had the wrong shape.
    #[error("invalid configuration: {0}")]
    Figment(#[from] figment::Error),

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// The endpoint is not an http(s) URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The offending value.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The time format is not a valid chrono format string.
    #[error("invalid time format '{0}'")]
    InvalidTimeFormat(String),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the verification service check-in endpoint.
    pub endpoint: String,
    /// Minimum time between two accepted scans.
    pub cooldown_ms: u64,
    /// How long a status notice stays visible.
    pub status_clear_ms: u64,
    /// Optional whole-request timeout. Unset means only the transport's
    /// own limits apply.
    pub request_timeout_secs: Option<u64>,
    /// chrono format string for check-in times.
    pub time_format: String,
    /// Display to use.
    pub output: OutputFormat,
    /// Colour theme of the screen display.
    pub theme: ThemeArg,
    /// Header title of the screen display.
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/checkin".to_string(),
            cooldown_ms: 3000,
            status_clear_ms: 3000,
            request_timeout_secs: None,
            time_format: "%H:%M:%S".to_string(),
            output: OutputFormat::Screen,
            theme: ThemeArg::Auto,
            title: "Check-in Kiosk".to_string(),
        }
    }
}

impl Config {
    /// Build the figment for `path`, or for the default location when
    /// `path` is `None`.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = path.map(Path::to_path_buf).or_else(Self::default_path) {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate the configuration.
    ///
    /// A missing default file is fine; a missing explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer cannot be parsed or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        let config: Config = Self::figment(path).extract()?;
        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Apply command-line overrides and re-validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override is invalid.
    pub fn apply_args(&mut self, args: &RunArgs) -> Result<(), ConfigError> {
        if let Some(endpoint) = &args.endpoint {
            self.endpoint.clone_from(endpoint);
        }
        if let Some(cooldown) = args.cooldown {
            self.cooldown_ms = cooldown;
        }
        if let Some(status_clear) = args.status_clear {
            self.status_clear_ms = status_clear;
        }
        if let Some(timeout) = args.timeout {
            self.request_timeout_secs = Some(timeout);
        }
        if let Some(output) = args.output {
            self.output = output;
        }
        if let Some(theme) = args.theme {
            self.theme = theme;
        }
        if let Some(format) = &args.time_format {
            self.time_format.clone_from(format);
        }
        self.validate()
    }

    /// Check every value that can be wrong.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] or [`ConfigError::InvalidTimeFormat`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;
        if !is_valid_time_format(&self.time_format) {
            return Err(ConfigError::InvalidTimeFormat(self.time_format.clone()));
        }
        Ok(())
    }

    /// The endpoint as a URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] for unparsable or non-http(s) URLs.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason,
        };
        let url = Url::parse(&self.endpoint).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }

    /// Global scan cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Status notice lifetime.
    #[must_use]
    pub fn status_clear(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }

    /// Whole-request timeout, if any.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "checkin-kiosk", "checkin-kiosk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
