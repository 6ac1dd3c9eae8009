// ABOUTME: Environment configuration for the recipe assistant client
// ABOUTME: Reads API location, credentials, timeouts, and deployment mode from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration
//!
//! | Variable | Default |
//! |----------|---------|
//! | `RECIPE_API_BASE_URL` | `http://localhost:8000/api` |
//! | `RECIPE_API_TOKEN` | credential cache |
//! | `RECIPE_REQUEST_TIMEOUT_SECS` | `60` |
//! | `RECIPE_EXTENSION_PROBE_MS` | `500` |
//! | `RECIPE_CREDENTIALS_PATH` | `<config dir>/recipe-assistant/credentials.json` |
//! | `ENVIRONMENT` | `development` |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::backend::HttpBackendConfig;
use crate::constants::service_names::RECIPE_ASSISTANT;
use crate::errors::{AppError, AppResult};

/// Default API root
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Default wait for the extension presence answer in milliseconds
pub const DEFAULT_EXTENSION_PROBE_MS: u64 = 500;

/// Deployment mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without trailing slash
    pub api_base_url: String,
    /// Token given through the environment; overrides the credential cache
    pub api_token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Wait bound for the extension presence probe
    pub extension_probe: Duration,
    /// Credential cache file
    pub credentials_path: PathBuf,
    /// Deployment mode
    pub environment: Environment,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` when the API URL is not an absolute
    /// `http`/`https` URL or no credential location can be determined.
    pub fn from_env() -> AppResult<Self> {
        let api_base_url = parse_base_url(
            &env::var("RECIPE_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned()),
        )?;

        let credentials_path = match env::var("RECIPE_CREDENTIALS_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_credentials_path()?,
        };

        let config = Self {
            api_base_url,
            api_token: env::var("RECIPE_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            request_timeout: Duration::from_secs(env_u64(
                "RECIPE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            extension_probe: Duration::from_millis(env_u64(
                "RECIPE_EXTENSION_PROBE_MS",
                DEFAULT_EXTENSION_PROBE_MS,
            )),
            credentials_path,
            environment: Environment::from_str_or_default(
                &env::var("ENVIRONMENT").unwrap_or_default(),
            ),
        };

        info!(
            api_base_url = %config.api_base_url,
            environment = %config.environment,
            token_from_env = config.api_token.is_some(),
            "Client configuration loaded"
        );
        Ok(config)
    }

    /// HTTP backend settings, using `token` as the bearer credential
    #[must_use]
    pub fn backend_config(&self, token: Option<String>) -> HttpBackendConfig {
        HttpBackendConfig {
            base_url: self.api_base_url.clone(),
            token,
            timeout: self.request_timeout,
        }
    }
}

/// Validate and normalize the API root
///
/// # Errors
///
/// Returns `AppError::ConfigError` for unparsable or non-HTTP URLs.
pub fn parse_base_url(raw: &str) -> AppResult<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::config(format!("Invalid RECIPE_API_BASE_URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::config(format!(
            "RECIPE_API_BASE_URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn default_credentials_path() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(RECIPE_ASSISTANT).join("credentials.json"))
        .ok_or_else(|| {
            AppError::config("No config directory available; set RECIPE_CREDENTIALS_PATH")
        })
}

fn env_u64(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, default, "Invalid number, using default");
            default
        }),
        Err(_) => default,
    }
}
