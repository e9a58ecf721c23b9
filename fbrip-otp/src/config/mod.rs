//! Client configuration
//!
//! Everything here is optional: `ClientConfig::default()` talks to the public
//! endpoint with the transport's default timeout and headers.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub mod toml_config;

/// Endpoint the secret is appended to
pub const DEFAULT_BASE_URL: &str = "https://2fa.fb.rip/api/otp/";

/// Settings for an `OtpClient`
///
/// `timeout_ms` and `user_agent` only apply when the client builds its own
/// transport. A caller-supplied `reqwest::Client` keeps its own settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL the percent-encoded secret is appended to
    pub base_url: String,

    /// Overall request timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// User-Agent header sent with each request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create a configuration pointing at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout
    ///
    /// Stored with millisecond precision, rounding up so that a non-zero
    /// duration never becomes zero.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;

        if self.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "Timeout cannot be zero".to_string(),
            });
        }

        if let Some(user_agent) = &self.user_agent {
            if user_agent.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "User agent cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Parse the base URL, normalized to end with `/`
    ///
    /// Only http and https are accepted, and the URL may not carry a query or
    /// fragment since the secret is appended to its path.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason,
        };

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("Failed to parse URL: {}", e)))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(invalid(format!(
                    "Only HTTP/HTTPS schemes are supported, got: {}",
                    scheme
                )));
            }
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("Query strings and fragments are not allowed".to_string()));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
            user_agent: None,
        }
    }
}
