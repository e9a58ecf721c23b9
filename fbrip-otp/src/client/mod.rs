//! Client for the remote OTP generation API
//!
//! `OtpClient` sends the secret to the API as a path segment and decodes the
//! JSON answer into an [`OtpResult`]. The async [`OtpClient::fetch`] is the
//! only request path; [`OtpClient::fetch_blocking`] drives it to completion on
//! the calling thread.

use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{ConfigError, OtpError, Result};
use crate::types::{decode_response, OtpResult};
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

pub mod endpoint;
pub mod transport;

pub use transport::Transport;

/// Fetches one-time passwords from the remote API
///
/// Holds no mutable state, so a single instance can serve concurrent calls.
#[derive(Debug)]
pub struct OtpClient<'a> {
    transport: Transport<'a>,
    base_url: String,
    timeout: Option<Duration>,
}

impl OtpClient<'static> {
    /// Create a client with its own transport and the default configuration
    pub fn new() -> std::result::Result<Self, ConfigError> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with its own transport built from `config`
    #[tracing::instrument(skip_all, fields(base_url = %config.base_url))]
    pub fn with_config(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let endpoint = config.endpoint()?;
        let client = transport::build_client(&config)?;

        debug!(timeout_ms = ?config.timeout_ms, "Created OTP client with owned transport");

        Ok(Self {
            transport: Transport::Owned(client),
            base_url: endpoint.to_string(),
            timeout: config.timeout(),
        })
    }

    /// Take ownership of a caller-built transport
    ///
    /// The transport is released together with the client.
    pub fn from_transport(client: Client) -> Self {
        Self {
            transport: Transport::Owned(client),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl<'a> OtpClient<'a> {
    /// Use a transport owned by the caller
    ///
    /// The client never releases it; the borrow keeps it alive for as long as
    /// the client exists.
    pub fn with_transport(client: &'a Client) -> Self {
        Self {
            transport: Transport::Borrowed(client),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Point the client at a different base URL
    pub fn with_base_url(mut self, base_url: &str) -> std::result::Result<Self, ConfigError> {
        self.base_url = ClientConfig::new(base_url).endpoint()?.to_string();
        Ok(self)
    }

    /// Base URL the secret is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether dropping this client releases its transport
    pub fn owns_transport(&self) -> bool {
        self.transport.is_owned()
    }

    /// The underlying HTTP client
    pub fn transport(&self) -> &Client {
        self.transport.client()
    }

    /// Request URL for `secret`, without sending anything
    pub fn request_url(&self, secret: &str) -> Result<Url> {
        endpoint::otp_url(&self.base_url, secret)
    }

    /// Fetch the current OTP for `secret`
    ///
    /// # Errors
    /// * `InvalidArgument` if the secret is blank, or is exactly `.` or `..`
    ///   (URL normalization would turn those into a different path); nothing
    ///   is sent
    /// * `Transport` for network failures, timeouts and non-2xx responses
    /// * `Parse` if the body is not the expected JSON
    #[tracing::instrument(skip_all, fields(base_url = %self.base_url))]
    pub async fn fetch(&self, secret: &str) -> Result<OtpResult> {
        let url = self.request_url(secret)?;
        let outcome = self.send(url).await;
        outcome.map_err(|err| self.classify(err, secret))
    }

    /// Fetch the current OTP, giving up when `cancel` is triggered
    ///
    /// A token that is already cancelled fails before any request is sent.
    /// Otherwise the in-flight request is dropped as soon as the token fires.
    #[tracing::instrument(skip_all, fields(base_url = %self.base_url))]
    pub async fn fetch_with_cancel(
        &self,
        secret: &str,
        cancel: &CancellationToken,
    ) -> Result<OtpResult> {
        let url = self.request_url(secret)?;

        // biased: a token cancelled up front wins before the request is polled
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("OTP request cancelled by caller");
                return Err(OtpError::Cancelled);
            }
            outcome = self.send(url) => outcome,
        };

        outcome.map_err(|err| self.classify(err, secret))
    }

    /// Blocking version of [`OtpClient::fetch`]
    ///
    /// Runs the async request on a current-thread runtime owned by this call.
    /// The secret is checked before the runtime is built.
    ///
    /// # Panics
    /// Panics if called from within an async runtime.
    pub fn fetch_blocking(&self, secret: &str) -> Result<OtpResult> {
        endpoint::validate_secret(secret)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.classify(e.into(), secret))?;

        runtime.block_on(self.fetch(secret))
    }

    async fn send(&self, url: Url) -> anyhow::Result<OtpResult> {
        trace!("Sending OTP request");
        let response = self.transport.client().get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "OTP request failed with error status");
            return Err(OtpError::http_status(status).into());
        }

        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "Received OTP response");

        Ok(decode_response(&body)?)
    }

    /// Map anything the request path raised onto the error taxonomy
    ///
    /// Errors that are already an `OtpError` pass through untouched.
    /// Everything else, timeouts included, is a transport failure.
    fn classify(&self, err: anyhow::Error, secret: &str) -> OtpError {
        let err = match err.downcast::<OtpError>() {
            Ok(classified) => return classified,
            Err(err) => err,
        };

        match err.downcast::<reqwest::Error>() {
            Ok(e) if e.is_timeout() => {
                warn!(timeout = ?self.timeout, "OTP request timed out");
                let elapsed = match self.timeout {
                    Some(timeout) => format!("request timed out after {:?}", timeout),
                    None => "request timed out".to_string(),
                };
                OtpError::transport(
                    format!("Failed to get OTP for secret {}: {}: {}", secret, elapsed, e),
                    e,
                )
            }
            Ok(e) => {
                warn!(
                    connect = e.is_connect(),
                    request = e.is_request(),
                    "OTP request failed"
                );
                OtpError::transport(format!("Failed to get OTP for secret {}: {}", secret, e), e)
            }
            Err(other) => {
                OtpError::transport(format!("Failed to get OTP for secret {}: {}", secret, other), other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_owns_transport() {
        let client = OtpClient::new().unwrap();
        assert!(client.owns_transport());
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_transport_takes_ownership() {
        let client = OtpClient::from_transport(Client::new());
        assert!(client.owns_transport());
    }

    #[test]
    fn test_with_transport_borrows() {
        let shared = Client::new();
        let client = OtpClient::with_transport(&shared);
        assert!(!client.owns_transport());
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = ClientConfig::new("gopher://example.com/");
        assert!(matches!(
            OtpClient::with_config(config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_with_base_url_normalizes() {
        let shared = Client::new();
        let client = OtpClient::with_transport(&shared)
            .with_base_url("http://localhost:3000/otp")
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/otp/");
        assert_eq!(
            client.request_url("A B").unwrap().as_str(),
            "http://localhost:3000/otp/A%20B"
        );
    }

    #[test]
    fn test_classify_passes_through_classified_errors() {
        let client = OtpClient::new().unwrap();
        let original = OtpError::parse("Failed to deserialize response", None);
        let classified = client.classify(original.into(), "SECRET");
        assert_eq!(classified.kind(), ErrorKind::Parse);
        assert_eq!(
            classified.to_string(),
            "Parse error: Failed to deserialize response"
        );

        let status = OtpError::http_status(reqwest::StatusCode::NOT_FOUND);
        let classified = client.classify(status.into(), "SECRET");
        assert_eq!(classified.status(), Some(reqwest::StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_classify_wraps_unclassified_errors() {
        let client = OtpClient::new().unwrap();
        let io = std::io::Error::new(std::io::ErrorKind::Other, "runtime unavailable");
        let classified = client.classify(io.into(), "MYSECRET");
        assert_eq!(classified.kind(), ErrorKind::Transport);
        let message = classified.to_string();
        assert!(message.contains("MYSECRET"));
        assert!(message.contains("runtime unavailable"));
        assert!(std::error::Error::source(&classified).is_some());
    }

    #[test]
    fn test_blocking_blank_secret_fails_fast() {
        let client = OtpClient::new().unwrap();
        let err = client.fetch_blocking("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = client.fetch_blocking("..").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    // No runtime is entered for an invalid secret, so this returns instead of
    // panicking on a nested block_on.
    #[tokio::test]
    async fn test_blocking_validates_before_runtime() {
        let client = OtpClient::new().unwrap();
        let err = client.fetch_blocking("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
