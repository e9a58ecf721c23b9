//! Request URL construction
//!
//! The secret becomes the last path segment of the base URL. Everything
//! outside the RFC 3986 unreserved set is percent-encoded, so `/`, `?`, `#`,
//! `%` and spaces in a secret can never change the shape of the URL.

use crate::error::OtpError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Reject secrets that cannot be sent
///
/// Blank secrets are a caller bug. `.` and `..` would be collapsed by URL
/// normalization (even when percent-encoded) and address a different path.
pub fn validate_secret(secret: &str) -> Result<(), OtpError> {
    if secret.trim().is_empty() {
        return Err(OtpError::invalid_argument("Secret cannot be null or empty"));
    }

    if secret == "." || secret == ".." {
        return Err(OtpError::invalid_argument(
            "Secret cannot be a relative path segment",
        ));
    }

    Ok(())
}

/// Percent-encode a secret as a single path segment
pub fn encode_secret(secret: &str) -> String {
    utf8_percent_encode(secret, SEGMENT).to_string()
}

/// Build the request URL for `secret` under `base_url`
///
/// `base_url` must already end with `/`.
pub fn otp_url(base_url: &str, secret: &str) -> Result<Url, OtpError> {
    validate_secret(secret)?;

    let raw = format!("{}{}", base_url, encode_secret(secret));
    Url::parse(&raw).map_err(|e| {
        OtpError::invalid_argument(format!("Secret does not form a valid request URL: {}", e))
    })
}
