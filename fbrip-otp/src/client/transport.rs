//! HTTP transport ownership
//!
//! A client either owns its `reqwest::Client` or borrows one from the caller.
//! Only an owned transport is released when the `OtpClient` goes away; a
//! borrowed one outlives the client by construction.

use crate::config::ClientConfig;
use crate::error::ConfigError;
use reqwest::Client;

/// The HTTP client behind an `OtpClient`
///
/// Dropping an `Owned` transport drops the `reqwest::Client` it holds, which
/// closes its pooled connections once no other clone remains. Dropping a
/// `Borrowed` one only ends the borrow.
#[derive(Debug)]
pub enum Transport<'a> {
    Owned(Client),
    Borrowed(&'a Client),
}

impl Transport<'_> {
    pub fn client(&self) -> &Client {
        match self {
            Transport::Owned(client) => client,
            Transport::Borrowed(client) => *client,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Transport::Owned(_))
    }
}

/// Build a transport from the client configuration
pub fn build_client(config: &ClientConfig) -> Result<Client, ConfigError> {
    let mut builder = Client::builder().use_rustls_tls();

    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.as_str());
    }

    Ok(builder.build()?)
}
