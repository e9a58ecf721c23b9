//! Client for the 2fa.fb.rip one-time-password API
//!
//! The secret is sent to the remote service, which answers with the current
//! code and how long it stays valid. Nothing is computed locally.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = fbrip_otp::OtpClient::new()?;
//! let result = client.fetch("JBSWY3DPEHPK3PXP").await?;
//! if let Some(code) = result.code() {
//!     println!("{code}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::OtpClient;
pub use config::ClientConfig;
pub use error::{ConfigError, ErrorKind, OtpError};
pub use tokio_util::sync::CancellationToken;
pub use types::{OtpData, OtpResult};

