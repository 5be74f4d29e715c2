//! Process-wide initialization.
//!
//! This module provides:
//! - Logger setup (plain or JSON)
//! - The HTTP client used by the blob uploader

mod logger;

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::UPLOAD_REQUEST_TIMEOUT;
use crate::error_handling::InitializationError;

// Re-export public API
pub use logger::init_logger_with;

/// Initializes the HTTP client used for blob uploads.
///
/// Each request (one staged block, or one control call) gets `timeout`, falling
/// back to `UPLOAD_REQUEST_TIMEOUT`. Redirects are not followed: the storage
/// service never redirects, and following one would replay a signed request
/// against another host.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the TLS backend cannot be
/// initialized.
pub fn init_http_client(timeout: Option<Duration>) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(timeout.unwrap_or(UPLOAD_REQUEST_TIMEOUT))
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("dbdump/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
