//! Client for the ZENBUY backend REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth for products, coupons, orders, and
//!   accounts. Nothing here is cached; every call is a fresh request.
//! - Calls are single best-effort requests with a configurable timeout and
//!   no retry. Callers decide whether to try again.
//! - Non-success responses carry the backend's `error` message when it sends
//!   one, so it can be shown to the user as is.
//!
//! # Example
//!
//! ```rust,ignore
//! use zenbuy_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//! let products = client.fetch_products().await?;
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {}", format_api_message(.status, .message.as_deref()))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, if it carried one.
        message: Option<String>,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot have path segments appended.
    #[error("Invalid backend URL: {0}")]
    InvalidBaseUrl(String),
}

impl BackendError {
    /// The backend's own message for API errors.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the error came from the backend rejecting the request (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }
}

// Error bodies without a message fall back to the status reason.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn format_api_message<'a>(status: &u16, message: Option<&'a str>) -> &'a str {
    message.unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(*status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed")
    })
}
