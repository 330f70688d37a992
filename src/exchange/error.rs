//! Error types for signed MEXC calls.

use thiserror::Error;

/// Failure of a signed request.
///
/// `Status` and `Network` are transport failures; `Api` is a business failure
/// reported inside a 2xx response body.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: code={code} message={message}")]
    Api { code: String, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ExchangeError {
    /// Whether the failure happened at the HTTP layer rather than in the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Network(_))
    }
}
