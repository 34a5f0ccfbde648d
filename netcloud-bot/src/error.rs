//! Error types for netcloud-bot

use thiserror::Error;

/// Bot error type
#[derive(Debug, Error)]
pub enum Error {
    /// Bot API answered `ok: false`
    #[error("Telegram API error: {0}")]
    Telegram(String),

    /// Sheets or Drive API failure (non-2xx, unexpected layout)
    #[error("Sheets API error: {0}")]
    Sheets(String),

    /// Service-account token minting or exchange failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A storage post reached a media handler without any media
    #[error("Post {0} carries no media")]
    MissingMedia(i64),

    /// HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// netcloud-common error
    #[error("Common error: {0}")]
    Common(#[from] netcloud_common::Error),
}

/// Result type for bot operations
pub type Result<T> = std::result::Result<T, Error>;
