//! Unified error types for ogp-cache.
//!
//! Every failure is local to the request that triggered it. The display
//! string of each variant starts with a stable code that tool clients can
//! match on.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the ogp-cache pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL, scale out of range).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Unrecognized card style, or a custom style without a stylesheet.
    #[error("INVALID_STYLE: {0}")]
    InvalidStyle(String),

    /// A content address that is not 64 hex characters.
    #[error("INVALID_ADDRESS: {0}")]
    InvalidAddress(String),

    /// The page lacks the social-preview fields needed to build a record.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),

    /// The origin answered 304 Not Modified but there was nothing to revalidate.
    #[error("PROTOCOL_VIOLATION: {0}")]
    ProtocolViolation(String),

    /// No stored record for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Private/internal address not allowed.
    #[error("SSRF_BLOCKED: {0}")]
    SsrfBlocked(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Transport-level failure talking to the origin.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// The origin answered with a status that is neither 2xx nor 304.
    #[error("FETCH_FAILED: {url} returned status {status}")]
    FetchFailed { url: String, status: u16 },

    /// Image payload could not be decoded or re-encoded.
    #[error("CODEC_FAILED: {0}")]
    CodecFailed(String),

    /// No rendering engine is configured.
    #[error("RENDER_DISABLED")]
    RenderDisabled,

    /// Render failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) | Error::InvalidStyle(_) | Error::InvalidAddress(_) => -32602,
            Error::ExtractFailed(_) => -32000,
            Error::CacheMiss(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) => -32002,
            Error::InvalidUrl(_) => -32003,
            Error::SsrfBlocked(_) => -32004,
            Error::ProtocolViolation(_) => -32005,
            Error::FetchTimeout(_) => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::HttpError(_) => -32008,
            Error::FetchFailed { .. } => -32009,
            Error::CodecFailed(_) => -32010,
            Error::RenderDisabled => -32011,
            Error::RenderFailed(_) => -32012,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
