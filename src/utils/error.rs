//! Error types used within the relay.
//!
//! `RelayError` covers failures that abort startup or the serve loop.
//! `ProtocolError` covers per-connection protocol violations; any of these
//! closes the offending connection and leaves every other connection and
//! every topic untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a json object")]
    NotAnObject,

    #[error("frame is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
