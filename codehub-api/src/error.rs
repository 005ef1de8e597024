use std::path::PathBuf;

use reqwest::{StatusCode, Url};
use thiserror::Error;
use url::ParseError;

/// Result alias for operations within the control-plane client crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Common error representation for control-plane calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL is malformed.
    #[error("invalid control-plane base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: ParseError,
    },

    /// Joining an endpoint path onto the base URL failed.
    #[error("failed to join path '{path}' to base URL '{base}': {source}")]
    InvalidPath {
        base: Url,
        path: String,
        #[source]
        source: ParseError,
    },

    /// The underlying HTTP client returned an error (connect, timeout, body).
    #[error("control-plane request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The control plane returned a non-success HTTP status.
    #[error("control plane returned {status} for {url}: {message}")]
    Http {
        status: StatusCode,
        url: Url,
        message: String,
    },

    /// The artifact to upload could not be read from disk.
    #[error("cannot read upload artifact {path}: {source}")]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
