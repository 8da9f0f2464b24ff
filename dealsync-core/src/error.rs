//! Error types for dealsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{DealId, RemoteDealId};

/// Failure of a call against the brokerage-accounting REST service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with a non-success HTTP status.
    #[error("remote returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of the mapping store. "Not found" is never an error; it is
/// reported as `Ok(None)` by lookups.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed mapping store at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("mapping serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("deal {deal_id} is already mapped to remote deal {remote_deal_id}")]
    Duplicate {
        deal_id: DealId,
        remote_deal_id: RemoteDealId,
    },

    /// Backend unreachable, for `MappingStore` implementations that are not
    /// file-backed.
    #[error("mapping store unavailable: {0}")]
    Unavailable(String),

    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Failure loading `config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
