//! Error types for dealsync-engine.
//!
//! The `Display` of every variant is the terminal status string shown to the
//! user when a run stops on that error.

use std::fmt;

use thiserror::Error;

use dealsync_core::{ApiError, MappingError};

/// A required form selection is missing. Detected before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select deal type")]
    MissingDealType,
    #[error("Select deal sub-type")]
    MissingDealSubType,
    #[error("Select lead source")]
    MissingLeadSource,
    #[error("Select property type")]
    MissingPropertyType,
    #[error("Select sale status")]
    MissingSaleStatus,
    #[error("Deal has no id")]
    MissingDealId,
}

/// A brokerage, agent, or participant profile could not be found or created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("No corresponding profile for current user")]
    NoAgentForUser,
    #[error("No brokerages available for this account")]
    NoBrokerages,
    #[error("Could not resolve a remote profile for {email}")]
    Profile { email: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no credentials configured for this brand")]
    NoCredentials,
    #[error("{0}")]
    Rejected(ApiError),
}

/// Remote step whose failure aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStep {
    ListBrokerages,
    CreateDeal,
    UpdateDeal,
}

impl fmt::Display for RemoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteStep::ListBrokerages => f.write_str("Loading brokerages"),
            RemoteStep::CreateDeal => f.write_str("Creating deal"),
            RemoteStep::UpdateDeal => f.write_str("Updating deal"),
        }
    }
}

/// Fatal error of a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    #[error("Sign-in failed: {0}")]
    Auth(#[from] AuthError),

    #[error("{step} failed: {source}")]
    Remote {
        step: RemoteStep,
        #[source]
        source: ApiError,
    },

    #[error("Mapping store error: {0}")]
    Mapping(#[from] MappingError),
}

impl SyncError {
    pub(crate) fn remote(step: RemoteStep) -> impl FnOnce(ApiError) -> SyncError {
        move |source| SyncError::Remote { step, source }
    }
}
