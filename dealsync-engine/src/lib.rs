//! # dealsync-engine
//!
//! Deal synchronization engine: participant classification, payload
//! construction, profile resolution, and the run state machine.
//!
//! Build a [`SyncOrchestrator`] over any [`dealsync_core::BrokerageApi`] and
//! [`dealsync_core::MappingStore`], then call [`SyncOrchestrator::run`] once
//! per user-initiated sync.

pub mod classify;
pub mod error;
pub mod orchestrator;
pub mod payload;
pub mod profile;

pub use classify::{
    classify, decide_access_side, decide_owning_side, decide_role_type, Classification,
};
pub use error::{AuthError, RemoteStep, ResolutionError, SyncError, ValidationError};
pub use orchestrator::{
    DealPath, PersonOutcome, PersonStatus, StatusSink, SyncOrchestrator, SyncReport, SyncRequest,
    SyncState,
};
pub use payload::{build_address_payload, build_deal_payload, FormSelections, ValidatedSelections};
pub use profile::{find_or_create_profile, ProfileQuery, ProfileResolver};
