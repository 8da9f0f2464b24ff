//! Sync run state machine.
//!
//! ```text
//! Idle → Validating → Authenticating → ResolvingBrokerage → ResolvingAgent
//!      → CreatingDeal | UpdatingDeal → SyncingAddress → SyncingPeople → Completed
//! ```
//!
//! Any fatal error moves the run to `Failed(reason)`, except a missing form
//! selection, which leaves the run in `Validating` with no remote call made.
//! `Authenticating` is skipped when the caller already holds a session.
//!
//! Address and per-participant failures are downgraded to warnings; only
//! failures up to and including the deal create/update abort the run.

use std::fmt;

use dealsync_core::{
    config::{resolve_credentials, BrandCredentials},
    AccessId, BrokerageApi, BrokerageId, Deal, DealAttributes, MappingStore, NewDealAccess,
    ProfileId, ProfileType, RemoteDeal, RemoteDealId, Role, RoleCategory, RoleTag, Session, Side,
};

use crate::classify::classify;
use crate::error::{AuthError, RemoteStep, ResolutionError, SyncError, ValidationError};
use crate::payload::{build_address_payload, build_deal_payload, FormSelections};
use crate::profile::{ProfileQuery, ProfileResolver};

// ---------------------------------------------------------------------------
// Run input / output
// ---------------------------------------------------------------------------

/// Fully specified input snapshot of one run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub deal: Deal,
    /// Email of the user who triggered the sync; selects the owning agent.
    pub user_email: String,
    pub selections: FormSelections,
    /// Per-brand credentials, resolved against the deal's brand hierarchy.
    pub credentials: Vec<BrandCredentials>,
    /// A session already held by the caller. When set, sign-in is skipped.
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Validating,
    Authenticating,
    ResolvingBrokerage,
    ResolvingAgent,
    CreatingDeal,
    UpdatingDeal,
    SyncingAddress,
    SyncingPeople,
    Completed,
    Failed(String),
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Idle => f.write_str("idle"),
            SyncState::Validating => f.write_str("validating"),
            SyncState::Authenticating => f.write_str("authenticating"),
            SyncState::ResolvingBrokerage => f.write_str("resolving brokerage"),
            SyncState::ResolvingAgent => f.write_str("resolving agent"),
            SyncState::CreatingDeal => f.write_str("creating deal"),
            SyncState::UpdatingDeal => f.write_str("updating deal"),
            SyncState::SyncingAddress => f.write_str("syncing address"),
            SyncState::SyncingPeople => f.write_str("syncing people"),
            SyncState::Completed => f.write_str("completed"),
            SyncState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Which deal step the run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealPath {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonStatus {
    Granted {
        profile_id: ProfileId,
        access_id: AccessId,
    },
    ProfileUnresolved,
    AccessFailed {
        profile_id: ProfileId,
        reason: String,
    },
}

/// Result of syncing one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonOutcome {
    pub email: String,
    pub name: String,
    pub role: RoleTag,
    pub category: RoleCategory,
    pub side: Side,
    pub status: PersonStatus,
}

impl PersonOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self.status, PersonStatus::Granted { .. })
    }

    fn warning(&self) -> Option<String> {
        match &self.status {
            PersonStatus::Granted { .. } => None,
            PersonStatus::ProfileUnresolved => Some(format!(
                "{} ({}): could not resolve a remote profile",
                self.name, self.email
            )),
            PersonStatus::AccessFailed { reason, .. } => Some(format!(
                "{} ({}): access grant failed: {reason}",
                self.name, self.email
            )),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub remote_deal_id: RemoteDealId,
    pub path: DealPath,
    pub brokerage: BrokerageId,
    pub people: Vec<PersonOutcome>,
    /// Non-fatal issues, in the order they occurred.
    pub warnings: Vec<String>,
}

impl SyncReport {
    /// The single terminal status string of a successful run.
    pub fn summary(&self) -> String {
        match self.warnings.len() {
            0 => "Sync completed!".to_string(),
            n => format!("Sync completed with {n} warning(s)"),
        }
    }
}

/// Receives human-readable progress strings as the run advances.
pub trait StatusSink {
    fn emit(&mut self, status: &str);
}

impl StatusSink for Vec<String> {
    fn emit(&mut self, status: &str) {
        self.push(status.to_owned());
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct StateLog {
    current: SyncState,
    history: Vec<SyncState>,
}

impl Default for StateLog {
    fn default() -> Self {
        Self {
            current: SyncState::Idle,
            history: Vec::new(),
        }
    }
}

impl StateLog {
    fn reset(&mut self) {
        self.current = SyncState::Idle;
        self.history.clear();
    }

    fn enter(&mut self, state: SyncState) {
        tracing::info!("sync state: {state}");
        self.history.push(state.clone());
        self.current = state;
    }
}

/// Drives one sync run at a time against a [`BrokerageApi`] and a
/// [`MappingStore`]. Each run starts from its own [`SyncRequest`]; nothing
/// carries over between runs except what the mapping store persists.
pub struct SyncOrchestrator<A, M> {
    api: A,
    mappings: M,
    log: StateLog,
}

impl<A: BrokerageApi, M: MappingStore> SyncOrchestrator<A, M> {
    pub fn new(api: A, mappings: M) -> Self {
        Self {
            api,
            mappings,
            log: StateLog::default(),
        }
    }

    /// State the last run ended in (`Idle` before any run).
    pub fn state(&self) -> &SyncState {
        &self.log.current
    }

    /// States entered during the last run, in order.
    pub fn history(&self) -> &[SyncState] {
        &self.log.history
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn mappings(&self) -> &M {
        &self.mappings
    }

    pub fn into_parts(self) -> (A, M) {
        (self.api, self.mappings)
    }

    /// Run one sync to completion. Emits progress to `status`, ending with
    /// exactly one terminal string: the report summary or the fatal error.
    pub fn run(
        &mut self,
        request: &SyncRequest,
        status: &mut dyn StatusSink,
    ) -> Result<SyncReport, SyncError> {
        self.log.reset();
        let result = self.execute(request, status);
        match &result {
            Ok(report) => {
                self.log.enter(SyncState::Completed);
                status.emit(&report.summary());
            }
            Err(SyncError::Validation(err)) => {
                tracing::info!("sync not started: {err}");
                status.emit(&err.to_string());
            }
            Err(err) => {
                tracing::error!("sync of deal {} failed: {err}", request.deal.id);
                self.log.enter(SyncState::Failed(err.to_string()));
                status.emit(&err.to_string());
            }
        }
        result
    }

    fn execute(
        &mut self,
        request: &SyncRequest,
        status: &mut dyn StatusSink,
    ) -> Result<SyncReport, SyncError> {
        let deal = &request.deal;
        let mut warnings = Vec::new();

        // Validating
        self.log.enter(SyncState::Validating);
        let selections = request.selections.validate()?;
        if deal.id.as_str().trim().is_empty() {
            return Err(ValidationError::MissingDealId.into());
        }
        let agent_role =
            find_owning_agent(deal, &request.user_email).ok_or(ResolutionError::NoAgentForUser)?;
        let agent_email = agent_role
            .sync_email()
            .ok_or(ResolutionError::NoAgentForUser)?;

        // Authenticating
        let session = match &request.session {
            Some(session) => {
                tracing::debug!("reusing caller session; sign-in skipped");
                session.clone()
            }
            None => {
                self.log.enter(SyncState::Authenticating);
                status.emit("Signing in...");
                let credentials = resolve_credentials(&request.credentials, &deal.brand_hierarchy)
                    .ok_or(AuthError::NoCredentials)?;
                self.api
                    .sign_in(&credentials)
                    .map_err(AuthError::Rejected)?
            }
        };

        // ResolvingBrokerage
        self.log.enter(SyncState::ResolvingBrokerage);
        status.emit("Loading brokerages...");
        let brokerage = self
            .api
            .list_brokerages(&session)
            .map_err(SyncError::remote(RemoteStep::ListBrokerages))?
            .into_iter()
            .next()
            .ok_or(ResolutionError::NoBrokerages)?;
        tracing::info!("using brokerage {} ({})", brokerage.id, brokerage.name);

        // ResolvingAgent
        self.log.enter(SyncState::ResolvingAgent);
        status.emit("Resolving agent profile...");
        let mut resolver = ProfileResolver::new(&self.api, &session, brokerage.id.clone());
        let agent_name = agent_role.legal_name();
        let agent = resolver
            .resolve(&ProfileQuery {
                email: agent_email,
                name: &agent_name,
                profile_type: ProfileType::Agent,
            })
            .ok_or_else(|| ResolutionError::Profile {
                email: agent_email.to_owned(),
            })?;

        // CreatingDeal | UpdatingDeal
        let attributes = build_deal_payload(deal, &agent, &selections);
        let existing = self.mappings.lookup(&deal.id)?;
        let (remote, path) = match existing {
            None => {
                self.log.enter(SyncState::CreatingDeal);
                status.emit("Creating deal...");
                let remote = self
                    .api
                    .create_deal(&session, &brokerage.id, &attributes)
                    .map_err(SyncError::remote(RemoteStep::CreateDeal))?;
                self.mappings.create(&deal.id, &remote.id).map_err(|err| {
                    tracing::error!(
                        "remote deal {} created but mapping for {} not saved",
                        remote.id,
                        deal.id
                    );
                    err
                })?;
                (remote, DealPath::Created)
            }
            Some(mapping) => {
                self.log.enter(SyncState::UpdatingDeal);
                status.emit("Updating deal...");
                let remote = update_deal(&self.api, &session, &mapping.remote_deal_id, &attributes)?;
                (remote, DealPath::Updated)
            }
        };
        tracing::info!("deal {} synced as remote deal {}", deal.id, remote.id);

        // SyncingAddress
        self.log.enter(SyncState::SyncingAddress);
        status.emit("Updating address...");
        if let Some(warning) = sync_address(&self.api, &session, deal, &remote) {
            tracing::warn!("{warning}");
            warnings.push(warning);
        }

        // SyncingPeople
        self.log.enter(SyncState::SyncingPeople);
        status.emit("Syncing people...");
        let roles: Vec<&Role> = deal.syncable_roles().collect();
        let mut people = Vec::with_capacity(roles.len());
        for (index, role) in roles.iter().enumerate() {
            let name = role.legal_name();
            status.emit(&format!("Syncing {name} ({}/{})...", index + 1, roles.len()));
            let outcome = sync_person(&self.api, &session, &mut resolver, deal, &remote.id, role);
            if let Some(warning) = outcome.warning() {
                tracing::warn!("{warning}");
                warnings.push(warning);
            }
            people.push(outcome);
        }

        Ok(SyncReport {
            remote_deal_id: remote.id,
            path,
            brokerage: brokerage.id,
            people,
            warnings,
        })
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The current user's participant record: an agent-tagged role with the
/// user's email if there is one, else any role with that email.
fn find_owning_agent<'d>(deal: &'d Deal, user_email: &str) -> Option<&'d Role> {
    let user = user_email.trim();
    if user.is_empty() {
        return None;
    }
    let matching: Vec<&Role> = deal
        .syncable_roles()
        .filter(|r| r.sync_email().is_some_and(|e| e.eq_ignore_ascii_case(user)))
        .collect();
    matching
        .iter()
        .find(|r| r.role.is_agent())
        .or_else(|| matching.first())
        .copied()
}

fn update_deal<A: BrokerageApi>(
    api: &A,
    session: &Session,
    remote_id: &RemoteDealId,
    attributes: &DealAttributes,
) -> Result<RemoteDeal, SyncError> {
    api.update_deal(session, remote_id, attributes)
        .map_err(SyncError::remote(RemoteStep::UpdateDeal))
}

/// Returns a warning when the address could not be written.
fn sync_address<A: BrokerageApi>(
    api: &A,
    session: &Session,
    deal: &Deal,
    remote: &RemoteDeal,
) -> Option<String> {
    let address = build_address_payload(deal);
    if address.is_empty() {
        return Some("Deal has no address fields; address not updated".to_string());
    }
    let Some(address_id) = remote.address_id.as_ref() else {
        return Some(format!(
            "Remote deal {} has no address record; address not updated",
            remote.id
        ));
    };
    api.update_address(session, address_id, &address)
        .err()
        .map(|err| format!("Address update failed: {err}"))
}

fn sync_person<A: BrokerageApi>(
    api: &A,
    session: &Session,
    resolver: &mut ProfileResolver<'_, A>,
    deal: &Deal,
    remote_id: &RemoteDealId,
    role: &Role,
) -> PersonOutcome {
    let email = role.sync_email().unwrap_or_default().to_owned();
    let name = role.legal_name();
    let classification = classify(deal, &role.role);
    let mut outcome = PersonOutcome {
        email,
        name,
        role: role.role.clone(),
        category: classification.category,
        side: classification.side,
        status: PersonStatus::ProfileUnresolved,
    };

    let Some(profile) = resolver.resolve(&ProfileQuery {
        email: &outcome.email,
        name: &outcome.name,
        profile_type: ProfileType::Person,
    }) else {
        return outcome;
    };

    let access = NewDealAccess {
        profile_id: profile.id.clone(),
        access_role: classification.category,
        side: classification.side,
    };
    outcome.status = match api.create_deal_access(session, remote_id, &access) {
        Ok(granted) => PersonStatus::Granted {
            profile_id: profile.id,
            access_id: granted.id,
        },
        Err(err) => PersonStatus::AccessFailed {
            profile_id: profile.id,
            reason: err.to_string(),
        },
    };
    outcome
}
