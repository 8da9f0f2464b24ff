//! Remote profile lookup-or-create, keyed by email within a brokerage.
//!
//! Uniqueness of (brokerage, email) is enforced by searching before creating,
//! not by the remote service. When a search returns several matches the first
//! one wins; duplicates already present remotely are not merged.

use std::collections::HashMap;

use dealsync_core::{
    BrokerageApi, BrokerageId, NewProfile, ProfileType, RemoteProfile, Session,
};

/// Who to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileQuery<'a> {
    pub email: &'a str,
    /// Legal name, used only when a profile has to be created.
    pub name: &'a str,
    /// Type assigned on creation: `Agent` for the transaction's primary agent.
    pub profile_type: ProfileType,
}

/// Search `brokerage` for `query.email`, creating the profile when nothing
/// matches.
///
/// Returns `None` when the search or the creation fails. A failed search
/// never falls through to creation.
pub fn find_or_create_profile<A: BrokerageApi + ?Sized>(
    api: &A,
    session: &Session,
    brokerage: &BrokerageId,
    query: &ProfileQuery<'_>,
) -> Option<RemoteProfile> {
    let matches = match api.search_profiles(session, brokerage, query.email) {
        Ok(matches) => matches,
        Err(err) => {
            tracing::warn!("profile search failed for {}: {err}", query.email);
            return None;
        }
    };
    if let Some(first) = matches.into_iter().next() {
        tracing::debug!("found profile {} for {}", first.id, query.email);
        return Some(first);
    }

    let (first_name, last_name) = split_name(query.name, query.email);
    let profile = NewProfile {
        email: query.email.to_owned(),
        first_name,
        last_name,
        profile_type: query.profile_type,
    };
    match api.create_profile(session, brokerage, &profile) {
        Ok(created) => {
            tracing::info!("created profile {} for {}", created.id, query.email);
            Some(created)
        }
        Err(err) => {
            tracing::warn!("profile creation failed for {}: {err}", query.email);
            None
        }
    }
}

/// Run-scoped resolver: remembers every outcome, failures included, so the
/// same email costs at most one search and one create per run.
pub struct ProfileResolver<'a, A: BrokerageApi + ?Sized> {
    api: &'a A,
    session: &'a Session,
    brokerage: BrokerageId,
    resolved: HashMap<String, Option<RemoteProfile>>,
}

impl<'a, A: BrokerageApi + ?Sized> ProfileResolver<'a, A> {
    pub fn new(api: &'a A, session: &'a Session, brokerage: BrokerageId) -> Self {
        Self {
            api,
            session,
            brokerage,
            resolved: HashMap::new(),
        }
    }

    pub fn brokerage(&self) -> &BrokerageId {
        &self.brokerage
    }

    pub fn resolve(&mut self, query: &ProfileQuery<'_>) -> Option<RemoteProfile> {
        let key = query.email.trim().to_lowercase();
        if let Some(outcome) = self.resolved.get(&key) {
            return outcome.clone();
        }
        let outcome = find_or_create_profile(self.api, self.session, &self.brokerage, query);
        self.resolved.insert(key, outcome.clone());
        outcome
    }
}

/// Split a legal name into first/last. A one-word name has no last name; an
/// empty name falls back to the email's local part.
fn split_name(name: &str, email: &str) -> (String, Option<String>) {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    if words.is_empty() {
        let local = email.split('@').next().unwrap_or(email);
        return (local.to_owned(), None);
    }
    let last = (words.len() > 1).then(|| words.pop()).flatten();
    (words.join(" "), last.map(str::to_owned))
}
