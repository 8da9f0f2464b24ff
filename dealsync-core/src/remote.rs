//! Remote resource shapes and the [`BrokerageApi`] collaborator trait.
//!
//! Outbound attribute sets are closed structs: every field's type and
//! optionality is explicit, and optional fields are omitted from the JSON
//! body when absent (the remote API treats omission and `null` differently
//! on partial updates).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::{
    AccessId, AddressId, BrokerageId, ProfileId, RemoteDealId, RoleCategory, Side,
};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Sign-in credentials for one brand.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session held by the caller for the duration of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

// ---------------------------------------------------------------------------
// Brokerages and profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brokerage {
    pub id: BrokerageId,
    #[serde(default)]
    pub name: String,
}

/// Remote profile type assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProfileType {
    Agent,
    #[default]
    Person,
}

/// A person or organization known to a brokerage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProfile {
    pub id: ProfileId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Attributes for `POST /brokerages/{id}/profiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub email: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub profile_type: ProfileType,
}

// ---------------------------------------------------------------------------
// Deals
// ---------------------------------------------------------------------------

/// Normalized deal attributes sent on create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealAttributes {
    pub deal_type: String,
    pub deal_sub_type: String,
    pub lead_source: String,
    pub property_type: String,
    pub sale_status: String,
    pub exclusive: bool,
    pub offer: bool,
    pub team_deal: bool,
    pub owning_side: Side,
    pub primary_agent_id: ProfileId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possession_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mls_number: Option<String>,
}

/// Attributes for `PATCH /addresses/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl AddressAttributes {
    pub fn is_empty(&self) -> bool {
        self.address_line1.is_none()
            && self.city.is_none()
            && self.province.is_none()
            && self.postal_code.is_none()
    }
}

/// The remote deal as returned by create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDeal {
    pub id: RemoteDealId,
    pub address_id: Option<AddressId>,
}

// ---------------------------------------------------------------------------
// Deal accesses
// ---------------------------------------------------------------------------

/// Attributes for `POST /deals/{id}/deal_accesses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDealAccess {
    pub profile_id: ProfileId,
    pub access_role: RoleCategory,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAccess {
    pub id: AccessId,
    pub profile_id: ProfileId,
}

// ---------------------------------------------------------------------------
// Collaborator trait
// ---------------------------------------------------------------------------

/// REST operations the sync engine consumes. Every call other than
/// [`BrokerageApi::sign_in`] is made on behalf of an existing [`Session`].
///
/// Implementations must not retry; a failed call surfaces immediately.
pub trait BrokerageApi {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApiError>;

    fn list_brokerages(&self, session: &Session) -> Result<Vec<Brokerage>, ApiError>;

    /// Profiles in `brokerage` whose email matches `email` exactly.
    fn search_profiles(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        email: &str,
    ) -> Result<Vec<RemoteProfile>, ApiError>;

    fn create_profile(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        profile: &NewProfile,
    ) -> Result<RemoteProfile, ApiError>;

    fn create_deal(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        attributes: &DealAttributes,
    ) -> Result<RemoteDeal, ApiError>;

    fn update_deal(
        &self,
        session: &Session,
        deal: &RemoteDealId,
        attributes: &DealAttributes,
    ) -> Result<RemoteDeal, ApiError>;

    fn update_address(
        &self,
        session: &Session,
        address: &AddressId,
        attributes: &AddressAttributes,
    ) -> Result<(), ApiError>;

    fn create_deal_access(
        &self,
        session: &Session,
        deal: &RemoteDealId,
        access: &NewDealAccess,
    ) -> Result<RemoteAccess, ApiError>;
}

impl<T: BrokerageApi + ?Sized> BrokerageApi for &T {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        (**self).sign_in(credentials)
    }

    fn list_brokerages(&self, session: &Session) -> Result<Vec<Brokerage>, ApiError> {
        (**self).list_brokerages(session)
    }

    fn search_profiles(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        email: &str,
    ) -> Result<Vec<RemoteProfile>, ApiError> {
        (**self).search_profiles(session, brokerage, email)
    }

    fn create_profile(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        profile: &NewProfile,
    ) -> Result<RemoteProfile, ApiError> {
        (**self).create_profile(session, brokerage, profile)
    }

    fn create_deal(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        attributes: &DealAttributes,
    ) -> Result<RemoteDeal, ApiError> {
        (**self).create_deal(session, brokerage, attributes)
    }

    fn update_deal(
        &self,
        session: &Session,
        deal: &RemoteDealId,
        attributes: &DealAttributes,
    ) -> Result<RemoteDeal, ApiError> {
        (**self).update_deal(session, deal, attributes)
    }

    fn update_address(
        &self,
        session: &Session,
        address: &AddressId,
        attributes: &AddressAttributes,
    ) -> Result<(), ApiError> {
        (**self).update_address(session, address, attributes)
    }

    fn create_deal_access(
        &self,
        session: &Session,
        deal: &RemoteDealId,
        access: &NewDealAccess,
    ) -> Result<RemoteAccess, ApiError> {
        (**self).create_deal_access(session, deal, access)
    }
}
