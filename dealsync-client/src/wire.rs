//! JSON:API envelopes exchanged with the brokerage-accounting service.
//!
//! Only the fields the engine reads are modelled; everything else in a
//! response is ignored.

use serde::{Deserialize, Serialize};

use dealsync_core::{
    AccessId, AddressId, Brokerage, BrokerageId, ProfileId, RemoteAccess, RemoteDeal,
    RemoteDealId, RemoteProfile,
};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignInResponse {
    pub token: String,
}

/// `{ "data": { "type", "id"?, "attributes" } }`
#[derive(Debug, Serialize)]
pub(crate) struct Outbound<'a, A> {
    pub data: OutboundResource<'a, A>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OutboundResource<'a, A> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    pub attributes: &'a A,
}

impl<'a, A> Outbound<'a, A> {
    pub fn new(kind: &'static str, attributes: &'a A) -> Self {
        Self {
            data: OutboundResource {
                kind,
                id: None,
                attributes,
            },
        }
    }

    pub fn with_id(kind: &'static str, id: &'a str, attributes: &'a A) -> Self {
        Self {
            data: OutboundResource {
                kind,
                id: Some(id),
                attributes,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct Document<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Resource<A> {
    pub id: String,
    #[serde(default)]
    pub attributes: Option<A>,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Relationships {
    #[serde(default)]
    pub address: Option<Relationship>,
    #[serde(default)]
    pub profile: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Relationship {
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRef {
    pub id: String,
}

impl Relationship {
    fn id(&self) -> Option<&str> {
        self.data.as_ref().map(|r| r.id.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BrokerageAttributes {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileAttributes {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessAttributes {
    #[serde(default)]
    pub profile_id: Option<String>,
}

/// Deal attributes are not read back; only id and relationships matter.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Ignored {}

impl From<Resource<BrokerageAttributes>> for Brokerage {
    fn from(r: Resource<BrokerageAttributes>) -> Self {
        Brokerage {
            id: BrokerageId::from(r.id),
            name: r.attributes.unwrap_or_default().name,
        }
    }
}

impl From<Resource<ProfileAttributes>> for RemoteProfile {
    fn from(r: Resource<ProfileAttributes>) -> Self {
        let attrs = r.attributes.unwrap_or_default();
        RemoteProfile {
            id: ProfileId::from(r.id),
            email: attrs.email,
            first_name: attrs.first_name,
            last_name: attrs.last_name,
        }
    }
}

impl From<Resource<Ignored>> for RemoteDeal {
    fn from(r: Resource<Ignored>) -> Self {
        let address_id = r
            .relationships
            .address
            .as_ref()
            .and_then(Relationship::id)
            .map(AddressId::from);
        RemoteDeal {
            id: RemoteDealId::from(r.id),
            address_id,
        }
    }
}

impl Resource<AccessAttributes> {
    /// The granted profile comes from the attributes or the `profile`
    /// relationship; `requested` is used when the response carries neither.
    pub fn into_access(self, requested: &ProfileId) -> RemoteAccess {
        let from_relationship = self
            .relationships
            .profile
            .as_ref()
            .and_then(Relationship::id)
            .map(str::to_owned);
        let profile_id = self
            .attributes
            .and_then(|a| a.profile_id)
            .or(from_relationship)
            .map(ProfileId::from)
            .unwrap_or_else(|| requested.clone());
        RemoteAccess {
            id: AccessId::from(self.id),
            profile_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDocument {
    #[serde(default)]
    pub errors: Vec<ErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorObject {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// The first error's `detail` (or `title`) from a JSON:API error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let doc: ErrorDocument = serde_json::from_str(body).ok()?;
    let first = doc.errors.into_iter().next()?;
    first
        .detail
        .or(first.title)
        .filter(|m| !m.trim().is_empty())
}
