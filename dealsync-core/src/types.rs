//! Domain types for a local deal snapshot and the remote vocabulary it maps onto.
//!
//! A [`Deal`] is immutable for the duration of a sync run. Everything here is
//! serializable via serde so deal snapshots can be read from JSON files.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifier of a deal in the local CRM.
    DealId
);
string_id!(
    /// Identifier of the corresponding deal in the brokerage-accounting service.
    RemoteDealId
);
string_id!(
    /// Identifier of a remote brokerage.
    BrokerageId
);
string_id!(
    /// Identifier of a remote person/organization profile.
    ProfileId
);
string_id!(
    /// Identifier of the remote address record attached to a remote deal.
    AddressId
);
string_id!(
    /// Identifier of a remote deal-access grant.
    AccessId
);
string_id!(
    /// Identifier of an organizational unit (team, office, company) in the CRM.
    BrandId
);

// ---------------------------------------------------------------------------
// Deal metadata enums
// ---------------------------------------------------------------------------

/// Which side of the transaction the local deal was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Buying,
    Selling,
}

/// Double-ended transaction indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EnderType {
    #[default]
    #[serde(rename = "none")]
    None,
    OfficeDoubleEnder,
    AgentDoubleEnder,
}

impl EnderType {
    pub fn is_double_ender(self) -> bool {
        matches!(self, EnderType::OfficeDoubleEnder | EnderType::AgentDoubleEnder)
    }
}

/// Kind of organizational unit in the brand hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BrandType {
    Team,
    Office,
    Brokerage,
    #[default]
    #[serde(other)]
    Other,
}

/// One organizational unit of a deal's brand hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandUnit {
    pub id: BrandId,
    #[serde(default)]
    pub brand_type: BrandType,
}

// ---------------------------------------------------------------------------
// Role vocabulary
// ---------------------------------------------------------------------------

/// Participant role tag. Unknown tags are kept verbatim in [`RoleTag::Other`]
/// and classify into the catch-all category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleTag {
    Buyer,
    Seller,
    BuyerAgent,
    SellerAgent,
    CoBuyerAgent,
    CoSellerAgent,
    Title,
    Lawyer,
    BuyerLawyer,
    SellerLawyer,
    BuyerReferral,
    SellerReferral,
    Tenant,
    Landlord,
    Other(String),
}

impl RoleTag {
    /// Every named tag of the fixed vocabulary (excludes `Other`).
    pub const KNOWN: [RoleTag; 14] = [
        RoleTag::Buyer,
        RoleTag::Seller,
        RoleTag::BuyerAgent,
        RoleTag::SellerAgent,
        RoleTag::CoBuyerAgent,
        RoleTag::CoSellerAgent,
        RoleTag::Title,
        RoleTag::Lawyer,
        RoleTag::BuyerLawyer,
        RoleTag::SellerLawyer,
        RoleTag::BuyerReferral,
        RoleTag::SellerReferral,
        RoleTag::Tenant,
        RoleTag::Landlord,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RoleTag::Buyer => "Buyer",
            RoleTag::Seller => "Seller",
            RoleTag::BuyerAgent => "BuyerAgent",
            RoleTag::SellerAgent => "SellerAgent",
            RoleTag::CoBuyerAgent => "CoBuyerAgent",
            RoleTag::CoSellerAgent => "CoSellerAgent",
            RoleTag::Title => "Title",
            RoleTag::Lawyer => "Lawyer",
            RoleTag::BuyerLawyer => "BuyerLawyer",
            RoleTag::SellerLawyer => "SellerLawyer",
            RoleTag::BuyerReferral => "BuyerReferral",
            RoleTag::SellerReferral => "SellerReferral",
            RoleTag::Tenant => "Tenant",
            RoleTag::Landlord => "Landlord",
            RoleTag::Other(tag) => tag,
        }
    }

    pub fn is_buyer_agent(&self) -> bool {
        matches!(self, RoleTag::BuyerAgent | RoleTag::CoBuyerAgent)
    }

    pub fn is_seller_agent(&self) -> bool {
        matches!(self, RoleTag::SellerAgent | RoleTag::CoSellerAgent)
    }

    pub fn is_agent(&self) -> bool {
        self.is_buyer_agent() || self.is_seller_agent()
    }
}

impl From<String> for RoleTag {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Buyer" => RoleTag::Buyer,
            "Seller" => RoleTag::Seller,
            "BuyerAgent" => RoleTag::BuyerAgent,
            "SellerAgent" => RoleTag::SellerAgent,
            "CoBuyerAgent" => RoleTag::CoBuyerAgent,
            "CoSellerAgent" => RoleTag::CoSellerAgent,
            "Title" => RoleTag::Title,
            "Lawyer" => RoleTag::Lawyer,
            "BuyerLawyer" => RoleTag::BuyerLawyer,
            "SellerLawyer" => RoleTag::SellerLawyer,
            "BuyerReferral" => RoleTag::BuyerReferral,
            "SellerReferral" => RoleTag::SellerReferral,
            "Tenant" => RoleTag::Tenant,
            "Landlord" => RoleTag::Landlord,
            _ => RoleTag::Other(s),
        }
    }
}

impl From<&str> for RoleTag {
    fn from(s: &str) -> Self {
        RoleTag::from(s.to_owned())
    }
}

impl From<RoleTag> for String {
    fn from(tag: RoleTag) -> Self {
        match tag {
            RoleTag::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target-system role classification of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    Agent,
    OutsideBrokerage,
    TitleCompany,
    Buyer,
    Seller,
    Lawyer,
    SourceOfBusiness,
    OtherProfile,
}

impl RoleCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleCategory::Agent => "agent",
            RoleCategory::OutsideBrokerage => "outside_brokerage",
            RoleCategory::TitleCompany => "title_company",
            RoleCategory::Buyer => "buyer",
            RoleCategory::Seller => "seller",
            RoleCategory::Lawyer => "lawyer",
            RoleCategory::SourceOfBusiness => "source_of_business",
            RoleCategory::OtherProfile => "other_profile",
        }
    }
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction side in the target system's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Sell,
    List,
    DoubleEnd,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Sell => "sell",
            Side::List => "list",
            Side::DoubleEnd => "double_end",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Deal snapshot
// ---------------------------------------------------------------------------

/// Typed value of a deal context field. Any subset may be set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContextValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl ContextValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn number(value: f64) -> Self {
        Self {
            number: Some(value),
            ..Self::default()
        }
    }

    pub fn date(value: DateTime<Utc>) -> Self {
        Self {
            date: Some(value),
            ..Self::default()
        }
    }

    /// Text form of the value: the text itself, else the number rendered
    /// without a trailing `.0`. Blank text counts as absent.
    pub fn as_text(&self) -> Option<String> {
        if let Some(text) = self.text.as_deref().map(str::trim) {
            if !text.is_empty() {
                return Some(text.to_owned());
            }
        }
        self.number.map(|n| {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", n as i64)
            } else {
                n.to_string()
            }
        })
    }

    /// Numeric form of the value: the number itself, else the text parsed
    /// after stripping currency separators. Non-finite values read as absent.
    pub fn as_number(&self) -> Option<f64> {
        if let Some(n) = self.number {
            return Some(n).filter(|n| n.is_finite());
        }
        let text = self.text.as_deref()?;
        let cleaned: String = text
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | ' '))
            .collect();
        cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_none() && self.date.is_none()
    }
}

/// A transaction participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub role: RoleTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_title: Option<String>,
}

impl Role {
    /// The participant's email if it is usable for sync (non-blank).
    pub fn sync_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Full legal name, falling back to the company title, then the email.
    pub fn legal_name(&self) -> String {
        let parts: Vec<&str> = [&self.legal_first_name, &self.legal_last_name]
            .into_iter()
            .filter_map(|p| p.as_deref().map(str::trim))
            .filter(|p| !p.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
        if let Some(company) = self.company_title.as_deref().map(str::trim) {
            if !company.is_empty() {
                return company.to_owned();
            }
        }
        self.sync_email().unwrap_or_default().to_owned()
    }
}

/// Immutable snapshot of a local deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    #[serde(default)]
    pub title: String,
    pub direction: Direction,
    #[serde(default)]
    pub is_listing: bool,
    #[serde(default)]
    pub ender_type: EnderType,
    /// Most specific unit first.
    #[serde(default)]
    pub brand_hierarchy: Vec<BrandUnit>,
    #[serde(default)]
    pub contexts: BTreeMap<String, ContextValue>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Deal {
    /// Look up a context field. Fields with no usable value are reported as absent.
    pub fn context(&self, key: &str) -> Option<&ContextValue> {
        self.contexts.get(key).filter(|v| !v.is_empty())
    }

    /// `true` when the most specific organizational unit is a team.
    pub fn is_team_deal(&self) -> bool {
        self.brand_hierarchy
            .first()
            .is_some_and(|unit| unit.brand_type == BrandType::Team)
    }

    /// Roles that carry a usable email, in snapshot order.
    pub fn syncable_roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter().filter(|r| r.sync_email().is_some())
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Durable association between a local deal and its remote counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub deal_id: DealId,
    pub remote_deal_id: RemoteDealId,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
