//! Recording in-process brokerage service shared by the engine integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use chrono::Utc;

use dealsync_core::{
    config::BrandCredentials, AccessId, AddressAttributes, AddressId, ApiError, BrandId,
    BrandType, BrandUnit, Brokerage, BrokerageApi, BrokerageId, Credentials, Deal,
    DealAttributes, DealId, Direction, EnderType, Mapping, MappingError, MappingStore,
    NewDealAccess, NewProfile, ProfileId, ProfileType, RemoteAccess, RemoteDeal, RemoteDealId, RemoteProfile, Role, RoleTag, Session,
};
use dealsync_engine::FormSelections;

/// One call observed by [`FakeBrokerage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SignIn(String),
    ListBrokerages,
    SearchProfiles(String),
    CreateProfile(NewProfile),
    CreateDeal(DealAttributes),
    UpdateDeal(RemoteDealId, DealAttributes),
    UpdateAddress(AddressId, AddressAttributes),
    CreateAccess(RemoteDealId, NewDealAccess),
}

pub struct FakeBrokerage {
    pub brokerages: Vec<Brokerage>,
    /// Emails whose profile search fails.
    pub failing_searches: HashSet<String>,
    /// Emails whose profile creation fails.
    pub failing_creates: HashSet<String>,
    /// Profile ids whose access grant fails.
    pub failing_grants: HashSet<ProfileId>,
    pub reject_sign_in: bool,
    pub fail_create_deal: bool,
    pub fail_update_address: bool,
    /// Address record attached to every deal this fake returns.
    pub address_id: Option<AddressId>,
    pub(crate) profiles: RefCell<Vec<RemoteProfile>>,
    pub(crate) calls: RefCell<Vec<Call>>,
    pub(crate) next_id: Cell<u32>,
}

impl Default for FakeBrokerage {
    fn default() -> Self {
        Self {
            brokerages: vec![Brokerage {
                id: BrokerageId::from("b-1"),
                name: "Harbour Realty".to_string(),
            }],
            failing_searches: HashSet::new(),
            failing_creates: HashSet::new(),
            failing_grants: HashSet::new(),
            reject_sign_in: false,
            fail_create_deal: false,
            fail_update_address: false,
            address_id: Some(AddressId::from("addr-1")),
            profiles: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }
}

impl FakeBrokerage {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Seed a profile that already exists remotely.
    pub fn with_profile(self, id: &str, email: &str) -> Self {
        self.profiles.borrow_mut().push(RemoteProfile {
            id: ProfileId::from(id),
            email: Some(email.to_string()),
            first_name: None,
            last_name: None,
        });
        self
    }

    pub fn profile_id_for(&self, email: &str) -> Option<ProfileId> {
        self.profiles
            .borrow()
            .iter()
            .find(|p| p.email.as_deref() == Some(email))
            .map(|p| p.id.clone())
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next(&self, prefix: &str) -> String {
        let n = self.next_id.get();
        self.next_id.set(n + 1);
        format!("{prefix}-{n}")
    }

    fn rejected(message: &str) -> ApiError {
        ApiError::Status {
            status: 422,
            message: message.to_string(),
        }
    }
}

impl BrokerageApi for FakeBrokerage {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        self.record(Call::SignIn(credentials.email.clone()));
        if self.reject_sign_in {
            return Err(ApiError::Status {
                status: 401,
                message: "Invalid email or password".to_string(),
            });
        }
        Ok(Session::new("token"))
    }

    fn list_brokerages(&self, _session: &Session) -> Result<Vec<Brokerage>, ApiError> {
        self.record(Call::ListBrokerages);
        Ok(self.brokerages.clone())
    }

    fn search_profiles(
        &self,
        _session: &Session,
        _brokerage: &BrokerageId,
        email: &str,
    ) -> Result<Vec<RemoteProfile>, ApiError> {
        self.record(Call::SearchProfiles(email.to_string()));
        if self.failing_searches.contains(email) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        Ok(self
            .profiles
            .borrow()
            .iter()
            .filter(|p| p.email.as_deref() == Some(email))
            .cloned()
            .collect())
    }

    fn create_profile(
        &self,
        _session: &Session,
        _brokerage: &BrokerageId,
        profile: &NewProfile,
    ) -> Result<RemoteProfile, ApiError> {
        self.record(Call::CreateProfile(profile.clone()));
        if self.failing_creates.contains(&profile.email) {
            return Err(Self::rejected("Email has already been taken"));
        }
        let created = RemoteProfile {
            id: ProfileId::from(self.next("p")),
            email: Some(profile.email.clone()),
            first_name: Some(profile.first_name.clone()),
            last_name: profile.last_name.clone(),
        };
        self.profiles.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn create_deal(
        &self,
        _session: &Session,
        _brokerage: &BrokerageId,
        attributes: &DealAttributes,
    ) -> Result<RemoteDeal, ApiError> {
        self.record(Call::CreateDeal(attributes.clone()));
        if self.fail_create_deal {
            return Err(Self::rejected("Deal type is invalid"));
        }
        Ok(RemoteDeal {
            id: RemoteDealId::from(self.next("r")),
            address_id: self.address_id.clone(),
        })
    }

    fn update_deal(
        &self,
        _session: &Session,
        deal: &RemoteDealId,
        attributes: &DealAttributes,
    ) -> Result<RemoteDeal, ApiError> {
        self.record(Call::UpdateDeal(deal.clone(), attributes.clone()));
        Ok(RemoteDeal {
            id: deal.clone(),
            address_id: self.address_id.clone(),
        })
    }

    fn update_address(
        &self,
        _session: &Session,
        address: &AddressId,
        attributes: &AddressAttributes,
    ) -> Result<(), ApiError> {
        self.record(Call::UpdateAddress(address.clone(), attributes.clone()));
        if self.fail_update_address {
            return Err(Self::rejected("Postal code is invalid"));
        }
        Ok(())
    }

    fn create_deal_access(
        &self,
        _session: &Session,
        deal: &RemoteDealId,
        access: &NewDealAccess,
    ) -> Result<RemoteAccess, ApiError> {
        self.record(Call::CreateAccess(deal.clone(), access.clone()));
        if self.failing_grants.contains(&access.profile_id) {
            return Err(Self::rejected("Profile already has access"));
        }
        Ok(RemoteAccess {
            id: AccessId::from(self.next("acc")),
            profile_id: access.profile_id.clone(),
        })
    }
}

/// Mapping store whose reads or writes fail, as a remote-backed store would
/// when its backend is down.
#[derive(Default)]
pub struct BrokenStore {
    pub fail_lookup: bool,
    pub fail_create: bool,
}

impl MappingStore for BrokenStore {
    fn lookup(&self, _deal_id: &DealId) -> Result<Option<Mapping>, MappingError> {
        if self.fail_lookup {
            return Err(MappingError::Unavailable("connection refused".to_string()));
        }
        Ok(None)
    }

    fn create(&mut self, deal_id: &DealId, remote: &RemoteDealId) -> Result<Mapping, MappingError> {
        if self.fail_create {
            return Err(MappingError::Unavailable("disk full".to_string()));
        }
        Ok(Mapping {
            deal_id: deal_id.clone(),
            remote_deal_id: remote.clone(),
            created_at: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn role(tag: &str, email: &str, first: &str, last: &str) -> Role {
    Role {
        role: RoleTag::from(tag),
        email: Some(email.to_string()),
        legal_first_name: Some(first.to_string()),
        legal_last_name: Some(last.to_string()),
        company_title: None,
    }
}

/// A selling-side listing in office `o-1`: seller s@x.com, listing agent a@x.com.
pub fn listing_deal() -> Deal {
    Deal {
        id: DealId::from("deal-42"),
        title: "12 Harbour Lane".to_string(),
        direction: Direction::Selling,
        is_listing: true,
        ender_type: EnderType::None,
        brand_hierarchy: vec![
            BrandUnit {
                id: BrandId::from("o-1"),
                brand_type: BrandType::Office,
            },
            BrandUnit {
                id: BrandId::from("c-1"),
                brand_type: BrandType::Brokerage,
            },
        ],
        contexts: BTreeMap::new(),
        roles: vec![
            role("Seller", "s@x.com", "Sam", "Seller"),
            role("SellerAgent", "a@x.com", "Alex", "Agent"),
        ],
    }
}

pub fn selections() -> FormSelections {
    FormSelections {
        deal_type: Some("Residential".to_string()),
        deal_sub_type: Some("Resale".to_string()),
        lead_source: Some("Referral".to_string()),
        property_type: Some("Condo".to_string()),
        sale_status: Some("Firm".to_string()),
    }
}

pub fn company_credentials() -> Vec<BrandCredentials> {
    vec![BrandCredentials {
        brand: BrandId::from("c-1"),
        email: "sync@harbour.example".to_string(),
        password: "pw".to_string(),
    }]
}

pub fn request(deal: Deal) -> dealsync_engine::SyncRequest {
    dealsync_engine::SyncRequest {
        deal,
        user_email: "a@x.com".to_string(),
        selections: selections(),
        credentials: company_credentials(),
        session: None,
    }
}

pub fn is_create_profile(call: &Call) -> bool {
    matches!(call, Call::CreateProfile(_))
}

pub fn is_create_deal(call: &Call) -> bool {
    matches!(call, Call::CreateDeal(_))
}

pub fn is_update_deal(call: &Call) -> bool {
    matches!(call, Call::UpdateDeal(..))
}

pub fn is_sign_in(call: &Call) -> bool {
    matches!(call, Call::SignIn(_))
}

pub fn profile_type_of(call: &Call) -> Option<ProfileType> {
    match call {
        Call::CreateProfile(p) => Some(p.profile_type),
        _ => None,
    }
}
