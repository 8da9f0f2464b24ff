//! Blocking HTTP implementation of [`BrokerageApi`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use dealsync_core::{
    AddressAttributes, AddressId, ApiError, Brokerage, BrokerageApi, BrokerageId, Config,
    Credentials, DealAttributes, NewDealAccess, NewProfile, RemoteAccess, RemoteDeal,
    RemoteDealId, RemoteProfile, Session,
};

use crate::error::{decode_err, from_ureq};
use crate::wire::{
    AccessAttributes, BrokerageAttributes, Document, Ignored, Outbound, ProfileAttributes,
    Resource, SignInRequest, SignInResponse,
};

const JSON_API: &str = "application/vnd.api+json";

/// REST client for the brokerage-accounting service.
///
/// Requests are never retried; every failure is returned to the caller as an
/// [`ApiError`].
pub struct HttpBrokerageApi {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBrokerageApi {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        tracing::debug!(method, path, "brokerage api request");
        self.agent
            .request(method, &format!("{}{path}", self.base_url))
            .set("Accept", JSON_API)
    }

    fn authed(&self, method: &str, path: &str, session: &Session) -> ureq::Request {
        self.request(method, path)
            .set("Authorization", &format!("Bearer {}", session.token()))
    }
}

fn send<T: DeserializeOwned>(
    what: &str,
    request: ureq::Request,
    body: impl Serialize,
) -> Result<T, ApiError> {
    read(what, request.set("Content-Type", JSON_API).send_json(body))
}

fn read<T: DeserializeOwned>(
    what: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<T, ApiError> {
    let response = result.map_err(from_ureq)?;
    let body = response
        .into_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| decode_err(what, e))
}

impl BrokerageApi for HttpBrokerageApi {
    fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let request = self.request("POST", "/sign_in");
        let body = SignInRequest {
            email: &credentials.email,
            password: &credentials.password,
        };
        let response: SignInResponse = send("sign-in response", request, body)?;
        tracing::info!(email = %credentials.email, "signed in");
        Ok(Session::new(response.token))
    }

    fn list_brokerages(&self, session: &Session) -> Result<Vec<Brokerage>, ApiError> {
        let request = self.authed("GET", "/brokerages", session);
        let doc: Document<Vec<Resource<BrokerageAttributes>>> =
            read("brokerage list", request.call())?;
        Ok(doc.data.into_iter().map(Brokerage::from).collect())
    }

    fn search_profiles(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        email: &str,
    ) -> Result<Vec<RemoteProfile>, ApiError> {
        let path = format!("/brokerages/{brokerage}/profiles");
        let request = self
            .authed("GET", &path, session)
            .query("filter[email]", email);
        let doc: Document<Vec<Resource<ProfileAttributes>>> =
            read("profile search", request.call())?;
        Ok(doc.data.into_iter().map(RemoteProfile::from).collect())
    }

    fn create_profile(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        profile: &NewProfile,
    ) -> Result<RemoteProfile, ApiError> {
        let path = format!("/brokerages/{brokerage}/profiles");
        let request = self.authed("POST", &path, session);
        let doc: Document<Resource<ProfileAttributes>> =
            send("created profile", request, Outbound::new("profiles", profile))?;
        Ok(doc.data.into())
    }

    fn create_deal(
        &self,
        session: &Session,
        brokerage: &BrokerageId,
        attributes: &DealAttributes,
    ) -> Result<RemoteDeal, ApiError> {
        let path = format!("/brokerages/{brokerage}/deals");
        let request = self.authed("POST", &path, session);
        let doc: Document<Resource<Ignored>> =
            send("created deal", request, Outbound::new("deals", attributes))?;
        Ok(doc.data.into())
    }

    fn update_deal(
        &self,
        session: &Session,
        deal: &RemoteDealId,
        attributes: &DealAttributes,
    ) -> Result<RemoteDeal, ApiError> {
        let path = format!("/deals/{deal}");
        let request = self.authed("PATCH", &path, session);
        let body = Outbound::with_id("deals", deal.as_str(), attributes);
        let doc: Document<Resource<Ignored>> = send("updated deal", request, body)?;
        Ok(doc.data.into())
    }

    fn update_address(
        &self,
        session: &Session,
        address: &AddressId,
        attributes: &AddressAttributes,
    ) -> Result<(), ApiError> {
        let path = format!("/addresses/{address}");
        let body = Outbound::with_id("addresses", address.as_str(), attributes);
        self.authed("PATCH", &path, session)
            .set("Content-Type", JSON_API)
            .send_json(body)
            .map_err(from_ureq)?;
        Ok(())
    }

    fn create_deal_access(
        &self,
        session: &Session,
        deal: &RemoteDealId,
        access: &NewDealAccess,
    ) -> Result<RemoteAccess, ApiError> {
        let path = format!("/deals/{deal}/deal_accesses");
        let request = self.authed("POST", &path, session);
        let doc: Document<Resource<AccessAttributes>> =
            send("created deal access", request, Outbound::new("deal_accesses", access))?;
        Ok(doc.data.into_access(&access.profile_id))
    }
}
