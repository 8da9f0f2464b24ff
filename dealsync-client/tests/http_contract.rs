//! Request shapes and error mapping against a local mock server.

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;

use dealsync_client::HttpBrokerageApi;
use dealsync_core::{
    AddressAttributes, AddressId, ApiError, BrokerageApi, BrokerageId, Credentials,
    DealAttributes, NewDealAccess, NewProfile, ProfileId, ProfileType, RemoteDealId,
    RoleCategory, Session, Side,
};

fn api(server: &Server) -> HttpBrokerageApi {
    HttpBrokerageApi::new(&server.url(), Duration::from_secs(5))
}

fn session() -> Session {
    Session::new("tok-1")
}

fn attributes() -> DealAttributes {
    DealAttributes {
        deal_type: "Residential".to_string(),
        deal_sub_type: "Resale".to_string(),
        lead_source: "Referral".to_string(),
        property_type: "Condo".to_string(),
        sale_status: "Firm".to_string(),
        exclusive: false,
        offer: false,
        team_deal: false,
        owning_side: Side::List,
        primary_agent_id: ProfileId::from("p-agent"),
        sell_price: Some(725_000.0),
        closed_at: None,
        sold_at: None,
        possession_at: None,
        block: None,
        lot: None,
        mls_number: None,
    }
}

#[test]
fn sign_in_posts_credentials_and_returns_token() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/sign_in")
        .match_body(Matcher::Json(json!({ "email": "a@x.com", "password": "pw" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "token": "tok-9" }"#)
        .create();

    let session = api(&server)
        .sign_in(&Credentials {
            email: "a@x.com".to_string(),
            password: "pw".to_string(),
        })
        .expect("sign in");

    mock.assert();
    assert_eq!(session.token(), "tok-9");
}

#[test]
fn rejected_sign_in_carries_error_detail() {
    let mut server = Server::new();
    server
        .mock("POST", "/sign_in")
        .with_status(401)
        .with_body(r#"{ "errors": [ { "title": "Unauthorized", "detail": "Invalid email or password" } ] }"#)
        .create();

    let err = api(&server)
        .sign_in(&Credentials {
            email: "a@x.com".to_string(),
            password: "wrong".to_string(),
        })
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Status {
            status: 401,
            message: "Invalid email or password".to_string(),
        }
    );
}

#[test]
fn profile_search_filters_by_email_with_bearer_token() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/brokerages/b-1/profiles")
        .match_query(Matcher::UrlEncoded(
            "filter[email]".to_string(),
            "s+1@x.com".to_string(),
        ))
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_body(
            r#"{ "data": [ { "id": "p-3", "type": "profiles",
                 "attributes": { "email": "s+1@x.com", "firstName": "Sam", "lastName": "Seller" } } ] }"#,
        )
        .create();

    let found = api(&server)
        .search_profiles(&session(), &BrokerageId::from("b-1"), "s+1@x.com")
        .expect("search");

    mock.assert();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, ProfileId::from("p-3"));
    assert_eq!(found[0].first_name.as_deref(), Some("Sam"));
}

#[test]
fn create_profile_wraps_attributes_in_a_resource() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/brokerages/b-1/profiles")
        .match_body(Matcher::PartialJson(json!({
            "data": {
                "type": "profiles",
                "attributes": { "email": "n@x.com", "firstName": "Nia", "profileType": "Agent" }
            }
        })))
        .with_status(201)
        .with_body(r#"{ "data": { "id": "p-5", "type": "profiles", "attributes": { "email": "n@x.com" } } }"#)
        .create();

    let created = api(&server)
        .create_profile(
            &session(),
            &BrokerageId::from("b-1"),
            &NewProfile {
                email: "n@x.com".to_string(),
                first_name: "Nia".to_string(),
                last_name: None,
                profile_type: ProfileType::Agent,
            },
        )
        .expect("create");

    mock.assert();
    assert_eq!(created.id, ProfileId::from("p-5"));
}

#[test]
fn create_deal_omits_absent_fields_and_reads_address_relationship() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/brokerages/b-1/deals")
        .match_body(Matcher::Json(json!({
            "data": {
                "type": "deals",
                "attributes": {
                    "dealType": "Residential",
                    "dealSubType": "Resale",
                    "leadSource": "Referral",
                    "propertyType": "Condo",
                    "saleStatus": "Firm",
                    "exclusive": false,
                    "offer": false,
                    "teamDeal": false,
                    "owningSide": "list",
                    "primaryAgentId": "p-agent",
                    "sellPrice": 725000.0
                }
            }
        })))
        .with_status(201)
        .with_body(
            r#"{ "data": { "id": "r-1", "type": "deals",
                 "relationships": { "address": { "data": { "id": "addr-1", "type": "addresses" } } } } }"#,
        )
        .create();

    let deal = api(&server)
        .create_deal(&session(), &BrokerageId::from("b-1"), &attributes())
        .expect("create deal");

    mock.assert();
    assert_eq!(deal.id, RemoteDealId::from("r-1"));
    assert_eq!(deal.address_id, Some(AddressId::from("addr-1")));
}

#[test]
fn update_deal_patches_the_stored_id() {
    let mut server = Server::new();
    let mock = server
        .mock("PATCH", "/deals/r-77")
        .match_body(Matcher::PartialJson(json!({ "data": { "id": "r-77", "type": "deals" } })))
        .with_status(200)
        .with_body(r#"{ "data": { "id": "r-77", "type": "deals" } }"#)
        .create();

    let deal = api(&server)
        .update_deal(&session(), &RemoteDealId::from("r-77"), &attributes())
        .expect("update");

    mock.assert();
    assert_eq!(deal.id, RemoteDealId::from("r-77"));
    assert_eq!(deal.address_id, None);
}

#[test]
fn address_update_accepts_empty_response_body() {
    let mut server = Server::new();
    let mock = server
        .mock("PATCH", "/addresses/addr-1")
        .match_body(Matcher::Json(json!({
            "data": { "type": "addresses", "id": "addr-1", "attributes": { "city": "Halifax" } }
        })))
        .with_status(204)
        .create();

    api(&server)
        .update_address(
            &session(),
            &AddressId::from("addr-1"),
            &AddressAttributes {
                city: Some("Halifax".to_string()),
                ..AddressAttributes::default()
            },
        )
        .expect("address update");

    mock.assert();
}

#[test]
fn deal_access_is_posted_under_the_deal() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/deals/r-1/deal_accesses")
        .match_body(Matcher::PartialJson(json!({
            "data": { "attributes": { "profileId": "p-3", "accessRole": "seller", "side": "list" } }
        })))
        .with_status(201)
        .with_body(r#"{ "data": { "id": "acc-1", "type": "deal_accesses" } }"#)
        .create();

    let access = api(&server)
        .create_deal_access(
            &session(),
            &RemoteDealId::from("r-1"),
            &NewDealAccess {
                profile_id: ProfileId::from("p-3"),
                access_role: RoleCategory::Seller,
                side: Side::List,
            },
        )
        .expect("grant");

    mock.assert();
    assert_eq!(access.profile_id, ProfileId::from("p-3"));
}

#[test]
fn malformed_success_body_is_a_decode_error() {
    let mut server = Server::new();
    server
        .mock("GET", "/brokerages")
        .with_status(200)
        .with_body(r#"{ "brokerages": [] }"#)
        .create();

    let err = api(&server).list_brokerages(&session()).unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got: {err}");
}

#[test]
fn non_json_error_body_is_kept_as_message() {
    let mut server = Server::new();
    server
        .mock("GET", "/brokerages")
        .with_status(502)
        .with_body("upstream unavailable")
        .create();

    let err = api(&server).list_brokerages(&session()).unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(err.to_string().contains("upstream unavailable"), "got: {err}");
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let api = HttpBrokerageApi::new("http://127.0.0.1:9/", Duration::from_secs(2));
    assert_eq!(api.base_url(), "http://127.0.0.1:9");
    let err = api.list_brokerages(&session()).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got: {err}");
}
