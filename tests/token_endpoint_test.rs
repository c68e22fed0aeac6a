// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fake-jwt-server project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use chrono::Duration;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use rocket::config::LogLevel;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;
use std::sync::Once;

use fake_jwt_server::config::Config;
use fake_jwt_server::server::{build_rocket, FakeJwtServer};

static INIT: Once = Once::new();

/// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// Generate a test configuration for Rocket
fn get_test_figment() -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("port", 0)) // Use random port for testing
        .merge(("address", "127.0.0.1"))
        .merge(("log_level", LogLevel::Off))
}

/// Build a local test client around a server with the given configuration
async fn test_client(config: Config) -> Client {
    let server = FakeJwtServer::new(config).expect("server key material should load");
    Client::tracked(build_rocket(get_test_figment(), server))
        .await
        .expect("valid rocket instance")
}

/// Fetch the published key set and build a decoding key from its sole entry
async fn decoding_key_from_jwks(client: &Client) -> (DecodingKey, String) {
    let response = client.get("/jwks").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value =
        serde_json::from_str(&response.into_string().await.expect("jwks body")).unwrap();
    let keys = body["keys"].as_array().expect("keys should be an array");
    assert_eq!(keys.len(), 1, "key set should contain exactly one key");

    let n = keys[0]["n"].as_str().expect("modulus");
    let e = keys[0]["e"].as_str().expect("exponent");
    let kid = keys[0]["kid"].as_str().expect("key id").to_string();

    let key = DecodingKey::from_rsa_components(n, e).expect("JWK components should be usable");
    (key, kid)
}

/// Issue a token and return the access token string and the full envelope
async fn issue_token(client: &Client) -> (String, Value) {
    let response = client.post("/token").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::JSON));

    let envelope: Value =
        serde_json::from_str(&response.into_string().await.expect("token body")).unwrap();
    let access_token = envelope["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string();
    (access_token, envelope)
}

#[rocket::async_test]
async fn test_token_response_envelope() {
    setup();
    let client = test_client(Config::default()).await;

    let (access_token, envelope) = issue_token(&client).await;

    assert_eq!(envelope["message"], "Successfully created token");
    assert_eq!(envelope["token_type"], "Bearer");
    assert_eq!(
        envelope["expires_in"].as_i64().unwrap(),
        Config::default().expires.num_seconds()
    );
    assert_eq!(
        access_token.split('.').count(),
        3,
        "JWT should have 3 segments"
    );
}

#[rocket::async_test]
async fn test_token_claims_match_configuration() {
    setup();
    let config = Config {
        issuer: "acme".to_string(),
        subject: "user-1".to_string(),
        audience: "svcA".to_string(),
        id: "tok-1".to_string(),
        email: "u@acme.test".to_string(),
        grant_type: "client_credentials".to_string(),
        expires: Duration::minutes(60),
        ..Config::default()
    };
    let client = test_client(config).await;

    let (access_token, envelope) = issue_token(&client).await;
    assert_eq!(envelope["expires_in"].as_i64().unwrap(), 3600);

    let (key, _) = decoding_key_from_jwks(&client).await;
    let mut validation = Validation::new(Algorithm::RS512);
    validation.set_audience(&["svcA"]);
    let claims = decode::<Value>(&access_token, &key, &validation)
        .expect("token should verify against the published key")
        .claims;

    assert_eq!(claims["iss"], "acme");
    assert_eq!(claims["sub"], "user-1");
    assert_eq!(claims["aud"], serde_json::json!(["svcA"]));
    assert_eq!(claims["jti"], "tok-1");
    assert_eq!(claims["email"], "u@acme.test");
    assert_eq!(claims["grant_type"], "client_credentials");
}

#[rocket::async_test]
async fn test_token_time_claims_ordering() {
    setup();
    let client = test_client(Config::default()).await;

    let (access_token, _) = issue_token(&client).await;
    let (key, _) = decoding_key_from_jwks(&client).await;

    let mut validation = Validation::new(Algorithm::RS512);
    validation.set_audience(&["test"]);
    let claims = decode::<Value>(&access_token, &key, &validation).unwrap().claims;

    let nbf = claims["nbf"].as_i64().unwrap();
    let iat = claims["iat"].as_i64().unwrap();
    let exp = claims["exp"].as_i64().unwrap();
    assert!(nbf < iat, "nbf must be strictly earlier than iat");
    assert!(iat < exp, "iat must be strictly earlier than exp");
    // nbf is backdated by exactly one day
    assert_eq!(iat - nbf, 24 * 60 * 60);
}

#[rocket::async_test]
async fn test_token_header_kid_matches_jwks() {
    setup();
    let client = test_client(Config::default()).await;

    let (access_token, _) = issue_token(&client).await;
    let (_, kid) = decoding_key_from_jwks(&client).await;

    let header = decode_header(&access_token).unwrap();
    assert_eq!(header.alg, Algorithm::RS512);
    assert_eq!(header.kid.as_deref(), Some(kid.as_str()));
}

#[rocket::async_test]
async fn test_two_tokens_both_verify() {
    setup();
    let client = test_client(Config::default()).await;

    let (first, _) = issue_token(&client).await;
    let (second, _) = issue_token(&client).await;
    let (key, _) = decoding_key_from_jwks(&client).await;

    let mut validation = Validation::new(Algorithm::RS512);
    validation.set_audience(&["test"]);
    decode::<Value>(&first, &key, &validation).expect("first token should verify");
    decode::<Value>(&second, &key, &validation).expect("second token should verify");
}

#[rocket::async_test]
async fn test_wrong_method_on_token_returns_500() {
    setup();
    let client = test_client(Config::default()).await;

    let response = client.get("/token").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);

    let response = client.put("/token").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);
}

#[rocket::async_test]
async fn test_route_dispatch_table() {
    setup();
    let client = test_client(Config::default()).await;

    // Expected methods reach their handlers
    assert_eq!(client.post("/token").dispatch().await.status(), Status::Ok);
    assert_eq!(client.get("/jwks").dispatch().await.status(), Status::Ok);
    assert_eq!(
        client.get("/.well-known/jwks.json").dispatch().await.status(),
        Status::Ok
    );

    // Every other documented-path/method combination hits the 500 fallback
    for response in [
        client.get("/token").dispatch().await,
        client.put("/token").dispatch().await,
        client.delete("/token").dispatch().await,
        client.post("/jwks").dispatch().await,
        client.put("/jwks").dispatch().await,
        client.post("/.well-known/jwks.json").dispatch().await,
        client.patch("/.well-known/jwks.json").dispatch().await,
    ] {
        assert_eq!(response.status(), Status::InternalServerError);
    }
}
