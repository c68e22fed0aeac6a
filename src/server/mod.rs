// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fake-jwt-server project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTTP server and request handlers
//!
//! The server owns the long-lived artifacts produced once at startup: the
//! signing key, the JSON Web Key and the serialized public key set. All of
//! them are read-only after construction and shared across concurrent
//! requests through Rocket's managed state, so the hot path needs no
//! locking.

pub mod error;
pub mod keys;
pub mod token;

use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::EncodingKey;
use log::{error, info, warn};
use rocket::figment::Figment;
use rocket::http::{ContentType, Method, Status};
use rocket::route::{Handler, Outcome, Route};
use rocket::{get, post, routes, Build, Data, Request, Rocket, State};
use rsa::pkcs1::EncodeRsaPrivateKey;

use crate::config::Config;
use error::ServerError;
use token::TokenResponse;

/// The fake identity provider
///
/// Constructed once before the HTTP server starts. Construction performs
/// the entire startup-fatal sequence: key loading, JWK derivation and
/// public key set serialization. If any step fails the process must not
/// begin serving.
pub struct FakeJwtServer {
    /// RS512 signing key, derived from the embedded private key
    signing_key: EncodingKey,
    /// JWK advertising the verification key; source of the `kid` header
    json_web_key: Jwk,
    /// Public key set, serialized once and served verbatim on every
    /// discovery request
    public_key_set_body: String,
    /// Immutable configuration snapshot
    config: Config,
}

impl FakeJwtServer {
    pub fn new(config: Config) -> Result<Self, ServerError> {
        let private_key = keys::load_private_key()?;
        let json_web_key = keys::create_json_web_key(&private_key)?;
        let public_key_set = keys::create_public_key_set(&json_web_key)?;
        let public_key_set_body =
            serde_json::to_string_pretty(&public_key_set).map_err(|err| ServerError::KeySet {
                reason: format!("failed to serialize key set: {}", err),
            })?;

        let der = private_key
            .to_pkcs1_der()
            .map_err(|err| ServerError::KeyLoad {
                reason: format!("failed to re-encode private key: {}", err),
            })?;
        let signing_key = EncodingKey::from_rsa_der(der.as_bytes());

        Ok(FakeJwtServer {
            signing_key,
            json_web_key,
            public_key_set_body,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Token issuance endpoint
///
/// `POST /token`
///
/// Returns a freshly signed bearer token wrapped in a JSON envelope.
/// Signing or serialization failures are logged and answered with 500; the
/// server keeps accepting further requests.
#[post("/token")]
pub async fn issue_token(server: &State<FakeJwtServer>) -> Result<(ContentType, String), Status> {
    info!("handle token request");

    let access_token = server.create_json_web_token().map_err(|err| {
        error!("failed to create json web token: {}", err);
        Status::InternalServerError
    })?;

    let response = TokenResponse {
        message: "Successfully created token".to_string(),
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: server.config.expires.num_seconds(),
    };
    let body = serde_json::to_string_pretty(&response).map_err(|err| {
        error!("{}", ServerError::from(err));
        Status::InternalServerError
    })?;

    Ok((ContentType::JSON, body))
}

/// Key discovery endpoint
///
/// `GET /jwks`
///
/// Serves the key set serialized at startup, byte-for-byte identical on
/// every request and on both discovery paths.
#[get("/jwks")]
pub async fn jwks(server: &State<FakeJwtServer>) -> (ContentType, String) {
    info!("handle jwks request");
    (ContentType::JSON, server.public_key_set_body.clone())
}

/// Key discovery endpoint at the OIDC well-known path
///
/// `GET /.well-known/jwks.json`
#[get("/.well-known/jwks.json")]
pub async fn well_known_jwks(server: &State<FakeJwtServer>) -> (ContentType, String) {
    jwks(server).await
}

/// Fallback handler answering 500 on the documented paths for any method
/// the endpoint does not expect. The original server responded 500 rather
/// than 405 and existing callers depend on that status, so the quirk is
/// preserved.
#[derive(Clone)]
struct WrongMethod;

#[rocket::async_trait]
impl Handler for WrongMethod {
    async fn handle<'r>(&self, request: &'r Request<'_>, _data: Data<'r>) -> Outcome<'r> {
        warn!(
            "unexpected method {} for {}",
            request.method(),
            request.uri().path()
        );
        Outcome::from(request, Status::InternalServerError)
    }
}

/// Rank of the wrong-method fallback routes. Far below the attribute
/// routes, so a fallback only fires when no expected-method route matched.
const FALLBACK_RANK: isize = 20;

/// Low-rank fallback routes covering every documented path with the
/// methods it does not handle.
fn wrong_method_routes() -> Vec<Route> {
    let methods = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Head,
    ];

    let mut fallbacks = Vec::new();
    for path in ["/token", "/jwks", "/.well-known/jwks.json"] {
        for method in methods {
            fallbacks.push(Route::ranked(FALLBACK_RANK, method, path, WrongMethod));
        }
    }
    fallbacks
}

/// Assemble the Rocket instance: the three endpoints, the wrong-method
/// fallbacks and the shared server state.
pub fn build_rocket(figment: Figment, server: FakeJwtServer) -> Rocket<Build> {
    rocket::custom(figment)
        .mount("/", routes![issue_token, jwks, well_known_jwks])
        .mount("/", wrong_method_routes())
        .manage(server)
}
