// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fake-jwt-server project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Claim assembly and token signing
//!
//! Each call builds a fresh claim set from the configuration and a single
//! wall-clock reading, then signs it with the cached RS512 key. Nothing is
//! cached between calls: two invocations in the same second produce
//! independently signed tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use serde::{Deserialize, Serialize};

use super::error::ServerError;
use super::FakeJwtServer;

/// Claims carried by every issued token
///
/// Registered claims per RFC 7519 plus the two custom claims the original
/// callers rely on (`grant_type` and `email`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Issuer
    pub iss: String,

    /// Subject
    pub sub: String,

    /// Audience. Always a one-element list even though a single audience is
    /// configured, so verifiers expecting an array succeed.
    pub aud: Vec<String>,

    /// Expiration timestamp (seconds since Unix epoch)
    pub exp: i64,

    /// Not-before timestamp. Backdated by one day to tolerate small clock
    /// skew among verifiers.
    pub nbf: i64,

    /// Issued-at timestamp
    pub iat: i64,

    /// JWT ID
    pub jti: String,

    /// OAuth grant type the token pretends to result from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub grant_type: String,

    /// Email of the pretend token owner
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

/// Response body of the token-issuance endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub message: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl FakeJwtServer {
    /// Build the claim set and produce a signed compact JWT string.
    ///
    /// All three time claims derive from the same clock reading. A signing
    /// failure is per-request: the caller answers 500 and the server keeps
    /// serving.
    pub fn create_json_web_token(&self) -> Result<String, ServerError> {
        let now = Utc::now();
        let claims = TokenClaims {
            iss: self.config.issuer.clone(),
            sub: self.config.subject.clone(),
            aud: vec![self.config.audience.clone()],
            exp: (now + self.config.expires).timestamp(),
            nbf: (now - Duration::days(1)).timestamp(),
            iat: now.timestamp(),
            jti: self.config.id.clone(),
            grant_type: self.config.grant_type.clone(),
            email: self.config.email.clone(),
        };

        let mut header = Header::new(Algorithm::RS512);
        header.kid = self.json_web_key.common.key_id.clone();

        Ok(encode(&header, &claims, &self.signing_key)?)
    }
}
