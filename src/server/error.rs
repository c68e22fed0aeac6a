// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fake-jwt-server project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Server error taxonomy
//!
//! Key-material errors (`KeyLoad`, `JwkConstruction`, `KeySet`) can only
//! occur during startup and are fatal: the process must not begin serving
//! without valid key material. `Signing` and `ResponseSerialization` occur
//! per request; handlers log them and answer with HTTP 500 while the server
//! keeps running.

use thiserror::Error;

/// Specific errors for key handling and token issuance
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to parse embedded private key: {reason}")]
    KeyLoad { reason: String },

    #[error("failed to build JSON web key: {reason}")]
    JwkConstruction { reason: String },

    #[error("failed to build public key set: {reason}")]
    KeySet { reason: String },

    #[error("failed to sign token: {source}")]
    Signing {
        #[from]
        source: jsonwebtoken::errors::Error,
    },

    #[error("failed to serialize response: {source}")]
    ResponseSerialization {
        #[from]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_json_failure_converts_to_response_serialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ServerError::from(json_err);

        match err {
            ServerError::ResponseSerialization { .. } => {
                assert!(err.to_string().starts_with("failed to serialize response"));
            }
            other => panic!("expected ResponseSerialization, got {:?}", other),
        }
    }
}
