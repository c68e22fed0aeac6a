// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fake-jwt-server project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Fake JWT server library
//!
//! This library implements a mock identity provider for test environments.
//! It issues RS512-signed JSON Web Tokens with configurable claims and
//! publishes the matching public key as a JSON Web Key Set, so downstream
//! services can exercise their OAuth2/OIDC verification paths without a
//! real authentication backend.

pub mod config;
pub mod server;
