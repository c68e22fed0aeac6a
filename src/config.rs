// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fake-jwt-server project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Server configuration
//!
//! This module resolves the immutable server configuration from command-line
//! flags and environment variables. Resolution happens exactly once, before
//! the server is built; nothing mutates the resulting [`Config`] afterwards.
//!
//! Precedence for every field: explicit command-line flag, then the
//! equivalently-named environment variable, then the built-in default.

use anyhow::{ensure, Context, Result};
use chrono::Duration;
use clap::Parser;

/// Default token lifetime in minutes (100 years).
const DEFAULT_EXPIRES_IN_MINUTES: i64 = 24 * 365 * 100 * 60;

/// Command-line arguments
///
/// Every field is optional so that an unset flag can fall back to the
/// matching environment variable during [`Config::resolve`]. The defaults
/// listed in the help text are applied there, not by clap.
#[derive(Debug, Parser)]
#[command(author, version, about = "A fake JWT server", long_about = None)]
pub struct Args {
    /// The audience of the JWT token [default: test] [env: AUDIENCE]
    #[arg(long)]
    pub audience: Option<String>,

    /// The issuer of the JWT token [default: test] [env: ISSUER]
    #[arg(long)]
    pub issuer: Option<String>,

    /// The subject of the JWT token [default: test] [env: SUBJECT]
    #[arg(long)]
    pub subject: Option<String>,

    /// The id of the JWT token [default: test] [env: ID]
    #[arg(long)]
    pub id: Option<String>,

    /// The email of the JWT token [default: test@example.com] [env: EMAIL]
    #[arg(long)]
    pub email: Option<String>,

    /// The grant type of the JWT token [default: client_credentials] [env: GRANT_TYPE]
    #[arg(long)]
    pub grant_type: Option<String>,

    /// The expiration time of the JWT token in minutes [default: 52560000] [env: EXPIRES_IN_MINUTES]
    #[arg(long)]
    pub expires_in_minutes: Option<i64>,

    /// The port the server should listen on [default: 8008] [env: PORT]
    #[arg(long)]
    pub port: Option<u16>,
}

/// Immutable snapshot of the server configuration
///
/// Built once at startup and shared read-only with every request handler.
#[derive(Debug, Clone)]
pub struct Config {
    /// `iss` claim of issued tokens
    pub issuer: String,
    /// `sub` claim of issued tokens
    pub subject: String,
    /// `aud` claim of issued tokens (encoded as a one-element list)
    pub audience: String,
    /// `jti` claim of issued tokens
    pub id: String,
    /// Custom `email` claim of issued tokens
    pub email: String,
    /// Custom `grant_type` claim of issued tokens
    pub grant_type: String,
    /// Token lifetime, added to the issuance time to produce `exp`
    pub expires: Duration,
    /// TCP port the HTTP server listens on
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            issuer: "test".to_string(),
            subject: "test".to_string(),
            audience: "test".to_string(),
            id: "test".to_string(),
            email: "test@example.com".to_string(),
            grant_type: "client_credentials".to_string(),
            expires: Duration::minutes(DEFAULT_EXPIRES_IN_MINUTES),
            port: 8008,
        }
    }
}

impl Config {
    /// Resolve the configuration from parsed arguments and the process
    /// environment.
    pub fn resolve(args: &Args) -> Result<Self> {
        Self::resolve_with(args, |name| std::env::var(name).ok())
    }

    /// Resolution against an explicit environment lookup, so tests can
    /// exercise the precedence rules without touching the process
    /// environment.
    fn resolve_with<F>(args: &Args, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = match args.port {
            Some(port) => port,
            None => match env("PORT") {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid PORT value: {}", raw))?,
                None => defaults.port,
            },
        };

        let expires_in_minutes = match args.expires_in_minutes {
            Some(minutes) => minutes,
            None => match env("EXPIRES_IN_MINUTES") {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid EXPIRES_IN_MINUTES value: {}", raw))?,
                None => DEFAULT_EXPIRES_IN_MINUTES,
            },
        };
        ensure!(
            expires_in_minutes > 0,
            "token expiration must be a positive number of minutes, got {}",
            expires_in_minutes
        );

        Ok(Config {
            issuer: pick(&args.issuer, &env, "ISSUER", &defaults.issuer),
            subject: pick(&args.subject, &env, "SUBJECT", &defaults.subject),
            audience: pick(&args.audience, &env, "AUDIENCE", &defaults.audience),
            id: pick(&args.id, &env, "ID", &defaults.id),
            email: pick(&args.email, &env, "EMAIL", &defaults.email),
            grant_type: pick(&args.grant_type, &env, "GRANT_TYPE", &defaults.grant_type),
            expires: Duration::minutes(expires_in_minutes),
            port,
        })
    }
}

/// Apply flag > environment > default precedence for one string field.
fn pick<F>(flag: &Option<String>, env: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    flag.clone()
        .or_else(|| env(var))
        .unwrap_or_else(|| default.to_string())
}
