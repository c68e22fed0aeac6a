// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the fake-jwt-server project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the fake JWT server

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rocket::config::LogLevel;

use fake_jwt_server::config::{Args, Config};
use fake_jwt_server::server::{build_rocket, FakeJwtServer};

#[rocket::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::resolve(&args)?;
    let server = FakeJwtServer::new(config.clone())
        .context("failed to initialize signing key material")?;

    info!("fake JWT server listening on port {}", config.port);
    let figment = rocket::Config::figment()
        .merge((
            "ident",
            format!("FakeJwtServer/{}", env!("CARGO_PKG_VERSION")),
        ))
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.port))
        .merge(("keep_alive", 120u32))
        .merge(("log_level", LogLevel::Normal));

    let rocket = build_rocket(figment, server);
    let rocket = rocket.ignite().await?;
    let _rocket = rocket.launch().await?;

    Ok(())
}
