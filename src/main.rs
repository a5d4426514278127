// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campaign-Footprint API Server
//!
//! Logs marketing activities and reports the CO2e footprint of each one
//! and of the whole activity set.

use anyhow::Context;
use campaign_footprint::{
    config::Config,
    db::MemoryDb,
    services::{ActivityService, FactorTable, RecalculationController},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Campaign-Footprint API");

    // Load emission factors
    tracing::info!(path = %config.factors_path.display(), "Loading emission factors");
    let factors = FactorTable::load_from_file(&config.factors_path)
        .context("Failed to load emission factors")?;
    tracing::info!(
        factors = factors.len(),
        markets = factors.markets().count(),
        "Emission factors loaded"
    );

    // Activity store and recalculation controller share the same records
    let db = MemoryDb::new();
    let recalc = RecalculationController::new(db.clone(), factors);
    let activities = ActivityService::new(db, recalc);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        activities,
    });

    // Build router
    let app = campaign_footprint::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("campaign_footprint=debug,info")),
        )
        .with(format)
        .init();
}
