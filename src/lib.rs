// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Campaign-Footprint: CO2e accounting for marketing activities
//!
//! This crate logs marketing activities tagged by market, channel and
//! emissions scope, computes the CO2e footprint of each one from an
//! emission factor table, and keeps per-activity and summary figures
//! consistent as activities are edited.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::ActivityService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub activities: ActivityService,
}
