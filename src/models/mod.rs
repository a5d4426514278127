// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod factor;
pub mod stats;

pub use activity::{ActivityDraft, ActivityRecord, ActivityUpdate, QuantityInput, Scope};
pub use factor::{EmissionFactorEntry, FactorMarket, FactorTier, MarketInfo, ResolvedFactor};
pub use stats::{AggregateSummary, RunningSummary};
