// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity summary statistics.
//!
//! `AggregateSummary` is always derived from the current record set. The
//! store keeps a `RunningSummary` next to its records so the dashboard can
//! read totals without listing every activity; it keeps exact integer
//! indexes incrementally and folds the CO2e totals from per-activity
//! contributions in id order, so it never drifts from a recomputation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{ActivityRecord, Scope};

/// Summary of the current activity set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AggregateSummary {
    // ─── Counts ──────────────────────────────────────────────────
    pub total_activities: u32,
    pub distinct_channels: u32,
    pub distinct_markets: u32,
    /// Activities with no computed value yet (they contribute zero)
    pub uncalculated_activities: u32,

    // ─── CO2e ────────────────────────────────────────────────────
    /// Sum of every activity's current CO2e (kg)
    pub total_co2e_kg: f64,
    /// CO2e per scope number (kg)
    pub co2e_by_scope: BTreeMap<u8, f64>,
    /// CO2e per channel (kg)
    pub co2e_by_channel: BTreeMap<String, f64>,
    /// CO2e per market (kg)
    pub co2e_by_market: BTreeMap<String, f64>,
}

impl AggregateSummary {
    /// Add one activity's current value to the CO2e totals.
    ///
    /// Callers must feed activities in ascending id order for the result to
    /// be reproducible bit for bit.
    pub(crate) fn accumulate(
        &mut self,
        market: &str,
        channel: &str,
        scope: Scope,
        co2e_kg: Option<f64>,
    ) {
        self.total_activities += 1;

        let Some(value) = co2e_kg else {
            self.uncalculated_activities += 1;
            return;
        };

        self.total_co2e_kg += value;
        *self.co2e_by_scope.entry(scope.number()).or_insert(0.0) += value;
        *self
            .co2e_by_channel
            .entry(channel.to_string())
            .or_insert(0.0) += value;
        *self
            .co2e_by_market
            .entry(market.to_string())
            .or_insert(0.0) += value;
    }
}

/// What one activity currently contributes to the summary.
#[derive(Debug, Clone, PartialEq)]
struct Contribution {
    market: String,
    channel: String,
    scope: Scope,
    co2e_kg: Option<f64>,
}

impl From<&ActivityRecord> for Contribution {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            market: record.market.clone(),
            channel: record.channel.clone(),
            scope: record.scope,
            co2e_kg: record.co2e_kg,
        }
    }
}

/// Incrementally maintained summary, updated with every store write.
#[derive(Debug, Clone, Default)]
pub struct RunningSummary {
    contributions: BTreeMap<u64, Contribution>,
    /// Activity count per channel
    channel_counts: HashMap<String, u32>,
    /// Activity count per market
    market_counts: HashMap<String, u32>,
}

impl RunningSummary {
    /// Record the current state of an activity.
    ///
    /// Returns `true` if the activity was not tracked before.
    pub fn upsert(&mut self, record: &ActivityRecord) -> bool {
        let previous = self
            .contributions
            .insert(record.id, Contribution::from(record));

        if let Some(old) = &previous {
            decrement(&mut self.channel_counts, &old.channel);
            decrement(&mut self.market_counts, &old.market);
        }
        *self
            .channel_counts
            .entry(record.channel.clone())
            .or_insert(0) += 1;
        *self
            .market_counts
            .entry(record.market.clone())
            .or_insert(0) += 1;

        previous.is_none()
    }

    /// Stop tracking an activity. Returns `false` if it was not tracked.
    pub fn remove(&mut self, id: u64) -> bool {
        match self.contributions.remove(&id) {
            Some(old) => {
                decrement(&mut self.channel_counts, &old.channel);
                decrement(&mut self.market_counts, &old.market);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> AggregateSummary {
        let mut summary = AggregateSummary::default();
        for c in self.contributions.values() {
            summary.accumulate(&c.market, &c.channel, c.scope, c.co2e_kg);
        }
        summary.distinct_channels = self.channel_counts.len() as u32;
        summary.distinct_markets = self.market_counts.len() as u32;
        summary
    }
}

fn decrement(counts: &mut HashMap<String, u32>, key: &str) {
    if let Some(count) = counts.get_mut(key) {
        *count -= 1;
        if *count == 0 {
            counts.remove(key);
        }
    }
}
