// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary statistics over a snapshot of activities.

use crate::models::{ActivityRecord, AggregateSummary};
use std::collections::HashSet;

/// Summarize the current activity set.
///
/// Every record contributes its last known CO2e, including records that are
/// being recalculated. Records with no value yet contribute zero and are
/// counted in `uncalculated_activities`. Totals are accumulated in id order,
/// independent of the order of `records`.
pub fn summarize(records: &[ActivityRecord]) -> AggregateSummary {
    let mut ordered: Vec<&ActivityRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.id);

    let mut summary = AggregateSummary::default();
    let mut channels = HashSet::new();
    let mut markets = HashSet::new();

    for record in ordered {
        summary.accumulate(&record.market, &record.channel, record.scope, record.co2e_kg);
        channels.insert(record.channel.as_str());
        markets.insert(record.market.as_str());
    }

    summary.distinct_channels = channels.len() as u32;
    summary.distinct_markets = markets.len() as u32;
    summary
}
