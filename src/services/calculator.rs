// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CO2e arithmetic and display formatting.

use crate::models::ResolvedFactor;
use crate::services::validate::ValidatedRecord;

/// Decimal places shown for kilograms.
pub const KG_DECIMALS: usize = 5;
/// Decimal places shown for tonnes.
pub const TONNES_DECIMALS: usize = 6;

/// CO2e in kg for a validated activity: `quantity × factor`.
///
/// The factor must have been resolved for the activity's own (market,
/// channel, scope); rows for different scopes are never interchangeable.
pub fn compute(record: &ValidatedRecord, factor: &ResolvedFactor) -> f64 {
    debug_assert_eq!(record.scope, factor.scope);
    debug_assert_eq!(record.channel, factor.channel);
    debug_assert_eq!(record.market, factor.market);

    record.quantity * factor.factor
}

pub fn kg_to_tonnes(kg: f64) -> f64 {
    kg / 1000.0
}

/// Format kg for display, e.g. `0.40000`.
pub fn format_kg(kg: f64) -> String {
    format!("{:.*}", KG_DECIMALS, kg)
}

/// Format kg as tonnes for display, e.g. `0.000400`.
pub fn format_tonnes(kg: f64) -> String {
    format!("{:.*}", TONNES_DECIMALS, kg_to_tonnes(kg))
}
