// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Emission factor reference data.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Scope;

/// Wire spelling of the channel-default market.
pub const ANY_MARKET: &str = "*";

/// Market selector of a factor row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FactorMarket {
    /// Applies to one market code only
    Market(String),
    /// Channel-level default, used when no market-specific row exists
    AnyMarket,
}

impl From<String> for FactorMarket {
    fn from(value: String) -> Self {
        if value == ANY_MARKET {
            FactorMarket::AnyMarket
        } else {
            FactorMarket::Market(value)
        }
    }
}

impl From<FactorMarket> for String {
    fn from(value: FactorMarket) -> Self {
        match value {
            FactorMarket::Market(code) => code,
            FactorMarket::AnyMarket => ANY_MARKET.to_string(),
        }
    }
}

impl fmt::Display for FactorMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorMarket::Market(code) => f.write_str(code),
            FactorMarket::AnyMarket => f.write_str(ANY_MARKET),
        }
    }
}

/// One row of the emission factor table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EmissionFactorEntry {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub market: FactorMarket,
    pub channel: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "1 | 2 | 3"))]
    pub scope: Scope,
    /// kg CO2e per unit of quantity
    pub factor: f64,
    /// What one unit of quantity means for this channel (e.g. "emails sent")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Country/region known to the factor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MarketInfo {
    pub code: String,
    pub name: String,
}

/// Which lookup tier produced a factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorTier {
    /// Row keyed by the exact (market, channel, scope)
    Exact,
    /// Row keyed by (*, channel, scope)
    ChannelDefault,
}

/// A factor resolved for a concrete (market, channel, scope).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFactor {
    pub market: String,
    pub channel: String,
    pub scope: Scope,
    pub factor: f64,
    pub unit: Option<String>,
    pub tier: FactorTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_market_wire_format() {
        let entry: EmissionFactorEntry = serde_json::from_str(
            r#"{"market": "*", "channel": "email", "scope": 3, "factor": 0.00005}"#,
        )
        .unwrap();
        assert_eq!(entry.market, FactorMarket::AnyMarket);
        assert_eq!(entry.unit, None);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["market"], "*");
        assert_eq!(json["scope"], 3);
    }

    #[test]
    fn test_factor_market_code_round_trips_as_string() {
        let market = FactorMarket::from("UK".to_string());
        assert_eq!(market, FactorMarket::Market("UK".to_string()));
        assert_eq!(market.to_string(), "UK");
    }
}
