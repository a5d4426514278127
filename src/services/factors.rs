// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emission factor table loading and lookup.

use crate::error::EmissionsError;
use crate::models::{
    EmissionFactorEntry, FactorMarket, FactorTier, MarketInfo, ResolvedFactor, Scope,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

type FactorKey = (FactorMarket, String, Scope);

/// On-disk layout of the factor table.
#[derive(Deserialize)]
struct FactorFile {
    #[serde(default)]
    markets: Vec<MarketInfo>,
    factors: Vec<EmissionFactorEntry>,
}

/// Immutable emission factor table.
///
/// Lookup goes through two explicit tiers: the exact `(market, channel,
/// scope)` row, then the channel default `(*, channel, scope)`. The market
/// itself must always be known. Nothing ever resolves to an implicit zero.
#[derive(Debug, Default, Clone)]
pub struct FactorTable {
    markets: BTreeMap<String, MarketInfo>,
    entries: HashMap<FactorKey, EmissionFactorEntry>,
}

impl FactorTable {
    /// Load the table from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, FactorTableError> {
        let json_data = fs::read_to_string(path.as_ref())
            .map_err(|e| FactorTableError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the table from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, FactorTableError> {
        let file: FactorFile = serde_json::from_str(json_data)
            .map_err(|e| FactorTableError::ParseError(e.to_string()))?;

        let table = Self::from_parts(file.markets, file.factors)?;
        tracing::info!(
            markets = table.markets.len(),
            factors = table.entries.len(),
            "Loaded emission factor table"
        );
        Ok(table)
    }

    /// Build a table from market metadata and factor rows.
    ///
    /// Markets referenced by a row but missing from `markets` are added with
    /// their code as the display name.
    pub fn from_parts(
        markets: Vec<MarketInfo>,
        factors: Vec<EmissionFactorEntry>,
    ) -> Result<Self, FactorTableError> {
        let mut table = Self {
            markets: markets.into_iter().map(|m| (m.code.clone(), m)).collect(),
            entries: HashMap::with_capacity(factors.len()),
        };

        for entry in factors {
            if !entry.factor.is_finite() || entry.factor < 0.0 {
                return Err(FactorTableError::InvalidFactor {
                    market: entry.market.to_string(),
                    channel: entry.channel,
                    scope: entry.scope.number(),
                    factor: entry.factor,
                });
            }

            if let FactorMarket::Market(code) = &entry.market {
                table
                    .markets
                    .entry(code.clone())
                    .or_insert_with(|| MarketInfo {
                        code: code.clone(),
                        name: code.clone(),
                    });
            }

            let key = (entry.market.clone(), entry.channel.clone(), entry.scope);
            if table.entries.contains_key(&key) {
                return Err(FactorTableError::DuplicateEntry {
                    market: entry.market.to_string(),
                    channel: entry.channel,
                    scope: entry.scope.number(),
                });
            }
            table.entries.insert(key, entry);
        }

        Ok(table)
    }

    /// Resolve the factor for `(market, channel, scope)`.
    pub fn lookup(
        &self,
        market: &str,
        channel: &str,
        scope: Scope,
    ) -> Result<ResolvedFactor, EmissionsError> {
        let not_found = || EmissionsError::FactorNotFound {
            market: market.to_string(),
            channel: channel.to_string(),
            scope: scope.number(),
        };

        if !self.has_market(market) {
            return Err(not_found());
        }

        let exact = (
            FactorMarket::Market(market.to_string()),
            channel.to_string(),
            scope,
        );
        let fallback = (FactorMarket::AnyMarket, channel.to_string(), scope);

        let (entry, tier) = if let Some(entry) = self.entries.get(&exact) {
            (entry, FactorTier::Exact)
        } else if let Some(entry) = self.entries.get(&fallback) {
            (entry, FactorTier::ChannelDefault)
        } else {
            return Err(not_found());
        };

        Ok(ResolvedFactor {
            market: market.to_string(),
            channel: channel.to_string(),
            scope,
            factor: entry.factor,
            unit: entry.unit.clone(),
            tier,
        })
    }

    pub fn has_market(&self, market: &str) -> bool {
        self.markets.contains_key(market)
    }

    /// Known markets, ordered by code.
    pub fn markets(&self) -> impl Iterator<Item = &MarketInfo> {
        self.markets.values()
    }

    /// All rows in a stable order (market, channel, scope).
    pub fn entries(&self) -> Vec<&EmissionFactorEntry> {
        let mut entries: Vec<&EmissionFactorEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            (&a.market, &a.channel, a.scope).cmp(&(&b.market, &b.channel, b.scope))
        });
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors from loading a factor table.
#[derive(Debug, thiserror::Error)]
pub enum FactorTableError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse factor table: {0}")]
    ParseError(String),

    #[error("Duplicate factor for market {market}, channel {channel}, scope {scope}")]
    DuplicateEntry {
        market: String,
        channel: String,
        scope: u8,
    },

    #[error("Invalid factor {factor} for market {market}, channel {channel}, scope {scope}")]
    InvalidFactor {
        market: String,
        channel: String,
        scope: u8,
        factor: f64,
    },
}
