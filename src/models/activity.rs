// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Marketing activity model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::EmissionsError;

/// Greenhouse-gas accounting scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum Scope {
    /// Scope 1
    Direct,
    /// Scope 2
    IndirectEnergy,
    /// Scope 3
    ValueChain,
}

impl Scope {
    pub fn number(self) -> u8 {
        match self {
            Scope::Direct => 1,
            Scope::IndirectEnergy => 2,
            Scope::ValueChain => 3,
        }
    }

    /// Short description shown next to the scope number.
    pub fn label(self) -> &'static str {
        match self {
            Scope::Direct => "direct emissions",
            Scope::IndirectEnergy => "indirect energy",
            Scope::ValueChain => "value chain",
        }
    }
}

impl TryFrom<i64> for Scope {
    type Error = EmissionsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Scope::Direct),
            2 => Ok(Scope::IndirectEnergy),
            3 => Ok(Scope::ValueChain),
            other => Err(EmissionsError::InvalidScope(other)),
        }
    }
}

impl From<Scope> for u8 {
    fn from(scope: Scope) -> u8 {
        scope.number()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope {} ({})", self.number(), self.label())
    }
}

/// Quantity as submitted by a client: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(f64),
    Text(String),
    /// Any other JSON value; always rejected by `parse`
    Other(serde_json::Value),
}

impl QuantityInput {
    /// Parse into a finite, non-negative quantity.
    pub fn parse(&self) -> Result<f64, EmissionsError> {
        let value = match self {
            QuantityInput::Number(n) => *n,
            QuantityInput::Text(raw) => raw.trim().parse::<f64>().map_err(|_| {
                EmissionsError::InvalidQuantity(format!("'{}' is not a number", raw))
            })?,
            QuantityInput::Other(value) => {
                return Err(EmissionsError::InvalidQuantity(format!(
                    "{} is not a number",
                    value
                )));
            }
        };

        if !value.is_finite() {
            return Err(EmissionsError::InvalidQuantity(format!(
                "{} is not a finite number",
                value
            )));
        }
        if value < 0.0 {
            return Err(EmissionsError::InvalidQuantity(format!(
                "{} is negative",
                value
            )));
        }
        Ok(value)
    }
}

impl From<f64> for QuantityInput {
    fn from(value: f64) -> Self {
        QuantityInput::Number(value)
    }
}

/// Unvalidated activity fields, as submitted for creation or produced by
/// applying an update to a stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 64))]
    pub market: String,
    #[validate(length(min = 1, max = 64))]
    pub channel: String,
    /// Raw scope number; checked by the validator.
    pub scope: i64,
    pub quantity: QuantityInput,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub activity_label: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub campaign: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Partial update of an activity. Absent fields are left as they are; an
/// empty `campaign` or `notes` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 64))]
    pub market: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub channel: Option<String>,
    pub scope: Option<i64>,
    pub quantity: Option<QuantityInput>,
    #[validate(length(max = 200))]
    pub activity_label: Option<String>,
    #[validate(length(max = 200))]
    pub campaign: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl ActivityUpdate {
    /// Whether the update sets market, channel, scope or quantity.
    pub fn names_calculation_field(&self) -> bool {
        self.market.is_some()
            || self.channel.is_some()
            || self.scope.is_some()
            || self.quantity.is_some()
    }

    /// Draft that results from applying this update to `base`.
    pub fn apply_to(&self, base: &ActivityDraft) -> ActivityDraft {
        let mut draft = base.clone();
        if let Some(date) = self.date {
            draft.date = date;
        }
        if let Some(market) = &self.market {
            draft.market = market.clone();
        }
        if let Some(channel) = &self.channel {
            draft.channel = channel.clone();
        }
        if let Some(scope) = self.scope {
            draft.scope = scope;
        }
        if let Some(quantity) = &self.quantity {
            draft.quantity = quantity.clone();
        }
        if let Some(label) = &self.activity_label {
            draft.activity_label = label.clone();
        }
        if let Some(campaign) = &self.campaign {
            draft.campaign = non_empty(campaign);
        }
        if let Some(notes) = &self.notes {
            draft.notes = non_empty(notes);
        }
        draft
    }

    /// Apply the fields that play no part in the calculation.
    pub fn apply_annotations(&self, record: &mut ActivityRecord) {
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(label) = &self.activity_label {
            record.activity_label = label.clone();
        }
        if let Some(campaign) = &self.campaign {
            record.campaign = non_empty(campaign);
        }
        if let Some(notes) = &self.notes {
            record.notes = non_empty(notes);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Stored activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRecord {
    /// Store-assigned identifier, never reused
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Day the activity ran
    pub date: NaiveDate,
    /// Country/region code
    pub market: String,
    /// Marketing channel (e.g. "email", "paid-social")
    pub channel: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "1 | 2 | 3"))]
    pub scope: Scope,
    /// Activity volume in the channel's unit
    pub quantity: f64,
    /// Activity type description
    pub activity_label: String,
    pub campaign: Option<String>,
    pub notes: Option<String>,
    /// Last successfully computed CO2e; `None` if never computed
    pub co2e_kg: Option<f64>,
    /// When `co2e_kg` was computed
    pub calculated_at: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    /// Current fields as an unvalidated draft.
    pub fn draft(&self) -> ActivityDraft {
        ActivityDraft {
            date: self.date,
            market: self.market.clone(),
            channel: self.channel.clone(),
            scope: i64::from(self.scope.number()),
            quantity: QuantityInput::Number(self.quantity),
            activity_label: self.activity_label.clone(),
            campaign: self.campaign.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Heading for the activity at 1-based `position` in a list, e.g. `#003: Spring launch`.
    pub fn title(&self, position: usize) -> String {
        format!(
            "#{:03}: {}",
            position,
            self.campaign.as_deref().unwrap_or("Log")
        )
    }

    pub fn campaign_display(&self) -> &str {
        self.campaign.as_deref().unwrap_or("-")
    }

    pub fn notes_display(&self) -> &str {
        self.notes.as_deref().unwrap_or("No notes available")
    }
}
