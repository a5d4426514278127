// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity input validation.

use crate::error::EmissionsError;
use crate::models::{ActivityDraft, ActivityRecord, Scope};
use crate::services::FactorTable;

/// Calculation inputs of an activity that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub market: String,
    pub channel: String,
    pub scope: Scope,
    pub quantity: f64,
}

impl ValidatedRecord {
    /// Copy the calculation inputs onto a stored record.
    pub fn apply_to(&self, record: &mut ActivityRecord) {
        record.market = self.market.clone();
        record.channel = self.channel.clone();
        record.scope = self.scope;
        record.quantity = self.quantity;
    }
}

/// Check a draft and make sure its factor resolves.
///
/// Errors: `InvalidScope`, `InvalidQuantity`, `UnresolvableFactor`.
pub fn validate(
    draft: &ActivityDraft,
    factors: &FactorTable,
) -> Result<ValidatedRecord, EmissionsError> {
    let scope = Scope::try_from(draft.scope)?;
    let quantity = draft.quantity.parse()?;

    let market = draft.market.trim();
    let channel = draft.channel.trim();

    factors
        .lookup(market, channel, scope)
        .map_err(|_| EmissionsError::UnresolvableFactor {
            market: market.to_string(),
            channel: channel.to_string(),
            scope: scope.number(),
        })?;

    Ok(ValidatedRecord {
        market: market.to_string(),
        channel: channel.to_string(),
        scope,
        quantity,
    })
}

/// Whether going from `old` to `new` changes any calculation input
/// (market, channel, scope or quantity).
pub fn calculation_inputs_changed(old: &ActivityDraft, new: &ActivityDraft) -> bool {
    old.market != new.market
        || old.channel != new.channel
        || old.scope != new.scope
        || old.quantity != new.quantity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityUpdate, QuantityInput};
    use chrono::NaiveDate;

    fn factors() -> FactorTable {
        FactorTable::load_from_json(
            r#"{"factors": [
                { "market": "UK", "channel": "email", "scope": 3, "factor": 0.00004 }
            ]}"#,
        )
        .unwrap()
    }

    fn draft(scope: i64, quantity: QuantityInput) -> ActivityDraft {
        ActivityDraft {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            market: "UK".to_string(),
            channel: "email".to_string(),
            scope,
            quantity,
            activity_label: "Newsletter".to_string(),
            campaign: None,
            notes: None,
        }
    }

    #[test]
    fn test_valid_draft() {
        let validated = validate(&draft(3, 10000.0.into()), &factors()).unwrap();
        assert_eq!(validated.scope, Scope::ValueChain);
        assert_eq!(validated.quantity, 10000.0);
        assert_eq!(validated.market, "UK");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let mut d = draft(3, 1.0.into());
        d.market = " UK ".to_string();
        let validated = validate(&d, &factors()).unwrap();
        assert_eq!(validated.market, "UK");
    }

    #[test]
    fn test_invalid_scope() {
        let err = validate(&draft(7, 10.0.into()), &factors()).unwrap_err();
        assert_eq!(err, EmissionsError::InvalidScope(7));
    }

    #[test]
    fn test_negative_quantity() {
        let err = validate(&draft(3, (-5.0).into()), &factors()).unwrap_err();
        assert!(matches!(err, EmissionsError::InvalidQuantity(_)));
    }

    #[test]
    fn test_non_numeric_quantity() {
        let err = validate(
            &draft(3, QuantityInput::Text("ten".to_string())),
            &factors(),
        )
        .unwrap_err();
        assert!(matches!(err, EmissionsError::InvalidQuantity(_)));
    }

    #[test]
    fn test_unresolvable_factor_reported_at_validation() {
        let mut d = draft(3, 10.0.into());
        d.channel = "unknown-channel".to_string();
        let err = validate(&d, &factors()).unwrap_err();
        assert_eq!(
            err,
            EmissionsError::UnresolvableFactor {
                market: "UK".to_string(),
                channel: "unknown-channel".to_string(),
                scope: 3,
            }
        );
    }

    #[test]
    fn test_annotation_edits_do_not_change_inputs() {
        let old = draft(3, 10.0.into());
        let update = ActivityUpdate {
            notes: Some("Sent to the spring list".to_string()),
            campaign: Some("Spring".to_string()),
            activity_label: Some("Promo".to_string()),
            ..Default::default()
        };
        assert!(!calculation_inputs_changed(&old, &update.apply_to(&old)));
    }

    #[test]
    fn test_each_calculation_field_is_detected() {
        let old = draft(3, 10.0.into());
        let updates = [
            ActivityUpdate {
                market: Some("DE".to_string()),
                ..Default::default()
            },
            ActivityUpdate {
                channel: Some("display".to_string()),
                ..Default::default()
            },
            ActivityUpdate {
                scope: Some(2),
                ..Default::default()
            },
            ActivityUpdate {
                quantity: Some(11.0.into()),
                ..Default::default()
            },
        ];
        for update in updates {
            assert!(calculation_inputs_changed(&old, &update.apply_to(&old)));
        }
    }

    #[test]
    fn test_resubmitting_same_value_is_not_a_change() {
        let old = draft(3, 10.0.into());
        let update = ActivityUpdate {
            quantity: Some(10.0.into()),
            scope: Some(3),
            ..Default::default()
        };
        assert!(!calculation_inputs_changed(&old, &update.apply_to(&old)));
    }
}
