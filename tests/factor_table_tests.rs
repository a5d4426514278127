// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tests against the bundled emission factor table.

use campaign_footprint::error::EmissionsError;
use campaign_footprint::models::{FactorTier, Scope};
use campaign_footprint::services::recalc::calculate;
use campaign_footprint::services::{calculator, validate, FactorTable, FactorTableError};

mod common;
use common::{assert_close, draft};

const FACTORS_PATH: &str = "data/emission_factors.json";

fn bundled() -> FactorTable {
    FactorTable::load_from_file(FACTORS_PATH).expect("Failed to load bundled factor table")
}

#[test]
fn test_bundled_table_loads() {
    let table = bundled();
    assert!(!table.is_empty());
    assert_eq!(table.markets().count(), 8);
    assert!(table.has_market("UK"));
    assert!(!table.has_market("*"));
}

#[test]
fn test_bundled_factors_are_non_negative() {
    for entry in bundled().entries() {
        assert!(
            entry.factor.is_finite() && entry.factor >= 0.0,
            "bad factor {} for {}/{}/{}",
            entry.factor,
            entry.market,
            entry.channel,
            entry.scope
        );
    }
}

#[test]
fn test_uk_newsletter_example() {
    let table = bundled();
    let validated = validate(&draft("UK", "email", 3, 10000.0), &table).unwrap();
    let factor = table
        .lookup(&validated.market, &validated.channel, validated.scope)
        .unwrap();

    assert_eq!(factor.tier, FactorTier::Exact);
    let kg = calculator::compute(&validated, &factor);
    assert_close(kg, 0.4);
    assert_eq!(calculator::format_kg(kg), "0.40000");
    assert_eq!(calculator::format_tonnes(kg), "0.000400");
}

#[test]
fn test_exact_row_beats_channel_default() {
    let table = bundled();
    let uk = table.lookup("UK", "events", Scope::ValueChain).unwrap();
    assert_eq!(uk.tier, FactorTier::Exact);
    assert_close(uk.factor, 0.0451);

    let de = table.lookup("DE", "events", Scope::ValueChain).unwrap();
    assert_eq!(de.tier, FactorTier::ChannelDefault);
    assert_close(de.factor, 0.0512);
}

#[test]
fn test_channel_default_needs_known_market() {
    let table = bundled();
    assert!(table.lookup("FR", "print", Scope::ValueChain).is_ok());

    let err = table
        .lookup("Atlantis", "print", Scope::ValueChain)
        .unwrap_err();
    assert!(matches!(err, EmissionsError::FactorNotFound { .. }));
}

#[test]
fn test_unknown_channel_is_not_found() {
    let table = bundled();
    let err = table
        .lookup("UK", "skywriting", Scope::ValueChain)
        .unwrap_err();
    assert_eq!(
        err,
        EmissionsError::FactorNotFound {
            market: "UK".to_string(),
            channel: "skywriting".to_string(),
            scope: 3,
        }
    );
}

#[test]
fn test_wrong_scope_for_channel_is_not_found() {
    let table = bundled();
    // Email is only tabulated as a value-chain emission.
    let err = table.lookup("UK", "email", Scope::Direct).unwrap_err();
    assert!(err.is_missing_factor());
}

#[test]
fn test_missing_file() {
    let err = FactorTable::load_from_file("data/does_not_exist.json").unwrap_err();
    assert!(matches!(err, FactorTableError::IoError(_)));
}

#[test]
fn test_rejects_bad_tables() {
    let duplicate = r#"{"factors": [
        { "market": "UK", "channel": "email", "scope": 3, "factor": 0.1 },
        { "market": "UK", "channel": "email", "scope": 3, "factor": 0.2 }
    ]}"#;
    assert!(matches!(
        FactorTable::load_from_json(duplicate),
        Err(FactorTableError::DuplicateEntry { .. })
    ));

    let negative = r#"{"factors": [
        { "market": "UK", "channel": "email", "scope": 3, "factor": -0.1 }
    ]}"#;
    assert!(matches!(
        FactorTable::load_from_json(negative),
        Err(FactorTableError::InvalidFactor { .. })
    ));

    let bad_scope = r#"{"factors": [
        { "market": "UK", "channel": "email", "scope": 5, "factor": 0.1 }
    ]}"#;
    assert!(matches!(
        FactorTable::load_from_json(bad_scope),
        Err(FactorTableError::ParseError(_))
    ));
}

#[test]
fn test_overflowing_quantity_is_rejected() {
    let table = bundled();
    // Generator diesel is the largest factor in the table (> 1).
    let err = calculate(&draft("UK", "events", 1, f64::MAX), &table).unwrap_err();
    assert!(matches!(err, EmissionsError::InvalidQuantity(_)));

    let (_, kg) = calculate(&draft("UK", "events", 1, 100.0), &table).unwrap();
    assert_close(kg, 252.0);
}
