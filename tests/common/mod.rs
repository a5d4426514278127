// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use campaign_footprint::config::Config;
use campaign_footprint::db::MemoryDb;
use campaign_footprint::models::{ActivityDraft, QuantityInput};
use campaign_footprint::routes::create_router;
use campaign_footprint::services::{ActivityService, FactorTable, RecalculationController};
use campaign_footprint::AppState;
use chrono::NaiveDate;
use std::sync::Arc;

/// Small factor table used across the integration tests.
pub const TEST_FACTORS: &str = r#"{
    "markets": [
        { "code": "UK", "name": "United Kingdom" },
        { "code": "DE", "name": "Germany" }
    ],
    "factors": [
        { "market": "UK", "channel": "email", "scope": 3, "factor": 0.00004, "unit": "emails sent" },
        { "market": "UK", "channel": "email", "scope": 2, "factor": 0.0001 },
        { "market": "UK", "channel": "paid-social", "scope": 3, "factor": 0.0016 },
        { "market": "DE", "channel": "display", "scope": 3, "factor": 0.002 },
        { "market": "*", "channel": "print", "scope": 3, "factor": 0.919 }
    ]
}"#;

#[allow(dead_code)]
pub fn test_factors() -> FactorTable {
    FactorTable::load_from_json(TEST_FACTORS).expect("Test factor table should parse")
}

/// Create an activity service backed by a fresh in-memory store.
#[allow(dead_code)]
pub fn test_service() -> ActivityService {
    let db = MemoryDb::new();
    let recalc = RecalculationController::new(db.clone(), test_factors());
    ActivityService::new(db, recalc)
}

#[allow(dead_code)]
pub fn draft(market: &str, channel: &str, scope: i64, quantity: f64) -> ActivityDraft {
    ActivityDraft {
        date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        market: market.to_string(),
        channel: channel.to_string(),
        scope,
        quantity: QuantityInput::Number(quantity),
        activity_label: "Test activity".to_string(),
        campaign: None,
        notes: None,
    }
}

/// Create a test app with an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::default(),
        activities: test_service(),
    });

    (create_router(state.clone()), state)
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body should be JSON")
}

#[allow(dead_code)]
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1e-12);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}
