// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use campaign_footprint::error::{AppError, EmissionsError};

fn unresolvable() -> EmissionsError {
    EmissionsError::UnresolvableFactor {
        market: "UK".to_string(),
        channel: "skywriting".to_string(),
        scope: 3,
    }
}

#[test]
fn test_input_errors_are_bad_requests() {
    let err = AppError::from(EmissionsError::InvalidScope(0));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let err = AppError::from(EmissionsError::InvalidQuantity("-1".to_string()));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_missing_factors_are_unprocessable() {
    assert_eq!(
        AppError::from(unresolvable()).status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let err = AppError::from(EmissionsError::FactorNotFound {
        market: "UK".to_string(),
        channel: "email".to_string(),
        scope: 1,
    });
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn test_other_statuses() {
    let err = AppError::from(EmissionsError::StaleCalculation { activity_id: 7 });
    assert_eq!(err.status(), StatusCode::CONFLICT);

    assert_eq!(
        AppError::NotFound("Activity 7".to_string()).status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::BadRequest("No fields to update".to_string()).status(),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn test_error_classification() {
    assert!(EmissionsError::InvalidScope(9).is_input_error());
    assert!(!EmissionsError::InvalidScope(9).is_missing_factor());
    assert!(unresolvable().is_missing_factor());
    assert!(!unresolvable().is_input_error());
    assert!(!EmissionsError::StaleCalculation { activity_id: 1 }.is_input_error());
}

#[test]
fn test_calculation_error_message_passes_through() {
    let err = AppError::from(EmissionsError::InvalidScope(4));
    assert_eq!(err.to_string(), "Invalid scope 4: expected 1, 2 or 3");
}
