// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types: the calculation taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Calculation errors. All of them are scoped to a single activity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmissionsError {
    #[error("Invalid scope {0}: expected 1, 2 or 3")]
    InvalidScope(i64),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("No emission factor resolves for market {market}, channel {channel}, scope {scope}")]
    UnresolvableFactor {
        market: String,
        channel: String,
        scope: u8,
    },

    #[error("Emission factor not found for market {market}, channel {channel}, scope {scope}")]
    FactorNotFound {
        market: String,
        channel: String,
        scope: u8,
    },

    #[error("Calculation for activity {activity_id} was superseded")]
    StaleCalculation { activity_id: u64 },
}

impl EmissionsError {
    /// Malformed input, as opposed to missing reference data.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            EmissionsError::InvalidScope(_) | EmissionsError::InvalidQuantity(_)
        )
    }

    /// Missing reference data, whether caught by the validator or by lookup.
    pub fn is_missing_factor(&self) -> bool {
        matches!(
            self,
            EmissionsError::UnresolvableFactor { .. } | EmissionsError::FactorNotFound { .. }
        )
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Calculation(#[from] EmissionsError),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(errors.to_string()),
            ),
            AppError::Calculation(err) => {
                let (status, code) = match err {
                    EmissionsError::InvalidScope(_) => (StatusCode::BAD_REQUEST, "invalid_scope"),
                    EmissionsError::InvalidQuantity(_) => {
                        (StatusCode::BAD_REQUEST, "invalid_quantity")
                    }
                    EmissionsError::UnresolvableFactor { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "unresolvable_factor")
                    }
                    EmissionsError::FactorNotFound { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "factor_not_found")
                    }
                    EmissionsError::StaleCalculation { .. } => {
                        (StatusCode::CONFLICT, "stale_calculation")
                    }
                };
                (status, code, Some(err.to_string()))
            }
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();
        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
