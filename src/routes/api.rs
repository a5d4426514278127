// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the activity log.

use crate::error::{AppError, Result};
use crate::models::{
    ActivityDraft, ActivityRecord, ActivityUpdate, AggregateSummary, EmissionFactorEntry,
    MarketInfo,
};
use crate::services::calculator::{format_kg, format_tonnes};
use crate::services::{Co2eDisplay, RecalcOutcome};
use crate::time_utils::format_display_date;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities).post(create_activity))
        .route(
            "/api/activities/{id}",
            get(get_activity)
                .patch(update_activity)
                .delete(delete_activity),
        )
        .route("/api/summary", get(get_summary))
        .route("/api/factors", get(get_factors))
}

// ─── Activities ──────────────────────────────────────────────

/// Activity with everything the activity log shows for it.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: ActivityRecord,
    /// e.g. "#001: Spring launch"
    pub title: String,
    /// e.g. "5 Mar 2024"
    pub display_date: String,
    /// e.g. "Scope 3 (value chain)"
    pub scope_label: String,
    pub campaign_display: String,
    pub notes_display: String,
    pub emissions: Co2eDisplay,
    /// kg, 5 decimals; absent while calculating or if never computed
    pub co2e_kg_display: Option<String>,
    /// tonnes, 6 decimals
    pub co2e_tonnes_display: Option<String>,
    /// Error from the latest failed recalculation
    pub last_error: Option<String>,
}

fn activity_view(state: &AppState, activity: ActivityRecord, position: usize) -> ActivityView {
    let recalc = state.activities.recalc();
    let emissions = recalc.display(&activity);
    let (co2e_kg_display, co2e_tonnes_display) = match emissions {
        Co2eDisplay::Value(kg) => (Some(format_kg(kg)), Some(format_tonnes(kg))),
        Co2eDisplay::Calculating | Co2eDisplay::Unavailable => (None, None),
    };

    ActivityView {
        title: activity.title(position),
        display_date: format_display_date(activity.date),
        scope_label: activity.scope.to_string(),
        campaign_display: activity.campaign_display().to_string(),
        notes_display: activity.notes_display().to_string(),
        emissions,
        co2e_kg_display,
        co2e_tonnes_display,
        last_error: recalc.last_error(activity.id).map(|e| e.to_string()),
        activity,
    }
}

/// View of a single activity, numbered by its place in the full list.
async fn single_view(state: &AppState, activity: ActivityRecord) -> ActivityView {
    let position = state
        .activities
        .list_activities()
        .await
        .iter()
        .position(|a| a.id == activity.id)
        .map_or(1, |index| index + 1);
    activity_view(state, activity, position)
}

async fn list_activities(State(state): State<Arc<AppState>>) -> Json<Vec<ActivityView>> {
    let views = state
        .activities
        .list_activities()
        .await
        .into_iter()
        .enumerate()
        .map(|(index, activity)| activity_view(&state, activity, index + 1))
        .collect();
    Json(views)
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<u64>,
) -> Result<Json<ActivityView>> {
    let activity = state.activities.get_activity(activity_id).await?;
    Ok(Json(single_view(&state, activity).await))
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ActivityDraft>,
) -> Result<(StatusCode, Json<ActivityView>)> {
    draft.validate()?;

    let activity = state.activities.create_activity(&draft).await?;
    Ok((StatusCode::CREATED, Json(single_view(&state, activity).await)))
}

/// Response for an activity edit.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpdateActivityResponse {
    /// "updated", "unchanged" or "superseded"
    pub outcome: String,
    /// Current state of the activity; absent if the edit was superseded
    pub activity: Option<ActivityView>,
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<u64>,
    Json(update): Json<ActivityUpdate>,
) -> Result<Json<UpdateActivityResponse>> {
    update.validate()?;
    if update == ActivityUpdate::default() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    tracing::debug!(activity_id, ?update, "Updating activity");

    let (outcome, activity) = match state
        .activities
        .update_activity(activity_id, &update)
        .await?
    {
        RecalcOutcome::Updated { activity } => ("updated", Some(activity)),
        RecalcOutcome::Unchanged { activity } => ("unchanged", Some(activity)),
        RecalcOutcome::Superseded => ("superseded", None),
    };

    let activity = match activity {
        Some(activity) => Some(single_view(&state, activity).await),
        None => None,
    };

    Ok(Json(UpdateActivityResponse {
        outcome: outcome.to_string(),
        activity,
    }))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<u64>,
) -> Result<StatusCode> {
    state.activities.delete_activity(activity_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Summary ─────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: AggregateSummary,
    /// kg, 5 decimals
    pub total_co2e_display: String,
    /// tonnes, 6 decimals
    pub total_co2e_tonnes_display: String,
}

async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    let summary = state.activities.summary().await;
    Json(SummaryResponse {
        total_co2e_display: format_kg(summary.total_co2e_kg),
        total_co2e_tonnes_display: format_tonnes(summary.total_co2e_kg),
        summary,
    })
}

// ─── Reference Data ──────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FactorsResponse {
    pub markets: Vec<MarketInfo>,
    pub factors: Vec<EmissionFactorEntry>,
}

async fn get_factors(State(state): State<Arc<AppState>>) -> Json<FactorsResponse> {
    let table = state.activities.recalc().factors().await;
    Json(FactorsResponse {
        markets: table.markets().cloned().collect(),
        factors: table.entries().into_iter().cloned().collect(),
    })
}
