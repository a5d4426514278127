// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity logging service.
//!
//! Handles the activity lifecycle:
//! 1. Validate the submitted fields and resolve the emission factor
//! 2. Compute CO2e
//! 3. Store the record (the store's running summary updates with it)
//! 4. Route later edits through the recalculation controller

use crate::db::MemoryDb;
use crate::error::{AppError, Result};
use crate::models::{ActivityDraft, ActivityRecord, ActivityUpdate, AggregateSummary};
use crate::services::recalc::{calculate, RecalcOutcome, RecalculationController};
use chrono::Utc;

/// Create, edit and remove activities.
#[derive(Clone)]
pub struct ActivityService {
    db: MemoryDb,
    recalc: RecalculationController,
}

impl ActivityService {
    pub fn new(db: MemoryDb, recalc: RecalculationController) -> Self {
        Self { db, recalc }
    }

    pub fn recalc(&self) -> &RecalculationController {
        &self.recalc
    }

    /// Log a new activity.
    ///
    /// Nothing is stored if validation or factor lookup fails.
    pub async fn create_activity(&self, draft: &ActivityDraft) -> Result<ActivityRecord> {
        let factors = self.recalc.factors().await;
        let (validated, co2e_kg) = calculate(draft, &factors).map_err(|e| {
            tracing::info!(market = %draft.market, channel = %draft.channel, error = %e, "Activity rejected");
            AppError::from(e)
        })?;

        let record = ActivityRecord {
            id: 0,
            date: draft.date,
            market: validated.market,
            channel: validated.channel,
            scope: validated.scope,
            quantity: validated.quantity,
            activity_label: draft.activity_label.clone(),
            campaign: draft.campaign.clone().filter(|c| !c.trim().is_empty()),
            notes: draft.notes.clone().filter(|n| !n.trim().is_empty()),
            co2e_kg: Some(co2e_kg),
            calculated_at: Some(Utc::now()),
        };

        let stored = self.db.insert_activity(record).await;
        tracing::info!(
            activity_id = stored.id,
            market = %stored.market,
            channel = %stored.channel,
            scope = stored.scope.number(),
            co2e_kg,
            "Activity logged"
        );
        Ok(stored)
    }

    pub async fn get_activity(&self, activity_id: u64) -> Result<ActivityRecord> {
        self.db
            .get_activity(activity_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Activity {}", activity_id)))
    }

    pub async fn list_activities(&self) -> Vec<ActivityRecord> {
        self.db.list_activities().await
    }

    /// Apply an edit, recalculating only when a calculation input changed.
    pub async fn update_activity(
        &self,
        activity_id: u64,
        update: &ActivityUpdate,
    ) -> Result<RecalcOutcome> {
        self.recalc.recalculate(activity_id, update).await
    }

    pub async fn delete_activity(&self, activity_id: u64) -> Result<()> {
        if !self.db.delete_activity(activity_id).await {
            return Err(AppError::NotFound(format!("Activity {}", activity_id)));
        }
        self.recalc.forget(activity_id);
        tracing::info!(activity_id, "Activity deleted");
        Ok(())
    }

    /// Summary of all stored activities.
    pub async fn summary(&self) -> AggregateSummary {
        self.db.summary().await
    }
}
