// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-activity recalculation.
//!
//! Each activity id has a slot holding the latest issued calculation
//! generation and the latest settled one. An activity is "calculating" while
//! the two differ. Starting a calculation bumps the generation, which
//! supersedes any calculation still in flight for that id: the older one
//! finds itself stale at commit time and its result is dropped. Latest edit
//! wins.
//!
//! Commits check the generation while holding the store's write lock, so a
//! stale result can never land after a newer one.

use crate::db::MemoryDb;
use crate::error::{AppError, EmissionsError, Result};
use crate::models::{ActivityDraft, ActivityRecord, ActivityUpdate};
use crate::services::calculator::compute;
use crate::services::validate::{calculation_inputs_changed, validate, ValidatedRecord};
use crate::services::FactorTable;
use crate::time_utils::format_utc_rfc3339;
use chrono::Utc;
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Upper bound on concurrent calculations during a full refresh.
const MAX_CONCURRENT_REFRESH: usize = 16;

/// Calculation state of one activity id.
#[derive(Debug, Default)]
struct Slot {
    /// Latest generation handed out
    generation: u64,
    /// Latest generation that finished, successfully or not
    settled: u64,
    /// Error from the latest settled calculation, if it failed
    last_error: Option<EmissionsError>,
}

type Slots = Arc<DashMap<u64, Slot>>;

/// Current factor table; replaced wholesale, never mutated in place.
pub type SharedFactors = Arc<RwLock<Arc<FactorTable>>>;

/// Claim on the latest calculation for one activity.
///
/// Dropping a ticket settles it, so the calculating flag is cleared exactly
/// once per request on every path.
pub struct CalcTicket {
    activity_id: u64,
    generation: u64,
    slots: Slots,
}

impl CalcTicket {
    pub fn activity_id(&self) -> u64 {
        self.activity_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer calculation has started for this activity.
    pub fn is_current(&self) -> bool {
        self.slots
            .get(&self.activity_id)
            .is_some_and(|slot| slot.generation == self.generation)
    }

    fn settle(self, error: Option<EmissionsError>) {
        if let Some(mut slot) = self.slots.get_mut(&self.activity_id) {
            if slot.generation == self.generation {
                slot.last_error = error;
            }
        }
        // Drop does the rest.
    }
}

impl Drop for CalcTicket {
    fn drop(&mut self) {
        if let Some(mut slot) = self.slots.get_mut(&self.activity_id) {
            if slot.generation == self.generation {
                slot.settled = self.generation;
            }
        }
    }
}

/// What a recalculation request did.
#[derive(Debug, Clone, PartialEq)]
pub enum RecalcOutcome {
    /// Calculation inputs changed and the new value was stored
    Updated { activity: ActivityRecord },
    /// Only annotation fields changed; no calculation ran
    Unchanged { activity: ActivityRecord },
    /// A newer request for the same activity won; nothing was applied
    Superseded,
}

/// What to show for an activity's emissions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "co2eKg", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Co2eDisplay {
    Calculating,
    Value(f64),
    /// Never successfully computed
    Unavailable,
}

/// Outcome of recalculating every stored activity.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub updated: Vec<u64>,
    pub superseded: Vec<u64>,
    /// Skipped because an edit was in flight for them
    pub deferred: Vec<u64>,
    pub failed: Vec<(u64, EmissionsError)>,
}

/// Orchestrates recalculation of stored activities.
#[derive(Clone)]
pub struct RecalculationController {
    db: MemoryDb,
    factors: SharedFactors,
    slots: Slots,
}

impl RecalculationController {
    pub fn new(db: MemoryDb, factors: FactorTable) -> Self {
        Self {
            db,
            factors: Arc::new(RwLock::new(Arc::new(factors))),
            slots: Arc::new(DashMap::new()),
        }
    }

    // ─── Factor Table ────────────────────────────────────────────────────

    /// Snapshot of the current factor table.
    pub async fn factors(&self) -> Arc<FactorTable> {
        self.factors.read().await.clone()
    }

    /// Swap in a new factor table. Calculations already holding a snapshot
    /// finish against the old one.
    pub async fn replace_factors(&self, table: FactorTable) {
        let count = table.len();
        *self.factors.write().await = Arc::new(table);
        tracing::info!(factors = count, "Emission factor table replaced");
    }

    // ─── State ───────────────────────────────────────────────────────────

    pub fn is_calculating(&self, activity_id: u64) -> bool {
        self.slots
            .get(&activity_id)
            .is_some_and(|slot| slot.generation != slot.settled)
    }

    /// Error from the latest finished calculation of an activity, if it failed.
    pub fn last_error(&self, activity_id: u64) -> Option<EmissionsError> {
        self.slots
            .get(&activity_id)
            .and_then(|slot| slot.last_error.clone())
    }

    pub fn display(&self, record: &ActivityRecord) -> Co2eDisplay {
        if self.is_calculating(record.id) {
            return Co2eDisplay::Calculating;
        }
        match record.co2e_kg {
            Some(kg) => Co2eDisplay::Value(kg),
            None => Co2eDisplay::Unavailable,
        }
    }

    /// Drop the state of a deleted activity.
    pub fn forget(&self, activity_id: u64) {
        self.slots.remove(&activity_id);
    }

    // ─── Recalculation ───────────────────────────────────────────────────

    /// Start a calculation for an activity, superseding any in flight.
    pub fn begin(&self, activity_id: u64) -> CalcTicket {
        let mut slot = self.slots.entry(activity_id).or_default();
        slot.generation += 1;
        let generation = slot.generation;
        drop(slot);

        tracing::debug!(activity_id, generation, "Calculation started");
        self.ticket(activity_id, generation)
    }

    /// Start a calculation only if none is in flight for the activity.
    ///
    /// Check and claim happen under the slot's lock, so a background refresh
    /// can never supersede an edit that is already running.
    pub fn begin_if_idle(&self, activity_id: u64) -> Option<CalcTicket> {
        let mut slot = self.slots.entry(activity_id).or_default();
        if slot.generation != slot.settled {
            return None;
        }
        slot.generation += 1;
        let generation = slot.generation;
        drop(slot);

        tracing::debug!(activity_id, generation, "Background calculation started");
        Some(self.ticket(activity_id, generation))
    }

    fn ticket(&self, activity_id: u64, generation: u64) -> CalcTicket {
        CalcTicket {
            activity_id,
            generation,
            slots: Arc::clone(&self.slots),
        }
    }

    /// Apply an edit to an activity, recalculating its CO2e if any
    /// calculation input changed.
    ///
    /// An edit naming a calculation field always takes a ticket while
    /// another calculation is in flight, even if it matches the stored
    /// record: the in-flight request would otherwise land after it.
    ///
    /// On a calculation error the stored record is left untouched, keeping
    /// its previous CO2e.
    pub async fn recalculate(
        &self,
        activity_id: u64,
        update: &ActivityUpdate,
    ) -> Result<RecalcOutcome> {
        // Checked before reading the record: anything that starts later is
        // a newer request and may win.
        let pending = update.names_calculation_field() && self.is_calculating(activity_id);

        let current = self
            .db
            .get_activity(activity_id)
            .await
            .ok_or_else(|| activity_not_found(activity_id))?;

        let current_draft = current.draft();
        if !pending
            && !calculation_inputs_changed(&current_draft, &update.apply_to(&current_draft))
        {
            let activity = self
                .db
                .update_activity(activity_id, |record| {
                    update.apply_annotations(record);
                    Ok::<_, AppError>(())
                })
                .await?
                .ok_or_else(|| activity_not_found(activity_id))?;

            tracing::debug!(activity_id, "Annotation-only edit, no recalculation");
            return Ok(RecalcOutcome::Unchanged { activity });
        }

        let ticket = self.begin(activity_id);
        self.run(ticket, update).await
    }

    /// Carry out the calculation claimed by `ticket`, applying `update`.
    ///
    /// The record is re-read after the ticket was issued, so the edit is
    /// applied on top of whatever the previous winning request stored.
    pub async fn run(&self, ticket: CalcTicket, update: &ActivityUpdate) -> Result<RecalcOutcome> {
        let activity_id = ticket.activity_id();
        let current = self
            .db
            .get_activity(activity_id)
            .await
            .ok_or_else(|| activity_not_found(activity_id))?;

        let draft = update.apply_to(&current.draft());
        let factors = self.factors().await;

        let (validated, co2e_kg) = match calculate(&draft, &factors) {
            Ok(result) => result,
            Err(err) => {
                if !ticket.is_current() {
                    tracing::debug!(activity_id, "Superseded calculation failed; discarded");
                    return Ok(RecalcOutcome::Superseded);
                }
                if err.is_input_error() {
                    tracing::info!(activity_id, error = %err, "Recalculation rejected");
                } else {
                    tracing::warn!(activity_id, error = %err, "Recalculation failed");
                }
                ticket.settle(Some(err.clone()));
                return Err(err.into());
            }
        };

        self.commit(ticket, update, &validated, co2e_kg).await
    }

    /// Merge a computed value into the store if `ticket` is still current.
    async fn commit(
        &self,
        ticket: CalcTicket,
        update: &ActivityUpdate,
        validated: &ValidatedRecord,
        co2e_kg: f64,
    ) -> Result<RecalcOutcome> {
        let activity_id = ticket.activity_id();
        let generation = ticket.generation();
        let now = Utc::now();

        let result = self
            .db
            .update_activity(activity_id, |record| {
                if !ticket.is_current() {
                    return Err(EmissionsError::StaleCalculation { activity_id });
                }
                update.apply_annotations(record);
                validated.apply_to(record);
                record.co2e_kg = Some(co2e_kg);
                record.calculated_at = Some(now);
                Ok(())
            })
            .await;

        match result {
            Ok(Some(activity)) => {
                ticket.settle(None);
                tracing::info!(
                    activity_id,
                    generation,
                    co2e_kg,
                    calculated_at = %format_utc_rfc3339(now),
                    "Calculation committed"
                );
                Ok(RecalcOutcome::Updated { activity })
            }
            Ok(None) => Err(activity_not_found(activity_id)),
            Err(EmissionsError::StaleCalculation { .. }) => {
                tracing::debug!(activity_id, generation, "Stale calculation discarded");
                Ok(RecalcOutcome::Superseded)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Recalculate every stored activity against the current factor table.
    ///
    /// A failure affects only its own activity; everything else still runs.
    pub async fn refresh_all(&self) -> RefreshReport {
        let ids: Vec<u64> = self
            .db
            .list_activities()
            .await
            .iter()
            .map(|r| r.id)
            .collect();
        let count = ids.len();
        let report = Arc::new(Mutex::new(RefreshReport::default()));
        let no_changes = ActivityUpdate::default();

        stream::iter(ids)
            .for_each_concurrent(MAX_CONCURRENT_REFRESH, |activity_id| {
                let report = Arc::clone(&report);
                let no_changes = &no_changes;
                async move {
                    let Some(ticket) = self.begin_if_idle(activity_id) else {
                        tracing::debug!(activity_id, "Edit in flight, refresh deferred to it");
                        report.lock().await.deferred.push(activity_id);
                        return;
                    };
                    match self.run(ticket, no_changes).await {
                        Ok(RecalcOutcome::Superseded) => {
                            report.lock().await.superseded.push(activity_id)
                        }
                        Ok(_) => report.lock().await.updated.push(activity_id),
                        Err(AppError::Calculation(err)) => {
                            report.lock().await.failed.push((activity_id, err))
                        }
                        Err(e) => {
                            // Deleted while the refresh was running.
                            tracing::debug!(activity_id, error = %e, "Skipped during refresh");
                        }
                    }
                }
            })
            .await;

        let mut report = std::mem::take(&mut *report.lock().await);
        report.updated.sort_unstable();
        report.superseded.sort_unstable();
        report.deferred.sort_unstable();
        report.failed.sort_by_key(|(id, _)| *id);

        tracing::info!(
            requested = count,
            updated = report.updated.len(),
            deferred = report.deferred.len(),
            failed = report.failed.len(),
            "Recalculated all activities"
        );
        report
    }
}

/// Validate a draft and compute its CO2e against one factor table snapshot.
pub fn calculate(
    draft: &ActivityDraft,
    factors: &FactorTable,
) -> std::result::Result<(ValidatedRecord, f64), EmissionsError> {
    let validated = validate(draft, factors)?;
    let factor = factors.lookup(&validated.market, &validated.channel, validated.scope)?;
    let co2e_kg = compute(&validated, &factor);
    if !co2e_kg.is_finite() {
        return Err(EmissionsError::InvalidQuantity(format!(
            "{} is too large to calculate",
            validated.quantity
        )));
    }
    Ok((validated, co2e_kg))
}

fn activity_not_found(activity_id: u64) -> AppError {
    AppError::NotFound(format!("Activity {}", activity_id))
}
