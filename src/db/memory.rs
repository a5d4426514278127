// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory activity store.
//!
//! Records and their running summary live under one lock, so every write
//! updates both together and readers never see one without the other.

use crate::models::{ActivityRecord, AggregateSummary, RunningSummary};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    activities: BTreeMap<u64, ActivityRecord>,
    summary: RunningSummary,
}

/// Activity record store. Cheap to clone; clones share the same data.
#[derive(Clone)]
pub struct MemoryDb {
    inner: Arc<RwLock<Inner>>,
    next_id: Arc<AtomicU64>,
}

impl Default for MemoryDb {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDb {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Store a new activity under a freshly assigned id.
    ///
    /// The `id` field of `record` is ignored.
    pub async fn insert_activity(&self, mut record: ActivityRecord) -> ActivityRecord {
        record.id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut inner = self.inner.write().await;
        inner.summary.upsert(&record);
        inner.activities.insert(record.id, record.clone());

        tracing::debug!(activity_id = record.id, "Activity stored");
        record
    }

    pub async fn get_activity(&self, id: u64) -> Option<ActivityRecord> {
        self.inner.read().await.activities.get(&id).cloned()
    }

    /// All activities in id order.
    pub async fn list_activities(&self) -> Vec<ActivityRecord> {
        self.inner
            .read()
            .await
            .activities
            .values()
            .cloned()
            .collect()
    }

    /// Modify an activity in place.
    ///
    /// `apply` runs on a copy while the store is write-locked; the copy is
    /// written back only if it returns `Ok`. Returns `Ok(None)` if the
    /// activity does not exist.
    pub async fn update_activity<F, E>(
        &self,
        id: u64,
        apply: F,
    ) -> Result<Option<ActivityRecord>, E>
    where
        F: FnOnce(&mut ActivityRecord) -> Result<(), E>,
    {
        let mut inner = self.inner.write().await;
        let Some(current) = inner.activities.get(&id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        apply(&mut updated)?;
        updated.id = id;

        inner.summary.upsert(&updated);
        inner.activities.insert(id, updated.clone());
        Ok(Some(updated))
    }

    /// Remove an activity. Returns `false` if it did not exist.
    pub async fn delete_activity(&self, id: u64) -> bool {
        let mut inner = self.inner.write().await;
        let removed = inner.activities.remove(&id).is_some();
        if removed {
            inner.summary.remove(id);
            tracing::debug!(activity_id = id, "Activity deleted");
        }
        removed
    }

    // ─── Summary ─────────────────────────────────────────────────

    /// Summary maintained alongside the records.
    pub async fn summary(&self) -> AggregateSummary {
        self.inner.read().await.summary.snapshot()
    }
}
