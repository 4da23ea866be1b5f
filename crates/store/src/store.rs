// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observable job map keyed by identity.

use fw_core::{Job, JobKey, JobKind, JobPatch};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Handle returned by [`JobStore::subscribe`]; pass to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&JobKey) + Send + Sync>;

#[derive(Default)]
struct Inner {
    jobs: IndexMap<JobKey, Job>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_listener_id: u64,
}

/// The single mutable collection of [`Job`] entities.
///
/// Reads return snapshots, never live references. Listeners fire after every
/// committed mutation with the changed identity; a mutation that leaves the
/// entry bit-identical is not committed and does not notify.
#[derive(Default)]
pub struct JobStore {
    inner: Mutex<Inner>,
    /// Per-identity async locks. Writers hold one across their whole
    /// mutation (including any backend round trip) so transitions for a
    /// single identity apply strictly in submission order.
    identity_locks: Mutex<HashMap<JobKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a job by identity. Last write wins; used by the
    /// bulk-refresh path and for `Assigned` events of unknown identity.
    pub fn upsert(&self, job: Job) {
        let key = job.key();
        let changed = {
            let mut inner = self.inner.lock();
            match inner.jobs.get(&key) {
                Some(existing) if *existing == job => false,
                _ => {
                    inner.jobs.insert(key.clone(), job);
                    true
                }
            }
        };
        if changed {
            tracing::debug!(%key, "store: upsert");
            self.notify(&key);
        }
    }

    /// Merge a partial update into an existing entry.
    ///
    /// Unknown identity is a silent no-op: an `Assigned` event for a job we
    /// do not hold arrives via `upsert`, not a patch. Returns whether the
    /// entry changed.
    pub fn apply_patch(&self, key: &JobKey, patch: &JobPatch) -> bool {
        let changed = {
            let mut inner = self.inner.lock();
            match inner.jobs.get_mut(key) {
                Some(job) => job.merge_patch(patch),
                None => {
                    tracing::debug!(%key, "store: patch for unknown identity dropped");
                    false
                }
            }
        };
        if changed {
            tracing::debug!(%key, "store: patch applied");
            self.notify(key);
        }
        changed
    }

    pub fn get(&self, key: &JobKey) -> Option<Job> {
        self.inner.lock().jobs.get(key).cloned()
    }

    pub fn contains(&self, key: &JobKey) -> bool {
        self.inner.lock().jobs.contains_key(key)
    }

    /// Snapshot of all jobs in insertion order.
    pub fn all(&self) -> Vec<Job> {
        self.inner.lock().jobs.values().cloned().collect()
    }

    /// Snapshot of all jobs of one kind.
    pub fn all_of(&self, kind: JobKind) -> Vec<Job> {
        self.inner
            .lock()
            .jobs
            .values()
            .filter(|job| job.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().jobs.is_empty()
    }

    /// Register a listener invoked with the identity of every committed
    /// mutation.
    pub fn subscribe(&self, listener: impl Fn(&JobKey) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.inner.lock();
        inner.next_listener_id += 1;
        let id = SubscriptionId(inner.next_listener_id);
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.lock().listeners.retain(|(lid, _)| *lid != id);
    }

    /// The serialization point for one identity's mutations.
    ///
    /// Writers acquire this before touching the entry and hold it across
    /// every await point of the transition, so a second transition for the
    /// same identity queues behind the first. Distinct identities never
    /// contend.
    pub fn identity_lock(&self, key: &JobKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.identity_locks.lock();
        locks.entry(key.clone()).or_default().clone()
    }

    fn notify(&self, key: &JobKey) {
        // Listeners run outside the map lock; a listener reading the store
        // back must not deadlock.
        let listeners: Vec<Listener> = {
            let inner = self.inner.lock();
            inner.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(key);
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
