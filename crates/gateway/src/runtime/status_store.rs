//! The status fabric — one in-process map from prompt id to [`Status`],
//! with subscribe semantics.
//!
//! Every pipeline stage and the slide worker report progress here as sparse
//! patches; the fold itself lives on the domain type. A single mutex guards
//! the records and the subscriber registry, so patches issued in program
//! order are observed by every subscriber in that order. Subscribers are
//! unbounded senders: publishing never blocks the patching task, and a
//! closed sink drops exactly that subscriber.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use orpheus_clients::StatusServiceClient;
use orpheus_domain::status::{Status, StatusPatch};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

pub type StatusSink = mpsc::UnboundedSender<Status>;

struct Entry {
    status: Status,
    last_updated: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, Entry>,
    /// Per-prompt sinks in subscription order.
    subscribers: HashMap<Uuid, Vec<(Uuid, StatusSink)>>,
}

pub struct StatusStore {
    inner: Mutex<Inner>,
    ttl: Duration,
    /// Optional externalized status service; patches are mirrored there
    /// fire-and-forget.
    mirror: Option<Arc<StatusServiceClient>>,
}

impl StatusStore {
    pub fn new(ttl: Duration, mirror: Option<Arc<StatusServiceClient>>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
            mirror,
        }
    }

    /// Current status for a prompt; the initial record when unknown.
    /// Reading never creates state.
    pub fn get(&self, prompt_id: Uuid) -> Status {
        let inner = self.inner.lock();
        inner
            .records
            .get(&prompt_id)
            .map(|e| e.status.clone())
            .unwrap_or_default()
    }

    /// Read-modify-write under the mutex, then publish the new record to
    /// every subscriber in subscription order.
    pub fn update(&self, prompt_id: Uuid, patch: &StatusPatch) {
        {
            let mut inner = self.inner.lock();
            let entry = inner.records.entry(prompt_id).or_insert_with(|| Entry {
                status: Status::default(),
                last_updated: Utc::now(),
            });
            entry.status.apply(patch);
            entry.last_updated = Utc::now();
            let snapshot = entry.status.clone();

            if let Some(sinks) = inner.subscribers.get_mut(&prompt_id) {
                sinks.retain(|(reference, sink)| {
                    let alive = sink.send(snapshot.clone()).is_ok();
                    if !alive {
                        tracing::debug!(%prompt_id, %reference, "dropping dead status subscriber");
                    }
                    alive
                });
            }
        }

        if let Some(mirror) = &self.mirror {
            let mirror = mirror.clone();
            let patch = patch.clone();
            tokio::spawn(async move {
                if let Err(err) = mirror.update(prompt_id, &patch).await {
                    tracing::warn!(%prompt_id, %err, "status mirror update failed");
                }
            });
        }
    }

    /// Register a sink and immediately deliver the current status so late
    /// joiners are synchronized.
    pub fn subscribe(&self, prompt_id: Uuid, reference: Uuid, sink: StatusSink) {
        let mut inner = self.inner.lock();
        let current = inner
            .records
            .get(&prompt_id)
            .map(|e| e.status.clone())
            .unwrap_or_default();
        let _ = sink.send(current);
        inner
            .subscribers
            .entry(prompt_id)
            .or_default()
            .push((reference, sink));
    }

    pub fn unsubscribe(&self, prompt_id: Uuid, reference: Uuid) {
        let mut inner = self.inner.lock();
        if let Some(sinks) = inner.subscribers.get_mut(&prompt_id) {
            sinks.retain(|(r, _)| *r != reference);
            if sinks.is_empty() {
                inner.subscribers.remove(&prompt_id);
            }
        }
    }

    /// Remove records idle longer than the TTL. Returns the eviction count.
    pub fn purge_stale(&self, now: DateTime<Utc>) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.records.len();
        let ttl = self.ttl;
        inner.records.retain(|_, e| e.last_updated + ttl >= now);
        before - inner.records.len()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use orpheus_domain::slides::{SlideDraft, SlideStructure};
    use orpheus_domain::status::StepStatus;

    fn store() -> StatusStore {
        StatusStore::new(Duration::hours(24), None)
    }

    fn structure(pages: usize) -> SlideStructure {
        SlideStructure {
            pages: (1..=pages as u32)
                .map(|i| SlideDraft {
                    index: i,
                    content: String::new(),
                    layout_name: "default".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn get_unknown_returns_initial_record_without_creating_state() {
        let store = store();
        let status = store.get(Uuid::new_v4());
        assert_eq!(status, Status::default());
        assert_eq!(store.purge_stale(Utc::now() + Duration::days(2)), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_current_then_updates() {
        let store = store();
        let id = Uuid::new_v4();
        store.update(
            id,
            &StatusPatch {
                step_understanding: Some(StepStatus::Done),
                ..StatusPatch::default()
            },
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        store.subscribe(id, Uuid::new_v4(), tx);

        // Late joiner sees the state it missed first.
        let first = rx.recv().await.unwrap();
        assert_eq!(first.step_understanding, StepStatus::Done);

        store.update(
            id,
            &StatusPatch {
                step_lookup: Some(StepStatus::InProgress),
                ..StatusPatch::default()
            },
        );
        let second = rx.recv().await.unwrap();
        assert_eq!(second.step_lookup, StepStatus::InProgress);
    }

    #[tokio::test]
    async fn publication_order_matches_subscription_order() {
        let store = store();
        let id = Uuid::new_v4();

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        store.subscribe(id, Uuid::new_v4(), tx_a);
        store.subscribe(id, Uuid::new_v4(), tx_b);
        // Drain the synchronization frames.
        rx_a.recv().await.unwrap();
        rx_b.recv().await.unwrap();

        for i in 1..=3u32 {
            store.update(
                id,
                &StatusPatch {
                    step_slide_generation: Some(i),
                    ..StatusPatch::default()
                },
            );
        }
        for rx in [&mut rx_a, &mut rx_b] {
            for i in 1..=3u32 {
                assert_eq!(rx.recv().await.unwrap().step_slide_generation, i);
            }
        }
    }

    #[tokio::test]
    async fn dead_subscriber_is_dropped_others_survive() {
        let store = store();
        let id = Uuid::new_v4();

        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        store.subscribe(id, Uuid::new_v4(), tx_dead);
        store.subscribe(id, Uuid::new_v4(), tx_live);
        drop(rx_dead);
        rx_live.recv().await.unwrap();

        store.update(
            id,
            &StatusPatch {
                step_lookup: Some(StepStatus::Done),
                ..StatusPatch::default()
            },
        );
        assert_eq!(rx_live.recv().await.unwrap().step_lookup, StepStatus::Done);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let store = store();
        let id = Uuid::new_v4();
        let reference = Uuid::new_v4();

        let (tx, mut rx) = mpsc::unbounded_channel();
        store.subscribe(id, reference, tx);
        rx.recv().await.unwrap();
        store.unsubscribe(id, reference);

        store.update(
            id,
            &StatusPatch {
                step_lookup: Some(StepStatus::Done),
                ..StatusPatch::default()
            },
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn avatar_slots_track_structure_through_the_store() {
        let store = store();
        let id = Uuid::new_v4();
        store.update(
            id,
            &StatusPatch {
                slide_structure: Some(structure(3)),
                ..StatusPatch::default()
            },
        );
        assert_eq!(store.get(id).steps_avatar_generation.len(), 3);

        // Out-of-range slot patch: length unchanged, no panic.
        store.update(
            id,
            &StatusPatch::avatar_slot(
                99,
                orpheus_domain::status::AvatarElementStatus::default(),
            ),
        );
        assert_eq!(store.get(id).steps_avatar_generation.len(), 3);
    }

    #[test]
    fn ttl_evicts_only_records_past_the_deadline() {
        let store = store();
        let id = Uuid::new_v4();
        store.update(id, &StatusPatch::default());

        assert_eq!(store.purge_stale(Utc::now() + Duration::hours(23)), 0);
        assert_eq!(store.purge_stale(Utc::now() + Duration::hours(25)), 1);
        assert_eq!(store.get(id), Status::default());
    }
}
