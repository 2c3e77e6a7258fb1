// ── Generic reactive record collection ──
//
// The local mirror of one remote resource: an insertion-ordered map keyed
// by record id, a `watch` channel holding the last published snapshot, and
// a registry of synchronous change callbacks.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use indexmap::IndexMap;
use tokio::sync::watch;

use reportly_api::RecordId;

/// Immutable copy of a mirror at the moment it was published.
pub type Snapshot<R> = Arc<Vec<Arc<R>>>;

type Listener<R> = Arc<dyn Fn(&Snapshot<R>) + Send + Sync>;

/// Handle returned by [`on_change`](crate::DataService::on_change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A reactive mirror for a single record type.
///
/// Mutations are serialized by the emit lock: mutate, rebuild the
/// snapshot, publish it on the `watch` channel, then run the callbacks.
/// Subscribers therefore see snapshots in mutation order and never a
/// half-applied change. The mirror lock itself is released before
/// callbacks run, so a callback may read the collection or unsubscribe.
pub(crate) struct EntityCollection<R: Send + Sync + 'static> {
    mirror: Mutex<IndexMap<RecordId, Arc<R>>>,
    emit: Mutex<()>,
    snapshot: watch::Sender<Snapshot<R>>,
    listeners: DashMap<SubscriptionId, Listener<R>>,
    next_listener: AtomicU64,
}

impl<R: Send + Sync + 'static> EntityCollection<R> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            mirror: Mutex::new(IndexMap::new()),
            emit: Mutex::new(()),
            snapshot,
            listeners: DashMap::new(),
            next_listener: AtomicU64::new(1),
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the record with this id in place, or append it.
    /// Returns `true` if the id was new.
    pub(crate) fn upsert(&self, id: RecordId, record: R) -> bool {
        let _emit = relock(&self.emit);
        let (is_new, snap) = {
            let mut mirror = relock(&self.mirror);
            let is_new = mirror.insert(id, Arc::new(record)).is_none();
            (is_new, build_snapshot(&mirror))
        };
        self.publish(&snap);
        is_new
    }

    /// Replace an existing record in place. Returns `false` (and publishes
    /// nothing) when the id is not mirrored.
    pub(crate) fn replace_existing(&self, id: RecordId, record: R) -> bool {
        let _emit = relock(&self.emit);
        let snap = {
            let mut mirror = relock(&self.mirror);
            let Some(slot) = mirror.get_mut(&id) else {
                return false;
            };
            *slot = Arc::new(record);
            build_snapshot(&mirror)
        };
        self.publish(&snap);
        true
    }

    /// Remove a record, keeping the order of the others.
    pub(crate) fn remove(&self, id: RecordId) -> Option<Arc<R>> {
        let _emit = relock(&self.emit);
        let (removed, snap) = {
            let mut mirror = relock(&self.mirror);
            let removed = mirror.shift_remove(&id)?;
            (removed, build_snapshot(&mirror))
        };
        self.publish(&snap);
        Some(removed)
    }

    /// Wholesale replacement. A later duplicate id overwrites the earlier
    /// entry at the earlier position.
    pub(crate) fn replace_all(&self, records: impl IntoIterator<Item = (RecordId, R)>) {
        let _emit = relock(&self.emit);
        let snap = {
            let mut mirror = relock(&self.mirror);
            *mirror = records
                .into_iter()
                .map(|(id, record)| (id, Arc::new(record)))
                .collect();
            build_snapshot(&mirror)
        };
        self.publish(&snap);
    }

    // ── Reads ────────────────────────────────────────────────────────

    #[cfg(test)]
    pub(crate) fn contains(&self, id: RecordId) -> bool {
        relock(&self.mirror).contains_key(&id)
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<Arc<R>> {
        relock(&self.mirror).get(&id).map(Arc::clone)
    }

    /// Latest published snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot<R> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<R>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot<R>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(id, Arc::new(callback));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Broadcast a snapshot, then run the callbacks. Called with the emit
    /// lock held and the mirror lock released.
    fn publish(&self, snap: &Snapshot<R>) {
        // `send_replace` updates unconditionally, even with zero receivers.
        self.snapshot.send_replace(Arc::clone(snap));

        // Clone out of the map first so a callback can unsubscribe itself.
        let listeners: Vec<Listener<R>> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for listener in listeners {
            listener(snap);
        }
    }
}

fn build_snapshot<R>(mirror: &IndexMap<RecordId, Arc<R>>) -> Snapshot<R> {
    Arc::new(mirror.values().map(Arc::clone).collect())
}

/// A panicking callback poisons the lock; the guarded data is still intact.
fn relock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn names(col: &EntityCollection<String>) -> Vec<String> {
        col.snapshot().iter().map(|s| s.as_ref().clone()).collect()
    }

    #[test]
    fn upsert_returns_true_for_new_id() {
        let col = EntityCollection::new();
        assert!(col.upsert(1, "Forest".to_string()));
        assert!(!col.upsert(1, "Woodland".to_string()));
        assert_eq!(names(&col), ["Woodland"]);
    }

    #[test]
    fn upsert_appends_in_order() {
        let col = EntityCollection::new();
        col.upsert(3, "c".to_string());
        col.upsert(1, "a".to_string());
        col.upsert(2, "b".to_string());
        assert_eq!(names(&col), ["c", "a", "b"]);
    }

    #[test]
    fn replace_existing_keeps_position() {
        let col = EntityCollection::new();
        col.upsert(1, "a".to_string());
        col.upsert(2, "b".to_string());
        col.upsert(3, "c".to_string());

        assert!(col.replace_existing(2, "B".to_string()));
        assert_eq!(names(&col), ["a", "B", "c"]);
    }

    #[test]
    fn replace_missing_publishes_nothing() {
        let col = EntityCollection::new();
        col.upsert(1, "a".to_string());
        let rx = col.subscribe();

        assert!(!col.replace_existing(9, "z".to_string()));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(names(&col), ["a"]);
    }

    #[test]
    fn remove_shifts_remaining_records() {
        let col = EntityCollection::new();
        col.upsert(1, "a".to_string());
        col.upsert(2, "b".to_string());
        col.upsert(3, "c".to_string());

        assert_eq!(*col.remove(1).unwrap(), "a");
        assert_eq!(names(&col), ["b", "c"]);
        assert!(col.remove(1).is_none());
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn replace_all_discards_previous_state() {
        let col = EntityCollection::new();
        col.upsert(1, "old".to_string());

        col.replace_all([(5, "x".to_string()), (6, "y".to_string())]);
        assert_eq!(names(&col), ["x", "y"]);
        assert!(!col.contains(1));
        assert_eq!(*col.get(6).unwrap(), "y");
    }

    #[test]
    fn replace_all_collapses_duplicate_ids() {
        let col = EntityCollection::new();
        col.replace_all([
            (1, "first".to_string()),
            (2, "two".to_string()),
            (1, "again".to_string()),
        ]);
        assert_eq!(names(&col), ["again", "two"]);
    }

    #[test]
    fn old_snapshots_are_immutable() {
        let col = EntityCollection::new();
        col.upsert(1, "a".to_string());
        let before = col.snapshot();

        col.upsert(2, "b".to_string());
        assert_eq!(before.len(), 1);
        assert_eq!(col.snapshot().len(), 2);
    }

    #[test]
    fn callbacks_run_once_per_publish() {
        let col = EntityCollection::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = col.on_change(move |snap: &Snapshot<String>| {
            seen.fetch_add(1, Ordering::SeqCst);
            assert!(!snap.is_empty());
        });

        col.upsert(1, "a".to_string());
        col.upsert(2, "b".to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(col.unsubscribe(id));
        col.upsert(3, "c".to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!col.unsubscribe(id));
    }

    #[test]
    fn subscription_ids_are_unique() {
        let col: EntityCollection<String> = EntityCollection::new();
        let a = col.on_change(|_| {});
        let b = col.on_change(|_| {});
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "sub-1");
    }
}
