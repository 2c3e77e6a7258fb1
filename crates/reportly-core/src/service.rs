// ── Data-access service ──
//
// One service per resource type: wraps the remote CRUD client, keeps the
// local mirror in step with every successful call, and reports each remote
// call on the shared notification sink exactly once.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use reportly_api::{RecordId, Resource, ResourceClient};

use crate::config::LogicalFailurePolicy;
use crate::error::CoreError;
use crate::notification::{NotificationSink, Operation};
use crate::store::{EntityCollection, Snapshot, SubscriptionId};
use crate::stream::SnapshotStream;

/// Query parameters for a bulk fetch, e.g. `{"unitCategoryId": "2"}`.
pub type Filters = BTreeMap<String, String>;

/// Reactive CRUD front for one remote resource.
///
/// `Send + Sync`; share it through `Arc` or a [`Session`](crate::Session).
/// Concurrent calls apply their results in network-return order.
pub struct DataService<R: Resource> {
    client: ResourceClient<R>,
    collection: EntityCollection<R>,
    notifications: NotificationSink,
    policy: LogicalFailurePolicy,
}

impl<R: Resource> DataService<R> {
    /// Create a service with an empty mirror.
    pub fn new(
        client: ResourceClient<R>,
        notifications: NotificationSink,
        policy: LogicalFailurePolicy,
    ) -> Self {
        Self {
            client,
            collection: EntityCollection::new(),
            notifications,
            policy,
        }
    }

    // ── Remote operations ────────────────────────────────────────────

    /// Create a record. The server's copy (with id and version) is
    /// appended to the mirror and returned.
    pub async fn create(&self, record: &R) -> Result<R, CoreError> {
        let created = match self.client.create(record).await {
            Ok(created) => created,
            Err(e) => return Err(self.remote_failure(Operation::Create, e)),
        };

        let Some(id) = created.id() else {
            let text = format!(
                "{} record creation failed: server returned a record without an id",
                R::SINGULAR
            );
            warn!(resource = R::PATH, "created record has no id");
            self.notifications
                .error(Operation::Create, R::PLURAL, text.clone());
            return Err(CoreError::Internal(text));
        };

        self.collection.upsert(id, created.clone());
        debug!(resource = R::PATH, id, "record created");
        self.notifications.success(
            Operation::Create,
            R::PLURAL,
            format!("{} record created", R::SINGULAR),
        );
        Ok(created)
    }

    /// Fetch one record; replaces the mirrored copy in place or appends it.
    pub async fn fetch_one(&self, id: RecordId) -> Result<R, CoreError> {
        let record = match self.client.get(id).await {
            Ok(record) => record,
            Err(e) => return Err(self.remote_failure(Operation::FetchOne, e)),
        };

        let is_new = self
            .collection
            .upsert(record.id().unwrap_or(id), record.clone());
        debug!(resource = R::PATH, id, is_new, "record retrieved");
        self.notifications.success(
            Operation::FetchOne,
            R::PLURAL,
            format!("{} record retrieved", R::SINGULAR),
        );
        Ok(record)
    }

    /// Fetch every record matching `filters`. The mirror is replaced
    /// wholesale with the server's sequence, never merged. A listing with a
    /// missing or repeated id is rejected and leaves the mirror untouched.
    pub async fn fetch_all(&self, filters: &Filters) -> Result<Vec<R>, CoreError> {
        let records = match self.client.list(filters).await {
            Ok(records) => records,
            Err(e) => return Err(self.remote_failure(Operation::FetchAll, e)),
        };

        let mut keyed: IndexMap<RecordId, R> = IndexMap::with_capacity(records.len());
        for record in &records {
            let problem = match record.id() {
                None => Some("a record without an id".to_owned()),
                Some(id) if keyed.contains_key(&id) => Some(format!("duplicate id {id}")),
                Some(id) => {
                    keyed.insert(id, record.clone());
                    None
                }
            };
            if let Some(problem) = problem {
                let text = format!(
                    "{} records retrieval failed: server returned {problem}",
                    R::PLURAL
                );
                warn!(resource = R::PATH, %problem, "malformed record listing");
                self.notifications
                    .error(Operation::FetchAll, R::PLURAL, text.clone());
                return Err(CoreError::Internal(text));
            }
        }

        self.collection.replace_all(keyed);
        debug!(resource = R::PATH, count = records.len(), "records retrieved");
        self.notifications.success(
            Operation::FetchAll,
            R::PLURAL,
            format!("{} records retrieved", R::PLURAL),
        );
        Ok(records)
    }

    /// Update a record that carries an id.
    ///
    /// If the server accepts the update but the record is not mirrored,
    /// an Error notification is sent, the mirror is left alone, and the
    /// outcome follows the [`LogicalFailurePolicy`].
    pub async fn update(&self, record: &R) -> Result<R, CoreError> {
        let Some(requested) = record.id() else {
            return Err(CoreError::Validation {
                message: format!("{} record has no id and cannot be updated", R::SINGULAR),
            });
        };

        let updated = match self.client.update(record).await {
            Ok(updated) => updated,
            Err(e) => return Err(self.remote_failure(Operation::Update, e)),
        };

        let id = updated.id().unwrap_or(requested);
        if !self.collection.replace_existing(id, updated.clone()) {
            self.cache_desync(Operation::Update, id);
            return match self.policy {
                LogicalFailurePolicy::Reject => Err(CoreError::CacheDesync {
                    resource: R::PLURAL.to_owned(),
                    id,
                }),
                LogicalFailurePolicy::Resolve => Ok(updated),
            };
        }

        debug!(resource = R::PATH, id, "record updated");
        self.notifications.success(
            Operation::Update,
            R::PLURAL,
            format!("{} record updated", R::SINGULAR),
        );
        Ok(updated)
    }

    /// Delete a record; returns the row count acknowledged by the server.
    ///
    /// The mirror entry is removed only for a count of exactly 1.
    pub async fn delete(&self, id: RecordId) -> Result<u64, CoreError> {
        let count = match self.client.delete(id).await {
            Ok(count) => count,
            Err(e) => return Err(self.remote_failure(Operation::Delete, e)),
        };

        if count != 1 {
            warn!(resource = R::PATH, id, count, "unexpected delete count");
            self.notifications.error(
                Operation::Delete,
                R::PLURAL,
                format!(
                    "{} record deletion failed: expected 1 record to be deleted, got {count}",
                    R::SINGULAR
                ),
            );
            return match self.policy {
                LogicalFailurePolicy::Reject => Err(CoreError::UnexpectedDeleteCount {
                    resource: R::SINGULAR.to_owned(),
                    id,
                    count,
                }),
                LogicalFailurePolicy::Resolve => Ok(count),
            };
        }

        if self.collection.remove(id).is_none() {
            self.cache_desync(Operation::Delete, id);
            return match self.policy {
                LogicalFailurePolicy::Reject => Err(CoreError::CacheDesync {
                    resource: R::PLURAL.to_owned(),
                    id,
                }),
                LogicalFailurePolicy::Resolve => Ok(count),
            };
        }

        debug!(resource = R::PATH, id, "record deleted");
        self.notifications.success(
            Operation::Delete,
            R::PLURAL,
            format!("{} record deleted", R::SINGULAR),
        );
        Ok(count)
    }

    // ── Local reads ──────────────────────────────────────────────────

    /// The latest broadcast snapshot.
    pub fn current_snapshot(&self) -> Snapshot<R> {
        self.collection.snapshot()
    }

    pub fn subscribe(&self) -> SnapshotStream<R> {
        SnapshotStream::new(self.collection.subscribe())
    }

    /// Register a callback run synchronously after every broadcast.
    /// The callback must not mutate this service.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot<R>) + Send + Sync + 'static,
    {
        self.collection.on_change(callback)
    }

    /// Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.collection.unsubscribe(id)
    }

    pub fn get(&self, id: RecordId) -> Option<Arc<R>> {
        self.collection.get(id)
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failure_policy(&self) -> LogicalFailurePolicy {
        self.policy
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn remote_failure(&self, operation: Operation, err: reportly_api::Error) -> CoreError {
        warn!(resource = R::PATH, %operation, error = %err, "remote call failed");
        let label = match operation {
            Operation::Create => format!("{} record creation", R::SINGULAR),
            Operation::FetchOne => format!("{} record retrieval", R::SINGULAR),
            Operation::FetchAll => format!("{} records retrieval", R::PLURAL),
            Operation::Update => format!("{} record update", R::SINGULAR),
            Operation::Delete => format!("{} record deletion", R::SINGULAR),
        };
        self.notifications
            .error(operation, R::PLURAL, format!("{label} failed: {err}"));
        CoreError::from_api(err, R::SINGULAR)
    }

    fn cache_desync(&self, operation: Operation, id: RecordId) {
        warn!(resource = R::PATH, %operation, id, "record missing from local cache");
        self.notifications.error(
            operation,
            R::PLURAL,
            format!("{} local cache update failed: record {id} is missing", R::PLURAL),
        );
    }
}
