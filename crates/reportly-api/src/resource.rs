// Wire contract shared by every REST resource.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Server-assigned record identifier.
pub type RecordId = i64;

/// A record type exposed under `/api/v1/<PATH>`.
///
/// `id` is `None` until the server has created the record. The labels are
/// used in notification and log texts ("Unit category", "Unit categories").
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Path segment under `/api/v1/`, e.g. `"unit_categories"`.
    const PATH: &'static str;
    /// Human-readable singular label.
    const SINGULAR: &'static str;
    /// Human-readable plural label.
    const PLURAL: &'static str;

    fn id(&self) -> Option<RecordId>;
}
