// ── Reactive record store ──
//
// Local mirrors with push-based change notification.

mod collection;

pub(crate) use collection::EntityCollection;
pub use collection::{Snapshot, SubscriptionId};
