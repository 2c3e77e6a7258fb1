// reportly-core: Reactive data-access layer between reportly-api and consumers.

pub mod config;
pub mod error;
pub mod model;
pub mod notification;
pub mod service;
pub mod session;
pub mod store;
pub mod stream;
pub mod tabulation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{LogicalFailurePolicy, SessionConfig, TlsVerification};
pub use error::CoreError;
pub use notification::{Notification, NotificationKind, NotificationSink, Operation};
pub use service::{DataService, Filters};
pub use session::Session;
pub use store::{Snapshot, SubscriptionId};
pub use stream::{SnapshotStream, SnapshotWatchStream};
pub use tabulation::{CellValue, SortDirection, TablePage, Tabulate, Tabulation};

// Wire contract, so consumers need not depend on reportly-api directly.
pub use reportly_api::{RecordId, Resource, ResourceClient};

pub use model::{CoverType, Unit, UnitCategory};
