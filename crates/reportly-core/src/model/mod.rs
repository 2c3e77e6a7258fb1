// ── Reporting domain model ──
//
// One struct per REST resource. Each implements `Resource` (wire contract)
// and `Tabulate` (table columns). Field names follow the server's
// camelCase JSON; `id` and `version` are assigned by the server.

pub mod cover_type;
pub mod unit;
pub mod unit_category;

pub use cover_type::CoverType;
pub use unit::Unit;
pub use unit_category::UnitCategory;
