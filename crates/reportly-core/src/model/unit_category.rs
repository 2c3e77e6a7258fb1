// ── Unit category ──

use serde::{Deserialize, Serialize};

use reportly_api::{RecordId, Resource};

use crate::tabulation::{CellValue, Tabulate};

/// A group of measurement units, e.g. "Area" or "Mass".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

impl Resource for UnitCategory {
    const PATH: &'static str = "unit_categories";
    const SINGULAR: &'static str = "Unit category";
    const PLURAL: &'static str = "Unit categories";

    fn id(&self) -> Option<RecordId> {
        self.id
    }
}

impl Tabulate for UnitCategory {
    const COLUMNS: &'static [&'static str] = &["id", "name", "version"];

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "version" => self.version.into(),
            _ => CellValue::Empty,
        }
    }
}
