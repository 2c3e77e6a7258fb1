// ── Cover type ──

use serde::{Deserialize, Serialize};

use reportly_api::{RecordId, Resource};

use crate::tabulation::{CellValue, Tabulate};

/// A land cover classification, e.g. `FOR` / "Forest".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub code: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

impl Resource for CoverType {
    const PATH: &'static str = "cover_types";
    const SINGULAR: &'static str = "Cover type";
    const PLURAL: &'static str = "Cover types";

    fn id(&self) -> Option<RecordId> {
        self.id
    }
}

impl Tabulate for CoverType {
    const COLUMNS: &'static [&'static str] = &["id", "code", "description", "version"];

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => self.id.into(),
            "code" => self.code.as_str().into(),
            "description" => self.description.as_str().into(),
            "version" => self.version.into(),
            _ => CellValue::Empty,
        }
    }
}
