// ── Unit of measure ──

use serde::{Deserialize, Serialize};

use reportly_api::{RecordId, Resource};

use crate::tabulation::{CellValue, Tabulate};

/// A measurement unit belonging to a [`UnitCategory`](super::UnitCategory).
///
/// `scale_factor` converts a value in this unit to the category's base unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub unit_category_id: RecordId,
    pub name: String,
    pub plural: String,
    pub symbol: String,
    pub scale_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

impl Resource for Unit {
    const PATH: &'static str = "units";
    const SINGULAR: &'static str = "Unit";
    const PLURAL: &'static str = "Units";

    fn id(&self) -> Option<RecordId> {
        self.id
    }
}

impl Tabulate for Unit {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "unit_category_id",
        "name",
        "plural",
        "symbol",
        "scale_factor",
        "version",
    ];

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "id" => self.id.into(),
            "unit_category_id" => CellValue::Int(self.unit_category_id),
            "name" => self.name.as_str().into(),
            "plural" => self.plural.as_str().into(),
            "symbol" => self.symbol.as_str().into(),
            "scale_factor" => CellValue::Float(self.scale_factor),
            "version" => self.version.into(),
            _ => CellValue::Empty,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn wire_names_are_camel_case() {
        let unit = Unit {
            id: Some(4),
            unit_category_id: 2,
            name: "hectare".into(),
            plural: "hectares".into(),
            symbol: "ha".into(),
            scale_factor: 10_000.0,
            version: Some(1),
        };
        let value = serde_json::to_value(&unit).unwrap();
        assert_eq!(value["unitCategoryId"], json!(2));
        assert_eq!(value["scaleFactor"], json!(10_000.0));
    }

    #[test]
    fn search_matches_symbol() {
        let unit: Unit = serde_json::from_value(json!({
            "unitCategoryId": 1, "name": "kilogram", "plural": "kilograms",
            "symbol": "kg", "scaleFactor": 1.0
        }))
        .unwrap();
        assert!(unit.matches("kg"));
        assert!(!unit.matches("ha"));
        assert_eq!(unit.cell("id"), CellValue::Empty);
    }
}
