// ── Tabulation ──
//
// Search, sort and paginate a snapshot for table views. Pure functions of
// (snapshot, settings): re-run on every new snapshot.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use reportly_api::Resource;

use crate::error::CoreError;

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Ordering used for sorting. Numbers compare numerically, text
    /// case-insensitively; `Empty` is handled by the caller.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (lhs, rhs) => lhs.to_string().cmp(&rhs.to_string()),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<Option<i64>> for CellValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Empty, Self::Int)
    }
}

impl From<Option<i32>> for CellValue {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Self::Empty, |v| Self::Int(i64::from(v)))
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A record type that can be rendered as a table row.
pub trait Tabulate: Resource {
    /// Column names, in display order.
    const COLUMNS: &'static [&'static str];

    /// Value of one column; unknown columns yield `CellValue::Empty`.
    fn cell(&self, column: &str) -> CellValue;

    /// Case-insensitive search over every column. `term` is lowercase.
    fn matches(&self, term: &str) -> bool {
        Self::COLUMNS
            .iter()
            .any(|column| self.cell(column).to_string().to_lowercase().contains(term))
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Table view settings: search term, sort column, page.
#[derive(Debug, Clone)]
pub struct Tabulation {
    pub search_term: Option<String>,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
}

impl Default for Tabulation {
    fn default() -> Self {
        Self {
            search_term: None,
            sort_column: None,
            sort_direction: SortDirection::Asc,
            page: 1,
            page_size: 4,
        }
    }
}

/// One page of a tabulated snapshot.
#[derive(Debug, Clone)]
pub struct TablePage<R> {
    pub rows: Vec<Arc<R>>,
    /// Number of records matching the search, across all pages.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<R> TablePage<R> {
    /// Number of pages needed for `total`; zero when `page_size` is zero.
    pub fn page_count(&self) -> usize {
        self.total.checked_div(self.page_size).map_or(0, |full| {
            full + usize::from(self.total % self.page_size != 0)
        })
    }
}

impl Tabulation {
    /// First page of `page_size` rows, unsorted, no search term.
    pub fn new(page_size: usize) -> Result<Self, CoreError> {
        if page_size == 0 {
            return Err(CoreError::Validation {
                message: "page size must be at least 1".into(),
            });
        }
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    /// Apply search, sort and pagination to a snapshot.
    pub fn apply<R: Tabulate>(&self, records: &[Arc<R>]) -> Result<TablePage<R>, CoreError> {
        if self.page_size == 0 {
            return Err(CoreError::Validation {
                message: "page size must be at least 1".into(),
            });
        }
        if self.page == 0 {
            return Err(CoreError::Validation {
                message: "pages are numbered from 1".into(),
            });
        }

        let term = self
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<Arc<R>> = records
            .iter()
            .filter(|r| term.as_deref().is_none_or(|t| r.matches(t)))
            .map(Arc::clone)
            .collect();

        if let Some(ref column) = self.sort_column {
            if !R::COLUMNS.contains(&column.as_str()) {
                return Err(CoreError::Validation {
                    message: format!(
                        "unknown column '{column}' for {}, expected one of: {}",
                        R::PLURAL,
                        R::COLUMNS.join(", ")
                    ),
                });
            }
            let descending = self.sort_direction == SortDirection::Desc;
            rows.sort_by(|a, b| {
                let (a, b) = (a.cell(column), b.cell(column));
                match (a.is_empty(), b.is_empty()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) if descending => b.compare(&a),
                    (false, false) => a.compare(&b),
                }
            });
        }

        let total = rows.len();
        let rows = rows
            .into_iter()
            .skip((self.page - 1).saturating_mul(self.page_size))
            .take(self.page_size)
            .collect();

        Ok(TablePage {
            rows,
            total,
            page: self.page,
            page_size: self.page_size,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::CoverType;

    fn cover(id: i64, code: &str, description: &str) -> Arc<CoverType> {
        Arc::new(CoverType {
            id: Some(id),
            code: code.into(),
            description: description.into(),
            version: Some(1),
        })
    }

    fn sample() -> Vec<Arc<CoverType>> {
        vec![
            cover(1, "FOR", "Forest"),
            cover(2, "GRA", "Grassland"),
            cover(3, "CRO", "Cropland"),
            cover(4, "WET", "Wetland"),
            cover(5, "SET", "Settlement"),
            cover(6, "OTH", "Other land"),
        ]
    }

    fn ids(page: &TablePage<CoverType>) -> Vec<i64> {
        page.rows.iter().filter_map(|r| r.id).collect()
    }

    #[test]
    fn default_settings_return_first_page() {
        let page = Tabulation::default().apply(&sample()).unwrap();
        assert_eq!(ids(&page), vec![1, 2, 3, 4]);
        assert_eq!(page.total, 6);
        assert_eq!(page.page_count(), 2);
    }

    #[test]
    fn search_is_case_insensitive_and_counts_matches() {
        let tab = Tabulation {
            search_term: Some("  LAND ".into()),
            ..Tabulation::default()
        };
        let page = tab.apply(&sample()).unwrap();
        assert_eq!(ids(&page), vec![2, 3, 4, 6]);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn sort_descending_by_text() {
        let tab = Tabulation {
            sort_column: Some("description".into()),
            sort_direction: SortDirection::Desc,
            page_size: 10,
            ..Tabulation::default()
        };
        let page = tab.apply(&sample()).unwrap();
        assert_eq!(ids(&page), vec![4, 5, 6, 2, 1, 3]);
    }

    #[test]
    fn empty_cells_sort_last() {
        let mut records = sample();
        records.push(Arc::new(CoverType {
            id: None,
            code: "NEW".into(),
            description: "Draft".into(),
            version: None,
        }));
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let tab = Tabulation {
                sort_column: Some("id".into()),
                sort_direction: direction,
                page_size: 10,
                ..Tabulation::default()
            };
            let page = tab.apply(&records).unwrap();
            assert_eq!(page.rows.last().unwrap().code, "NEW");
        }
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let tab = Tabulation {
            page: 5,
            ..Tabulation::default()
        };
        let page = tab.apply(&sample()).unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 6);
    }

    #[test]
    fn page_count_of_hand_built_pages() {
        let page = |total, page_size| TablePage::<CoverType> {
            rows: Vec::new(),
            total,
            page: 1,
            page_size,
        };
        assert_eq!(page(7, 3).page_count(), 3);
        assert_eq!(page(6, 3).page_count(), 2);
        assert_eq!(page(0, 3).page_count(), 0);
        assert_eq!(page(5, 0).page_count(), 0);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(matches!(
            Tabulation::new(0),
            Err(CoreError::Validation { .. })
        ));
        let zero = Tabulation {
            page_size: 0,
            ..Tabulation::default()
        };
        assert!(matches!(
            zero.apply(&sample()),
            Err(CoreError::Validation { .. })
        ));
        let page_zero = Tabulation {
            page: 0,
            ..Tabulation::new(2).unwrap()
        };
        assert!(page_zero.apply(&sample()).is_err());

        let unknown = Tabulation {
            sort_column: Some("colour".into()),
            ..Tabulation::default()
        };
        assert!(matches!(
            unknown.apply(&sample()),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn mixed_numbers_compare_numerically() {
        assert_eq!(CellValue::Int(2).compare(&CellValue::Float(1.5)), Ordering::Greater);
        assert_eq!(CellValue::Float(0.5).compare(&CellValue::Int(1)), Ordering::Less);
    }
}
