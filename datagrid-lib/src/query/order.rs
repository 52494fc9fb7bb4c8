//! Sorting state.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;
use crate::model::relational_cmp;

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

/// The single active sort: one column and a direction.
///
/// A table holds `Option<Sorting>`; `None` means unsorted, which also makes
/// "at most one sort column" hold by construction.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::{SortDirection, Sorting};
///
/// let sorting = Sorting::desc("name");
/// assert_eq!(sorting.direction, SortDirection::Desc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorting {
    /// Field the rows are ordered by.
    pub column: String,
    /// Order direction.
    pub direction: SortDirection,
}

impl Sorting {
    /// Creates an ascending sort on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Creates a descending sort on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Compares two records by the sort column in the sort direction.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let (a, b) = (a.get(&self.column), b.get(&self.column));
        match self.direction {
            SortDirection::Asc => relational_cmp(a, b),
            SortDirection::Desc => relational_cmp(b, a),
        }
    }

    /// Advances a header-click cycle: none -> asc -> desc -> none.
    pub fn cycle(current: Option<&Sorting>, column: &str) -> Option<Sorting> {
        match current {
            Some(sorting) if sorting.column == column => match sorting.direction {
                SortDirection::Asc => Some(Sorting::desc(column)),
                SortDirection::Desc => None,
            },
            _ => Some(Sorting::asc(column)),
        }
    }
}
