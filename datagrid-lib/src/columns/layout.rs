//! Column order and visibility.

use std::collections::BTreeMap;
use std::collections::HashSet;

use super::Column;
use super::SELECT_COLUMN_ID;

/// Moves `dragged` to the original index of `target`.
///
/// Returns `None` when nothing should change: the ids are equal, either id
/// is missing from `order`, or either is the selection column.
///
/// ```
/// use datagrid_lib::columns::reorder;
///
/// let order: Vec<String> = ["select", "a", "b", "c"].iter().map(|s| s.to_string()).collect();
/// let moved = reorder(&order, "c", "a").unwrap();
/// assert_eq!(moved, ["select", "c", "a", "b"]);
/// ```
pub fn reorder(order: &[String], dragged: &str, target: &str) -> Option<Vec<String>> {
    if dragged == target || dragged == SELECT_COLUMN_ID || target == SELECT_COLUMN_ID {
        return None;
    }
    let from = order.iter().position(|id| id == dragged)?;
    let to = order.iter().position(|id| id == target)?;

    let mut next = order.to_vec();
    let id = next.remove(from);
    next.insert(to, id);
    Some(next)
}

/// Declared columns plus the user's order and visibility choices.
///
/// The order is always a permutation of the declared column ids, with the
/// selection column (when declared) pinned first. Visibility records only
/// explicit choices; columns without an entry are visible.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    columns: Vec<Column>,
    order: Vec<String>,
    visibility: BTreeMap<String, bool>,
}

impl ColumnLayout {
    /// Creates a layout in declared order with every column visible.
    pub fn new(columns: Vec<Column>) -> Self {
        Self::with_state(columns, Vec::new(), BTreeMap::new())
    }

    /// Creates a layout from persisted order and visibility.
    ///
    /// Unknown and duplicate ids are dropped, missing ids are appended in
    /// declared order, and the selection column moves to the front.
    pub fn with_state(
        columns: Vec<Column>,
        order: Vec<String>,
        mut visibility: BTreeMap<String, bool>,
    ) -> Self {
        let declared: Vec<String> = columns.iter().map(|c| c.id().to_string()).collect();
        let known: HashSet<&str> = declared.iter().map(String::as_str).collect();

        let mut seen = HashSet::new();
        let mut reconciled: Vec<String> = order
            .into_iter()
            .filter(|id| known.contains(id.as_str()) && seen.insert(id.clone()))
            .collect();
        for id in &declared {
            if !seen.contains(id) {
                reconciled.push(id.clone());
            }
        }
        if let Some(pos) = reconciled.iter().position(|id| id == SELECT_COLUMN_ID) {
            let select = reconciled.remove(pos);
            reconciled.insert(0, select);
        }

        visibility.retain(|id, _| {
            columns
                .iter()
                .any(|c| c.id() == id && c.hideable)
        });

        Self {
            columns,
            order: reconciled,
            visibility,
        }
    }

    /// Declared columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns a declared column by id.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id() == id)
    }

    /// Current column order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Explicit visibility choices.
    pub fn visibility(&self) -> &BTreeMap<String, bool> {
        &self.visibility
    }

    /// Returns `true` if the column is shown.
    pub fn is_visible(&self, id: &str) -> bool {
        self.visibility.get(id).copied().unwrap_or(true)
    }

    /// Shows or hides a hideable column. Returns `true` if anything changed.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        let hideable = self.column(id).is_some_and(|c| c.hideable);
        if !hideable || self.is_visible(id) == visible {
            return false;
        }
        self.visibility.insert(id.to_string(), visible);
        true
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        self.order
            .iter()
            .filter(|id| self.is_visible(id))
            .filter_map(|id| self.column(id))
            .collect()
    }

    /// Columns listed in the visibility menu, in display order.
    pub fn hideable_columns(&self) -> Vec<&Column> {
        self.order
            .iter()
            .filter_map(|id| self.column(id))
            .filter(|c| c.hideable)
            .collect()
    }

    /// Moves `dragged` onto `target`'s position. Returns `true` if the order
    /// changed.
    pub fn move_column(&mut self, dragged: &str, target: &str) -> bool {
        match reorder(&self.order, dragged, target) {
            Some(order) => {
                self.order = order;
                true
            }
            None => false,
        }
    }
}
