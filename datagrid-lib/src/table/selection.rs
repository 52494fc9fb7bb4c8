//! Row selection state.
//!
//! Selection is keyed by row id (the record's `id`, else its position) so
//! it stays stable while pages are appended.

use std::collections::HashSet;

use crate::model::Record;

/// Returns the row id for a record at `index` in the displayed data.
pub fn row_id(record: &Record, index: usize) -> String {
    record.id_string().unwrap_or_else(|| index.to_string())
}

/// ID-based row selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: HashSet<String>,
}

impl Selection {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Get the number of selected rows.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Clear all selection.
    /// Returns the IDs that were deselected.
    pub fn clear(&mut self) -> Vec<String> {
        self.selected.drain().collect()
    }

    /// Select or deselect one ID. Returns `true` if the selection changed.
    pub fn set(&mut self, id: &str, selected: bool) -> bool {
        if selected {
            self.selected.insert(id.to_string())
        } else {
            self.selected.remove(id)
        }
    }

    /// Toggle selection of an ID.
    /// Returns the new state of the ID.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Select or deselect every ID in `ids`.
    pub fn set_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>, selected: bool) {
        for id in ids {
            self.set(id, selected);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().map(Into::into).collect(),
        }
    }
}
