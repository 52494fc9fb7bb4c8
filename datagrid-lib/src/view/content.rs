//! Content view-model: header, rows, row expansion, column drag and the
//! infinite-scroll footer.

use std::collections::HashSet;
use std::sync::Arc;

use crate::columns::Alignment;
use crate::columns::Column;
use crate::columns::ColumnLayout;
use crate::export::cell_text;
use crate::model::Record;
use crate::query::SortDirection;
use crate::table::TableSnapshot;
use crate::table::row_id;

pub const LOADING_TEXT: &str = "Loading data...";
pub const EMPTY_TITLE: &str = "No data";
pub const EMPTY_TEXT: &str = "No data available yet";

/// Renders the expanded detail of a row.
pub type RowRenderer = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// UI-local state of the content area.
#[derive(Debug, Clone, Default)]
pub struct ContentState {
    expanded: HashSet<String>,
    dragged: Option<String>,
}

impl ContentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips a row's expansion. Returns the new state.
    pub fn toggle_expanded(&mut self, row_id: &str) -> bool {
        if self.expanded.remove(row_id) {
            false
        } else {
            self.expanded.insert(row_id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, row_id: &str) -> bool {
        self.expanded.contains(row_id)
    }

    /// Column currently being dragged.
    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    /// Starts dragging a column. The selection column cannot be dragged.
    pub fn drag_start(&mut self, column_id: &str) -> bool {
        if column_id == crate::columns::SELECT_COLUMN_ID {
            return false;
        }
        self.dragged = Some(column_id.to_string());
        true
    }

    /// Drops the dragged column on `target`. Returns `true` if the order
    /// changed. The drag ends either way.
    pub fn drop_on(&mut self, target: &str, layout: &mut ColumnLayout) -> bool {
        match self.dragged.take() {
            Some(dragged) => layout.move_column(&dragged, target),
            None => false,
        }
    }

    /// Cancels a drag.
    pub fn drag_end(&mut self) {
        self.dragged = None;
    }
}

/// What the content area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentView {
    Loading { text: &'static str },
    Empty { title: &'static str, text: String },
    Grid(GridView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RowView>,
    /// Rows have an expansion toggle column.
    pub expandable: bool,
    pub footer: Footer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub id: String,
    pub label: String,
    pub align: Alignment,
    pub sortable: bool,
    pub sorted: Option<SortDirection>,
    pub draggable: bool,
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: String,
    pub selected: bool,
    pub cells: Vec<Cell>,
    /// `Some` when rows are expandable.
    pub expanded: Option<bool>,
    /// Rendered detail of an expanded row.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Checkbox(bool),
    Text { text: String, align: Alignment },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Footer {
    FetchingMore,
    /// Reaching this marker should call `load_more`.
    Sentinel,
    Summary { shown: usize, total: usize },
}

/// User actions on the content area.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentIntent {
    HeaderClicked(String),
    DragStart(String),
    DropOn(String),
    DragEnd,
    ToggleRowSelected(String),
    SetAllRowsSelected(bool),
    ToggleRowExpanded(String),
    SentinelVisible,
}

/// Builds the content view.
pub fn build(
    snapshot: &TableSnapshot,
    layout: &ColumnLayout,
    state: &ContentState,
    renderer: Option<&RowRenderer>,
) -> ContentView {
    if snapshot.is_loading {
        return ContentView::Loading { text: LOADING_TEXT };
    }

    if snapshot.data.is_empty() {
        let text = if snapshot.search_query.is_empty() {
            EMPTY_TEXT.to_string()
        } else {
            format!("No results found for \"{}\"", snapshot.search_query)
        };
        return ContentView::Empty {
            title: EMPTY_TITLE,
            text,
        };
    }

    let columns = layout.visible_columns();
    let sorted = |column: &Column| {
        snapshot
            .sorting
            .as_ref()
            .filter(|s| s.column == column.id())
            .map(|s| s.direction)
    };

    let headers = columns
        .iter()
        .map(|column| HeaderCell {
            id: column.id().to_string(),
            label: if column.is_select() {
                String::new()
            } else {
                column.label().to_string()
            },
            align: column.align,
            sortable: column.sortable,
            sorted: sorted(*column),
            draggable: !column.is_select(),
            dragging: state.dragged() == Some(column.id()),
        })
        .collect();

    let rows = snapshot
        .data
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let id = row_id(record, index);
            let selected = snapshot.selection.is_selected(&id);
            let cells = columns
                .iter()
                .map(|column| {
                    if column.is_select() {
                        Cell::Checkbox(selected)
                    } else {
                        Cell::Text {
                            text: cell_text(column.value(record).as_ref()),
                            align: column.align,
                        }
                    }
                })
                .collect();
            let expanded = renderer.map(|_| state.is_expanded(&id));
            let detail = match (renderer, expanded) {
                (Some(render), Some(true)) => Some(render(record)),
                _ => None,
            };
            RowView {
                id,
                selected,
                cells,
                expanded,
                detail,
            }
        })
        .collect();

    let footer = if snapshot.is_fetching_next_page {
        Footer::FetchingMore
    } else if snapshot.has_more {
        Footer::Sentinel
    } else {
        Footer::Summary {
            shown: snapshot.data.len(),
            total: snapshot.total_records,
        }
    };

    ContentView::Grid(GridView {
        headers,
        rows,
        expandable: renderer.is_some(),
        footer,
    })
}
