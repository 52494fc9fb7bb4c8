//! The composed grid.
//!
//! [`DataGrid`] ties a [`DataTable`] to a column layout and builds the
//! toolbar and content view-models from a [`TableSnapshot`]. Front-ends
//! send back [`ToolbarIntent`]s and [`ContentIntent`]s and act on the
//! returned [`Outcome`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::columns::Column;
use crate::columns::ColumnLayout;
use crate::config::GridConfig;
use crate::error::ExportError;
use crate::export;
use crate::model::Record;
use crate::query::FilterValue;
use crate::query::Sorting;
use crate::source::RecordSource;
use crate::storage::Slot;
use crate::storage::TableStorage;
use crate::table::DataTable;
use crate::table::TableSnapshot;

use super::content;
use super::content::ContentIntent;
use super::content::ContentState;
use super::content::ContentView;
use super::content::RowRenderer;
use super::toolbar;
use super::toolbar::ToolbarIntent;
use super::toolbar::ToolbarProps;
use super::toolbar::ToolbarView;

/// File stem of a full export.
pub const EXPORT_FILENAME: &str = "data_export";
/// File stem of a selected-rows export.
pub const EXPORT_SELECTED_FILENAME: &str = "data_export_selected";

/// A message the front-end should show to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// An export found no rows.
    NothingToExport,
    /// A bulk action ran with no loaded row selected.
    NothingSelected,
    /// Bulk delete was requested for these row ids.
    RowsDeleted(Vec<String>),
    /// Writing the CSV file failed.
    ExportFailed(String),
}

impl Alert {
    /// Text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Alert::NothingToExport => "No data to export".to_string(),
            Alert::NothingSelected => "No rows selected".to_string(),
            Alert::RowsDeleted(ids) => format!("Deleting rows: {}", ids.join(", ")),
            Alert::ExportFailed(reason) => format!("Export failed: {}", reason),
        }
    }
}

/// Result of handling an intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing for the front-end to do beyond re-rendering.
    None,
    /// Show a message.
    Alert(Alert),
    /// A CSV file was written to this path.
    Exported(PathBuf),
}

/// The composed grid: one [`DataTable`] plus column layout and content
/// state.
pub struct DataGrid {
    table: DataTable,
    layout: ColumnLayout,
    content: ContentState,
    config: GridConfig,
    renderer: Option<RowRenderer>,
}

impl DataGrid {
    /// Restores table and column state from `storage` and fetches page 1.
    pub async fn mount(
        source: impl RecordSource + 'static,
        storage: TableStorage,
        columns: Vec<Column>,
        config: GridConfig,
    ) -> Self {
        let order: Vec<String> = storage.load(Slot::ColumnOrder, Vec::new()).await;
        let visibility: BTreeMap<String, bool> =
            storage.load(Slot::ColumnVisibility, BTreeMap::new()).await;
        let layout = ColumnLayout::with_state(columns, order, visibility);
        let table = DataTable::mount(source, storage, config.table.clone()).await;

        Self {
            table,
            layout,
            content: ContentState::new(),
            config,
            renderer: None,
        }
    }

    /// Sets the renderer for expanded rows. Rows become expandable.
    pub fn with_row_renderer(
        mut self,
        renderer: impl Fn(&Record) -> String + Send + Sync + 'static,
    ) -> Self {
        self.renderer = Some(std::sync::Arc::new(renderer));
        self
    }

    /// The underlying data table.
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    /// Column order and visibility.
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// The grid configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Builds the toolbar view-model for `snapshot`.
    pub fn toolbar_view(&self, snapshot: &TableSnapshot) -> ToolbarView {
        toolbar::build(&ToolbarProps {
            snapshot,
            layout: &self.layout,
            filters: &self.config.table.additional_filters,
            enable_export: self.config.enable_export,
        })
    }

    /// Builds the content view-model for `snapshot`.
    pub fn content_view(&self, snapshot: &TableSnapshot) -> ContentView {
        content::build(snapshot, &self.layout, &self.content, self.renderer.as_ref())
    }

    /// Applies a toolbar intent.
    ///
    /// Bulk delete reports the selected loaded row ids in display order and
    /// clears the selection; deleting rows is left to the host.
    pub async fn handle_toolbar(&mut self, intent: ToolbarIntent) -> Outcome {
        match intent {
            ToolbarIntent::SetSearch(query) => {
                self.table.set_search_query(query).await;
            }
            ToolbarIntent::ToggleFilterPanel => {
                let shown = self.table.snapshot().await.show_additional_filters;
                self.table.set_show_additional_filters(!shown).await;
            }
            ToolbarIntent::FilterChanged { key, value } => {
                self.table
                    .handle_filter_change(&key, FilterValue::Text(value))
                    .await;
            }
            ToolbarIntent::Reset => {
                self.table.reset_all_filters().await;
            }
            ToolbarIntent::Export => {
                if !self.config.enable_export {
                    return Outcome::None;
                }
                return self.export().await;
            }
            ToolbarIntent::BulkDelete => {
                let ids = self.table.clear_row_selection().await;
                if ids.is_empty() {
                    return Outcome::Alert(Alert::NothingSelected);
                }
                log::info!("Bulk delete requested for {} rows", ids.len());
                return Outcome::Alert(Alert::RowsDeleted(ids));
            }
            ToolbarIntent::BulkExportSelected => {
                return self.export_selected().await;
            }
            ToolbarIntent::SetColumnVisible { id, visible } => {
                if self.layout.set_visible(&id, visible) {
                    self.table
                        .storage()
                        .save(Slot::ColumnVisibility, self.layout.visibility())
                        .await;
                }
            }
        }
        Outcome::None
    }

    /// Applies a content-area intent.
    pub async fn handle_content(&mut self, intent: ContentIntent) -> Outcome {
        match intent {
            ContentIntent::HeaderClicked(id) => {
                let sortable = self.layout.column(&id).is_some_and(|c| c.sortable);
                if sortable {
                    let current = self.table.snapshot().await.sorting;
                    let next = Sorting::cycle(current.as_ref(), &id);
                    self.table.set_sorting(next).await;
                }
            }
            ContentIntent::DragStart(id) => {
                self.content.drag_start(&id);
            }
            ContentIntent::DropOn(target) => {
                if self.content.drop_on(&target, &mut self.layout) {
                    self.table
                        .storage()
                        .save(Slot::ColumnOrder, self.layout.order())
                        .await;
                }
            }
            ContentIntent::DragEnd => self.content.drag_end(),
            ContentIntent::ToggleRowSelected(row_id) => {
                self.table.toggle_row_selected(&row_id).await;
            }
            ContentIntent::SetAllRowsSelected(selected) => {
                self.table.set_all_rows_selected(selected).await;
            }
            ContentIntent::ToggleRowExpanded(row_id) => {
                if self.renderer.is_some() {
                    self.content.toggle_expanded(&row_id);
                }
            }
            ContentIntent::SentinelVisible => {
                self.table.load_more().await;
            }
        }
        Outcome::None
    }

    /// Writes every row matching the current query to `data_export.csv`.
    pub async fn export(&self) -> Outcome {
        let records = self.table.export_data().await;
        self.write(&records, EXPORT_FILENAME)
    }

    /// Writes the selected rows to `data_export_selected.csv` and clears the
    /// selection.
    pub async fn export_selected(&self) -> Outcome {
        let records = self.table.selected_records().await;
        if records.is_empty() {
            return Outcome::Alert(Alert::NothingSelected);
        }
        let outcome = self.write(&records, EXPORT_SELECTED_FILENAME);
        self.table.clear_row_selection().await;
        outcome
    }

    fn write(&self, records: &[Record], filename: &str) -> Outcome {
        let columns: Vec<Column> = self
            .layout
            .order()
            .iter()
            .filter_map(|id| self.layout.column(id))
            .cloned()
            .collect();

        match export::write_csv(records, &columns, &self.config.download_dir, filename) {
            Ok(path) => Outcome::Exported(path),
            Err(ExportError::Empty) => Outcome::Alert(Alert::NothingToExport),
            Err(e) => {
                log::error!("Error writing export: {}", e);
                Outcome::Alert(Alert::ExportFailed(e.to_string()))
            }
        }
    }
}
