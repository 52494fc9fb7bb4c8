//! Toolbar view-model: search, filter panel, bulk actions, export and
//! column visibility.

use crate::columns::ColumnLayout;
use crate::config::FilterDescriptor;
use crate::config::FilterKind;
use crate::config::FilterOption;
use crate::table::TableSnapshot;

pub const SEARCH_PLACEHOLDER: &str = "Search data...";
pub const EXPORT_LABEL: &str = "Export CSV";
pub const EXPORTING_LABEL: &str = "Exporting...";
pub const ALL_OPTION_LABEL: &str = "All";

/// Inputs of the toolbar.
pub struct ToolbarProps<'a> {
    pub snapshot: &'a TableSnapshot,
    pub layout: &'a ColumnLayout,
    pub filters: &'a [FilterDescriptor],
    pub enable_export: bool,
}

/// Everything the toolbar shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarView {
    pub search: SearchBox,
    /// Present only when filter descriptors exist.
    pub filter_toggle: Option<FilterToggle>,
    pub record_count: usize,
    /// Present only when rows are selected.
    pub bulk_actions: Option<BulkActions>,
    /// Present only when export is enabled.
    pub export_button: Option<ExportButton>,
    pub column_menu: Vec<ColumnMenuItem>,
    /// Present when the panel is toggled on and filter descriptors exist.
    pub filter_panel: Option<Vec<FilterField>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchBox {
    pub value: String,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterToggle {
    /// Panel is open.
    pub pressed: bool,
    /// Number of filled-in filters, when any.
    pub badge: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkActions {
    pub selected: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportButton {
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMenuItem {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterField {
    pub key: String,
    pub label: String,
    pub input: FilterInput,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterInput {
    /// Dropdown; the first option is "all" with an empty value.
    Select {
        value: String,
        options: Vec<FilterOption>,
    },
    Input {
        kind: FilterKind,
        value: String,
        placeholder: Option<String>,
    },
}

/// User actions on the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarIntent {
    SetSearch(String),
    ToggleFilterPanel,
    FilterChanged { key: String, value: String },
    Reset,
    Export,
    BulkDelete,
    BulkExportSelected,
    SetColumnVisible { id: String, visible: bool },
}

/// Builds the toolbar view.
pub fn build(props: &ToolbarProps<'_>) -> ToolbarView {
    let snapshot = props.snapshot;
    let has_filters = !props.filters.is_empty();

    let filter_toggle = has_filters.then(|| {
        let filled = snapshot.filters.non_empty_count();
        FilterToggle {
            pressed: snapshot.show_additional_filters,
            badge: (filled > 0).then_some(filled),
        }
    });

    let selected = snapshot.selected_row_ids().len();
    let bulk_actions = (selected > 0).then_some(BulkActions { selected });

    let export_button = props.enable_export.then(|| ExportButton {
        label: if snapshot.is_exporting {
            EXPORTING_LABEL
        } else {
            EXPORT_LABEL
        },
        disabled: snapshot.is_exporting,
    });

    let column_menu = props
        .layout
        .hideable_columns()
        .into_iter()
        .map(|column| ColumnMenuItem {
            id: column.id().to_string(),
            label: column.label().to_string(),
            checked: props.layout.is_visible(column.id()),
        })
        .collect();

    let filter_panel = (has_filters && snapshot.show_additional_filters).then(|| {
        props
            .filters
            .iter()
            .map(|descriptor| filter_field(descriptor, snapshot))
            .collect()
    });

    ToolbarView {
        search: SearchBox {
            value: snapshot.search_query.clone(),
            placeholder: SEARCH_PLACEHOLDER,
        },
        filter_toggle,
        record_count: snapshot.total_records,
        bulk_actions,
        export_button,
        column_menu,
        filter_panel,
    }
}

fn filter_field(descriptor: &FilterDescriptor, snapshot: &TableSnapshot) -> FilterField {
    let value = snapshot
        .filters
        .get(&descriptor.key)
        .filter(|v| v.is_active())
        .map(|v| v.to_string())
        .unwrap_or_default();

    let input = if descriptor.kind == FilterKind::Select && !descriptor.options.is_empty() {
        let mut options = vec![FilterOption::new("", ALL_OPTION_LABEL)];
        options.extend(descriptor.options.iter().cloned());
        FilterInput::Select { value, options }
    } else {
        FilterInput::Input {
            kind: descriptor.kind,
            value,
            placeholder: descriptor.placeholder.clone(),
        }
    };

    FilterField {
        key: descriptor.key.clone(),
        label: descriptor.label.clone(),
        input,
    }
}
