//! Table and grid configuration

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Input kind of an additional filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Select,
    #[default]
    Text,
    Date,
    Number,
}

impl FilterKind {
    /// Returns the input type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Select => "select",
            FilterKind::Text => "text",
            FilterKind::Date => "date",
            FilterKind::Number => "number",
        }
    }
}

/// One choice of a `select` filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Describes one filter shown in the additional-filter panel.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::{FilterDescriptor, FilterKind};
///
/// let filter = FilterDescriptor::text("username", "Username")
///     .placeholder("Filter by username...");
/// assert_eq!(filter.kind, FilterKind::Text);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Record field the filter applies to.
    pub key: String,
    /// Label shown above the input.
    pub label: String,
    /// Input kind.
    pub kind: FilterKind,
    /// Choices for `select` filters.
    #[serde(default)]
    pub options: Vec<FilterOption>,
    /// Placeholder text for free inputs.
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl FilterDescriptor {
    /// Creates a descriptor of the given kind.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            options: Vec::new(),
            placeholder: None,
        }
    }

    /// Creates a free-text filter.
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FilterKind::Text)
    }

    /// Creates a select filter with choices.
    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = FilterOption>,
    ) -> Self {
        Self {
            options: options.into_iter().collect(),
            ..Self::new(key, label, FilterKind::Select)
        }
    }

    /// Sets the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// Configuration of the data-orchestration unit.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::{FilterDescriptor, TableConfig};
///
/// let config = TableConfig::new("users-table")
///     .with_page_size(10)
///     .with_filter(FilterDescriptor::text("email", "Email"));
/// assert_eq!(config.page_size, 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    /// Namespace for persisted state.
    pub table_id: String,
    /// Rows per page.
    ///
    /// Default: 5
    pub page_size: usize,
    /// Filters offered in the additional-filter panel. When non-empty, only
    /// these keys are accepted as filter keys.
    pub additional_filters: Vec<FilterDescriptor>,
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
            additional_filters: Vec::new(),
        }
    }

    /// Sets the page size. Zero is raised to one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Adds an additional filter.
    pub fn with_filter(mut self, filter: FilterDescriptor) -> Self {
        self.additional_filters.push(filter);
        self
    }

    /// Replaces the additional filters.
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = FilterDescriptor>) -> Self {
        self.additional_filters = filters.into_iter().collect();
        self
    }

    /// Returns `true` if `key` may be used as a filter key.
    pub fn accepts_filter_key(&self, key: &str) -> bool {
        self.additional_filters.is_empty() || self.additional_filters.iter().any(|f| f.key == key)
    }
}

/// Configuration of the composed grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Orchestration settings.
    pub table: TableConfig,
    /// Whether the toolbar offers CSV export.
    ///
    /// Default: false
    pub enable_export: bool,
    /// Directory CSV downloads are written to.
    ///
    /// Default: current directory
    pub download_dir: PathBuf,
}

impl GridConfig {
    /// Creates a grid config around a table config.
    pub fn new(table: TableConfig) -> Self {
        Self {
            table,
            enable_export: false,
            download_dir: PathBuf::from("."),
        }
    }

    /// Enables or disables CSV export.
    pub fn with_export(mut self, enable: bool) -> Self {
        self.enable_export = enable;
        self
    }

    /// Sets the download directory.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }
}
