//! Column definition types.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::model::Record;

/// Identifier of the leading row-selection column.
pub const SELECT_COLUMN_ID: &str = "select";

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// How a column reads its value from a record.
#[derive(Clone)]
pub enum Accessor {
    /// Reads a field by name.
    Key(String),
    /// Computes the value from the whole record.
    Custom(Arc<dyn Fn(&Record) -> Value + Send + Sync>),
    /// Display-only column (selection, actions); has no value.
    None,
}

impl Accessor {
    /// Reads the value for a record, `None` for a missing field or a
    /// display-only column.
    pub fn read(&self, record: &Record) -> Option<Value> {
        match self {
            Accessor::Key(key) => record.get(key).cloned(),
            Accessor::Custom(f) => Some(f(record)),
            Accessor::None => None,
        }
    }

    /// Returns the field name for key accessors.
    pub fn key(&self) -> Option<&str> {
        match self {
            Accessor::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Accessor::Custom(_) => f.write_str("Custom(..)"),
            Accessor::None => f.write_str("None"),
        }
    }
}

/// Column configuration supplied by the host.
///
/// # Examples
///
/// ```
/// use datagrid_lib::columns::{Alignment, Column};
///
/// let columns = vec![
///     Column::select(),
///     Column::new("name").header("Name").sortable(),
///     Column::new("email").header("Email"),
///     Column::new("id").header("ID").align(Alignment::Right),
/// ];
/// assert_eq!(columns[1].id(), "name");
/// ```
#[derive(Debug, Clone)]
pub struct Column {
    id: String,
    header: Option<String>,
    accessor: Accessor,
    /// Whether header clicks change the sort.
    pub sortable: bool,
    /// Whether the column appears in the visibility menu.
    pub hideable: bool,
    /// Horizontal alignment of cell content.
    pub align: Alignment,
}

impl Column {
    /// Creates a column that reads `key`; the key is also the column id.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            id: key.clone(),
            header: None,
            accessor: Accessor::Key(key),
            sortable: false,
            hideable: true,
            align: Alignment::Left,
        }
    }

    /// Creates a column with a computed value.
    pub fn custom(
        id: impl Into<String>,
        accessor: impl Fn(&Record) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: None,
            accessor: Accessor::Custom(Arc::new(accessor)),
            sortable: false,
            hideable: true,
            align: Alignment::Left,
        }
    }

    /// Creates a display-only column with no value.
    pub fn display(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: None,
            accessor: Accessor::None,
            sortable: false,
            hideable: true,
            align: Alignment::Left,
        }
    }

    /// The leading row-selection column. It cannot be hidden, sorted or
    /// dragged.
    pub fn select() -> Self {
        Self {
            hideable: false,
            align: Alignment::Center,
            ..Self::display(SELECT_COLUMN_ID)
        }
    }

    /// Sets the header label.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Makes the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Keeps the column out of the visibility menu.
    pub fn always_visible(mut self) -> Self {
        self.hideable = false;
        self
    }

    /// Sets the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Returns the column id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the accessor.
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// Returns `true` for the row-selection column.
    pub fn is_select(&self) -> bool {
        self.id == SELECT_COLUMN_ID
    }

    /// Header label: the explicit header, else the accessor key, else the id.
    pub fn label(&self) -> &str {
        self.header
            .as_deref()
            .or_else(|| self.accessor.key())
            .unwrap_or(&self.id)
    }

    /// Returns `true` if the column yields a value for records.
    pub fn has_accessor(&self) -> bool {
        !matches!(self.accessor, Accessor::None)
    }

    /// Reads this column's value from a record.
    pub fn value(&self, record: &Record) -> Option<Value> {
        self.accessor.read(record)
    }
}
