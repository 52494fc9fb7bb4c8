//! Presentation view-models.
//!
//! Each component is a pure builder from state to a view struct plus an
//! intent enum the front-end sends back. [`DataGrid`] composes them around
//! a [`DataTable`](crate::table::DataTable).

pub mod content;
mod grid;
pub mod toolbar;

pub use content::ContentIntent;
pub use content::ContentState;
pub use content::ContentView;
pub use content::RowRenderer;
pub use grid::Alert;
pub use grid::DataGrid;
pub use grid::Outcome;
pub use toolbar::ToolbarIntent;
pub use toolbar::ToolbarView;
