//! Column definitions and column layout.

mod column;
mod layout;

pub use column::Accessor;
pub use column::Alignment;
pub use column::Column;
pub use column::SELECT_COLUMN_ID;
pub use layout::ColumnLayout;
pub use layout::reorder;
