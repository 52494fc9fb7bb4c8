//! Data model types

mod coerce;
mod record;

pub use coerce::*;
pub use record::Record;
