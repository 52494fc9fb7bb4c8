//! Error types

mod export;
mod fetch;
mod storage;

pub use export::*;
pub use fetch::*;
pub use storage::*;
