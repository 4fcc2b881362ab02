//! Oracle catalog metadata consumed by the reverser

mod metadata;
mod snapshot;

pub use metadata::*;
pub use snapshot::*;
