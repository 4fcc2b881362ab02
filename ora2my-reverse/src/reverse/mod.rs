//! DDL synthesis: type mapping, column and constraint rendering, index routing

mod assembler;
mod banner;
mod column;
mod constraint;
mod index;
mod naming;
mod type_resolver;
mod version;
mod warning;

pub use assembler::*;
pub use banner::render_banner;
pub use column::{quote_comment, render_column};
pub use constraint::{decompose_check, DeleteRule};
pub use naming::*;
pub use type_resolver::*;
pub use version::*;
pub use warning::*;
