//! Structured warnings attached to a synthesized table

use serde::Serialize;
use std::fmt;

/// What needs a reviewer's attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    FunctionBasedIndex,
    BitmapIndex,
    ForeignKey,
    CheckConstraint,
    UnhandledDeleteRule,
}

/// One item routed to the compatibility script, or otherwise not carried over as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReverseWarning {
    pub kind: WarningKind,
    /// Index or constraint name as found in the catalog
    pub object: String,
    pub detail: String,
}

impl ReverseWarning {
    pub fn new(kind: WarningKind, object: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            object: object.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ReverseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} [{}]: {}", self.kind, self.object, self.detail)
    }
}
