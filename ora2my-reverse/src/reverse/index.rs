//! Index rendering and portability routing

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::naming::{quote_column_list, quote_ident, quote_table};
use super::warning::{ReverseWarning, WarningKind};
use crate::catalog::{IndexDescriptor, IndexType, KeyPart, Uniqueness};
use crate::error::{ReverseError, Result};

static QUOTED_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid quoted identifier pattern"));

/// Statements produced by one extraction pass
#[derive(Debug, Default)]
pub struct IndexExtraction {
    /// Applicable as-is
    pub portable: Vec<String>,
    /// Needs review before running on the target
    pub compatibility: Vec<String>,
    pub warnings: Vec<ReverseWarning>,
}

/// Where the rendered index statements go
pub struct IndexTarget<'a> {
    pub source_table: &'a str,
    pub schema: &'a str,
    pub table: &'a str,
}

/// Render every index of one uniqueness kind
///
/// A descriptor whose uniqueness flag differs from `expected`, whose type
/// is not NORMAL, FUNCTION-BASED NORMAL or BITMAP, or that indexes nothing
/// fails the whole table.
pub fn extract_indexes(
    target: &IndexTarget<'_>,
    indexes: &[IndexDescriptor],
    expected: Uniqueness,
) -> Result<IndexExtraction> {
    let mut out = IndexExtraction::default();
    let unique = if expected == Uniqueness::Unique { "UNIQUE " } else { "" };
    let on = quote_table(target.schema, target.table);

    for idx in indexes {
        if idx.uniqueness != expected {
            return Err(ReverseError::UniquenessMismatch {
                table: target.source_table.to_string(),
                index: idx.index_name.clone(),
                expected: expected.as_str(),
                found: idx.uniqueness.as_str(),
            });
        }

        if idx.key_parts().next().is_none() {
            return Err(ReverseError::EmptyIndex {
                table: target.source_table.to_string(),
                index: idx.index_name.clone(),
            });
        }

        let name = quote_ident(&idx.index_name);
        match &idx.index_type {
            IndexType::Normal => {
                out.portable.push(format!(
                    "CREATE {}INDEX {} ON {}({})",
                    unique,
                    name,
                    on,
                    quote_column_list(&idx.column_list)
                ));
            }
            IndexType::FunctionBasedNormal => {
                out.compatibility.push(format!(
                    "CREATE {}INDEX {} ON {}({})",
                    unique,
                    name,
                    on,
                    key_parts(idx)
                ));
                warn!(
                    "Table {} index {} is function-based, moved to compatibility output",
                    target.source_table, idx.index_name
                );
                out.warnings.push(ReverseWarning::new(
                    WarningKind::FunctionBasedIndex,
                    &idx.index_name,
                    format!("expressions: {}", idx.expressions().join(", ")),
                ));
            }
            IndexType::Bitmap => {
                out.compatibility.push(format!(
                    "CREATE {}BITMAP INDEX {} ON {}({})",
                    unique,
                    name,
                    on,
                    quote_column_list(&idx.column_list)
                ));
                warn!(
                    "Table {} index {} is a bitmap index, moved to compatibility output",
                    target.source_table, idx.index_name
                );
                out.warnings.push(ReverseWarning::new(
                    WarningKind::BitmapIndex,
                    &idx.index_name,
                    format!("columns: {}", idx.column_list.join(", ")),
                ));
            }
            IndexType::Other(index_type) => {
                return Err(ReverseError::UnsupportedIndexType {
                    table: target.source_table.to_string(),
                    index: idx.index_name.clone(),
                    index_type: index_type.clone(),
                    columns: idx.expressions().join(","),
                });
            }
        }
    }

    Ok(out)
}

/// Expression positions become `(expr)` key parts, plain positions stay quoted columns
fn key_parts(idx: &IndexDescriptor) -> String {
    idx.key_parts()
        .map(|part| match part {
            KeyPart::Expression(expr) => format!("({})", render_expression(expr)),
            KeyPart::Column(col) => quote_ident(col),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Lower-case an Oracle expression and backtick its double-quoted identifiers
fn render_expression(expr: &str) -> String {
    QUOTED_IDENTIFIER
        .replace_all(&expr.to_lowercase(), |caps: &regex::Captures<'_>| {
            format!("`{}`", caps[1].replace('`', "``"))
        })
        .into_owned()
}
