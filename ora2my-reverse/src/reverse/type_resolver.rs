//! Oracle to MySQL column type mapping

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::catalog::ColumnDescriptor;
use crate::config::OverrideRules;
use crate::error::{ReverseError, Result};

/// Numeric attributes of a column, parsed from catalog text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeAttributes {
    pub length: i64,
    pub precision: i64,
    pub scale: i64,
}

/// Which tier produced the final type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    BuiltIn,
    Plan,
    Custom,
}

/// Result of resolving one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Oracle display type that override rules are matched against, e.g. `NUMBER(10)`
    pub origin: String,
    /// Built-in MySQL mapping
    pub builtin: String,
    /// Type written to the DDL
    pub target: String,
    pub source: TypeSource,
}

/// Mapping strategy for one Oracle type name
#[derive(Debug, Clone, Copy)]
enum Strategy {
    /// Always the same MySQL type
    Fixed(&'static str),
    /// NUMBER precision/scale branching
    Number,
    /// Fixed width below 256, variable width above
    Character {
        fixed: &'static str,
        varying: &'static str,
    },
    /// Variable width of the same length
    Varying(&'static str),
    /// Sized target, but the origin is displayed without its length
    Unsized(&'static str),
    /// BINARY below 256, VARBINARY above
    Raw,
    /// FLOAT without precision stays FLOAT, otherwise DOUBLE
    Float,
    /// DECIMAL with or without (p,s)
    Decimal,
    /// NUMERIC always displays (p,s)
    Numeric,
}

static TYPE_MAP: LazyLock<HashMap<&'static str, Strategy>> = LazyLock::new(build_type_map);

fn build_type_map() -> HashMap<&'static str, Strategy> {
    use Strategy::*;

    HashMap::from([
        ("NUMBER", Number),
        ("CHAR", Character { fixed: "CHAR", varying: "VARCHAR" }),
        ("CHARACTER", Character { fixed: "CHARACTER", varying: "VARCHAR" }),
        ("NCHAR", Character { fixed: "NCHAR", varying: "NVARCHAR" }),
        ("VARCHAR2", Varying("VARCHAR")),
        ("VARCHAR", Varying("VARCHAR")),
        ("NVARCHAR2", Varying("NVARCHAR")),
        ("NCHAR VARYING", Unsized("NCHAR VARYING")),
        ("UROWID", Unsized("VARCHAR")),
        ("RAW", Raw),
        ("FLOAT", Float),
        ("DECIMAL", Decimal),
        ("NUMERIC", Numeric),
        ("CLOB", Fixed("LONGTEXT")),
        ("NCLOB", Fixed("TEXT")),
        ("BLOB", Fixed("BLOB")),
        ("LONG", Fixed("LONGTEXT")),
        ("LONG RAW", Fixed("LONGBLOB")),
        ("BFILE", Fixed("VARCHAR(255)")),
        ("DATE", Fixed("DATETIME")),
        ("BINARY_FLOAT", Fixed("DOUBLE")),
        ("BINARY_DOUBLE", Fixed("DOUBLE")),
        ("REAL", Fixed("DOUBLE")),
        ("DOUBLE PRECISION", Fixed("DOUBLE")),
        ("INTEGER", Fixed("INT")),
        ("SMALLINT", Fixed("DECIMAL(38)")),
        ("ROWID", Fixed("CHAR(10)")),
        ("XMLTYPE", Fixed("LONGTEXT")),
    ])
}

/// Spellings that share another entry's mapping and display name
fn canonical_type_name(name: &str) -> &str {
    match name {
        "INT" => "INTEGER",
        "DEC" => "DECIMAL",
        other => other,
    }
}

/// Upper-case and collapse whitespace, including around parentheses and commas
pub fn normalize_type_name(data_type: &str) -> String {
    let collapsed = data_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    collapsed
        .replace(" (", "(")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace(" ,", ",")
        .replace(", ", ",")
}

/// Resolve Oracle column types to MySQL types, applying override rules
pub struct TypeResolver<'a> {
    table: &'a str,
    rules: OverrideRules<'a>,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver for the columns of one table
    pub fn new(table: &'a str, rules: OverrideRules<'a>) -> Self {
        Self { table, rules }
    }

    /// Resolve one column: custom rule, then plan rule, then the built-in mapping
    pub fn resolve(&self, column: &ColumnDescriptor) -> Result<ResolvedType> {
        let attrs = self.parse_attributes(column)?;
        let (origin, builtin) = builtin_mapping(&column.data_type, attrs);

        let custom: Vec<&str> = self
            .rules
            .custom
            .iter()
            .filter(|r| {
                r.table
                    .as_deref()
                    .map_or(true, |t| t.eq_ignore_ascii_case(self.table))
                    && r.column.trim().eq_ignore_ascii_case(column.column_name.trim())
                    && normalize_type_name(&r.source_type) == origin
                    && !r.target_type.trim().is_empty()
            })
            .map(|r| r.target_type.as_str())
            .collect();

        let plan: Vec<&str> = self
            .rules
            .plan
            .iter()
            .filter(|r| normalize_type_name(&r.source_type) == origin && !r.target_type.trim().is_empty())
            .map(|r| r.target_type.as_str())
            .collect();

        if custom.len() > 1 || plan.len() > 1 {
            return Err(ReverseError::ConflictingOverrides {
                column: column.column_name.clone(),
                source_type: origin,
                custom: custom.iter().map(|s| s.to_string()).collect(),
                plan: plan.iter().map(|s| s.to_string()).collect(),
            });
        }

        let (target, source) = match (custom.first(), plan.first()) {
            (Some(t), _) => (t.trim().to_string(), TypeSource::Custom),
            (None, Some(t)) => (t.trim().to_string(), TypeSource::Plan),
            (None, None) => (builtin.clone(), TypeSource::BuiltIn),
        };

        debug!(
            "Column {}.{}: {} -> {} ({:?})",
            self.table, column.column_name, origin, target, source
        );

        Ok(ResolvedType {
            origin,
            builtin,
            target,
            source,
        })
    }

    fn parse_attributes(&self, column: &ColumnDescriptor) -> Result<TypeAttributes> {
        Ok(TypeAttributes {
            length: self.parse_numeric(column, "data_length", &column.data_length)?,
            precision: self.parse_numeric(column, "data_precision", &column.data_precision)?,
            scale: self.parse_numeric(column, "data_scale", &column.data_scale)?,
        })
    }

    fn parse_numeric(&self, column: &ColumnDescriptor, field: &'static str, value: &str) -> Result<i64> {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| ReverseError::MalformedNumeric {
                table: self.table.to_string(),
                column: column.column_name.clone(),
                field,
                value: value.to_string(),
            })
    }
}

/// Built-in mapping without overrides: (Oracle display type, MySQL type)
pub fn builtin_mapping(data_type: &str, attrs: TypeAttributes) -> (String, String) {
    let normalized = normalize_type_name(data_type);
    let name = canonical_type_name(&normalized);

    match TYPE_MAP.get(name) {
        Some(strategy) => apply_strategy(name, *strategy, attrs),
        None => pattern_mapping(name, attrs),
    }
}

fn apply_strategy(name: &str, strategy: Strategy, attrs: TypeAttributes) -> (String, String) {
    let TypeAttributes {
        length,
        precision,
        scale,
    } = attrs;

    match strategy {
        Strategy::Fixed(target) => (name.to_string(), target.to_string()),
        Strategy::Number => number_mapping(precision, scale),
        Strategy::Character { fixed, varying } => {
            let target = if length < 256 { fixed } else { varying };
            (format!("{}({})", name, length), format!("{}({})", target, length))
        }
        Strategy::Varying(target) => (format!("{}({})", name, length), format!("{}({})", target, length)),
        Strategy::Unsized(target) => (name.to_string(), format!("{}({})", target, length)),
        Strategy::Raw => {
            let target = if length < 256 { "BINARY" } else { "VARBINARY" };
            (format!("RAW({})", length), format!("{}({})", target, length))
        }
        Strategy::Float => {
            let target = if precision == 0 { "FLOAT" } else { "DOUBLE" };
            (name.to_string(), target.to_string())
        }
        Strategy::Decimal => {
            if precision == 0 && scale == 0 {
                (name.to_string(), "DECIMAL".to_string())
            } else {
                (
                    format!("{}({},{})", name, precision, scale),
                    format!("DECIMAL({},{})", precision, scale),
                )
            }
        }
        Strategy::Numeric => {
            let target = if precision == 0 && scale == 0 {
                "DECIMAL".to_string()
            } else {
                format!("DECIMAL({},{})", precision, scale)
            };
            (format!("{}({},{})", name, precision, scale), target)
        }
    }
}

fn number_mapping(precision: i64, scale: i64) -> (String, String) {
    if scale > 0 {
        return (
            format!("NUMBER({},{})", precision, scale),
            format!("DECIMAL({},{})", precision, scale),
        );
    }

    // Negative scale rounds to the left of the decimal point, so the value is integral.
    if precision == 0 {
        return ("NUMBER".to_string(), "DECIMAL(65,30)".to_string());
    }

    let target = match precision {
        1..=2 => "TINYINT".to_string(),
        3..=4 => "SMALLINT".to_string(),
        5..=8 => "INT".to_string(),
        9..=18 => "BIGINT".to_string(),
        19..=38 => format!("DECIMAL({})", precision),
        _ => format!("DECIMAL({},4)", precision),
    };
    (format!("NUMBER({})", precision), target)
}

/// INTERVAL and TIMESTAMP families, plus the TEXT fallback
fn pattern_mapping(name: &str, attrs: TypeAttributes) -> (String, String) {
    let target = if name.contains("INTERVAL") {
        "VARCHAR(30)".to_string()
    } else if name.contains("TIMESTAMP") {
        let fsp = attrs.precision.clamp(0, 6);
        if name.contains("TIME ZONE") {
            format!("DATETIME({})", fsp)
        } else {
            format!("TIMESTAMP({})", fsp)
        }
    } else {
        "TEXT".to_string()
    };
    (name.to_string(), target)
}
