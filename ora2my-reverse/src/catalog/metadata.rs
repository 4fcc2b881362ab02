//! Descriptor structures for one Oracle table, as fetched from the data dictionary

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Everything the catalog reader knows about one table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCatalog {
    /// Oracle table name
    pub table_name: String,

    /// Rows of DBA_TAB_COMMENTS; more than one is ambiguous
    #[serde(default)]
    pub comments: Vec<String>,

    /// Columns in COLUMN_ID order
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,

    /// Primary key rows; more than one is ambiguous
    #[serde(default)]
    pub primary_keys: Vec<KeyDescriptor>,

    #[serde(default)]
    pub unique_keys: Vec<KeyDescriptor>,

    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,

    #[serde(default)]
    pub check_constraints: Vec<CheckDescriptor>,

    /// Indexes reported by the unique-index query
    #[serde(default)]
    pub unique_indexes: Vec<IndexDescriptor>,

    /// Indexes reported by the non-unique-index query
    #[serde(default)]
    pub normal_indexes: Vec<IndexDescriptor>,
}

/// One source column
///
/// Length, precision and scale stay as catalog text; they are parsed by the
/// type resolver so that malformed values fail the table, not the load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub column_name: String,

    /// Oracle type name (`NUMBER`, `VARCHAR2`, `TIMESTAMP(6) WITH TIME ZONE`, ...)
    pub data_type: String,

    /// `Y` when the column accepts NULL
    #[serde(default = "default_nullable")]
    pub nullable: String,

    #[serde(default = "default_numeric", deserialize_with = "numeric_text")]
    pub data_length: String,

    #[serde(default = "default_numeric", deserialize_with = "numeric_text")]
    pub data_precision: String,

    #[serde(default = "default_numeric", deserialize_with = "numeric_text")]
    pub data_scale: String,

    /// DATA_DEFAULT literal, empty when absent
    #[serde(default)]
    pub data_default: String,

    /// Column comment, empty when absent
    #[serde(default)]
    pub comments: String,
}

/// Primary or unique key constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDescriptor {
    #[serde(default)]
    pub constraint_name: String,
    pub column_list: Vec<String>,
}

/// Foreign key constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    pub constraint_name: String,
    pub column_list: Vec<String>,
    /// Owner of the referenced table
    pub r_owner: String,
    pub r_table_name: String,
    pub r_column_list: Vec<String>,
    /// `NO ACTION`, `CASCADE`, `SET NULL`, or empty
    #[serde(default)]
    pub delete_rule: String,
}

/// Check constraint with its free-text predicate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDescriptor {
    pub constraint_name: String,
    pub search_condition: String,
}

/// One source index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub index_name: String,
    pub uniqueness: Uniqueness,
    pub index_type: IndexType,
    #[serde(default)]
    pub column_list: Vec<String>,
    /// Per-position expressions of a function-based index; empty entries fall back to the column
    #[serde(default)]
    pub column_expressions: Vec<String>,
}

/// One indexed position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPart<'a> {
    Expression(&'a str),
    Column(&'a str),
}

/// DBA_INDEXES.UNIQUENESS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Uniqueness {
    #[serde(rename = "UNIQUE")]
    Unique,
    #[serde(rename = "NONUNIQUE")]
    NonUnique,
}

/// DBA_INDEXES.INDEX_TYPE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IndexType {
    Normal,
    FunctionBasedNormal,
    Bitmap,
    Other(String),
}

impl Uniqueness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Uniqueness::Unique => "UNIQUE",
            Uniqueness::NonUnique => "NONUNIQUE",
        }
    }
}

impl fmt::Display for Uniqueness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IndexType {
    pub fn as_str(&self) -> &str {
        match self {
            IndexType::Normal => "NORMAL",
            IndexType::FunctionBasedNormal => "FUNCTION-BASED NORMAL",
            IndexType::Bitmap => "BITMAP",
            IndexType::Other(name) => name,
        }
    }
}

impl From<String> for IndexType {
    fn from(value: String) -> Self {
        match value.trim().to_uppercase().as_str() {
            "NORMAL" => IndexType::Normal,
            "FUNCTION-BASED NORMAL" => IndexType::FunctionBasedNormal,
            "BITMAP" => IndexType::Bitmap,
            _ => IndexType::Other(value),
        }
    }
}

impl From<IndexType> for String {
    fn from(value: IndexType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TableCatalog {
    /// Number of constraint descriptors of every kind
    pub fn constraint_count(&self) -> usize {
        self.primary_keys.len()
            + self.unique_keys.len()
            + self.foreign_keys.len()
            + self.check_constraints.len()
    }

    /// Number of index descriptors of both uniqueness kinds
    pub fn index_count(&self) -> usize {
        self.unique_indexes.len() + self.normal_indexes.len()
    }
}

impl ColumnDescriptor {
    /// Only an explicit `Y` makes a column nullable
    pub fn is_nullable(&self) -> bool {
        self.nullable == "Y"
    }
}

impl IndexDescriptor {
    /// Expression for each indexed position, falling back to the plain column
    ///
    /// Positions are walked over the longer of the two lists, so expressions
    /// without a column slot are kept.
    pub fn expressions(&self) -> Vec<String> {
        self.key_parts()
            .map(|part| match part {
                KeyPart::Expression(expr) | KeyPart::Column(expr) => expr.to_string(),
            })
            .collect()
    }

    /// Indexed positions, each either an expression or a plain column
    pub fn key_parts(&self) -> impl Iterator<Item = KeyPart<'_>> {
        let positions = self.column_list.len().max(self.column_expressions.len());
        (0..positions).filter_map(move |i| {
            match (self.column_expressions.get(i), self.column_list.get(i)) {
                (Some(expr), _) if !expr.trim().is_empty() => Some(KeyPart::Expression(expr.trim())),
                (_, Some(col)) if !col.trim().is_empty() => Some(KeyPart::Column(col.trim())),
                _ => None,
            }
        })
    }
}

fn default_nullable() -> String {
    "Y".to_string()
}

fn default_numeric() -> String {
    "0".to_string()
}

/// Accept a JSON string or integer and keep it as text; `null` reads as `0` like NVL in the dictionary query
fn numeric_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumericText {
        Int(i64),
        Text(String),
    }

    Ok(match Option::<NumericText>::deserialize(deserializer)? {
        Some(NumericText::Int(n)) => n.to_string(),
        Some(NumericText::Text(s)) => s,
        None => default_numeric(),
    })
}
