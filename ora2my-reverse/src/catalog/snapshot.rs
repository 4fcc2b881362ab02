//! Catalog reader seam and its JSON snapshot implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::metadata::TableCatalog;
use crate::error::{ReverseError, Result};

/// Supplies already-fetched table metadata and the target engine version
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Raw version string reported by the target MySQL/TiDB server
    async fn target_version(&self) -> Result<String>;

    /// Table names of one Oracle schema, in catalog order
    async fn table_names(&self, schema: &str) -> Result<Vec<String>>;

    /// Full metadata for one table
    async fn table(&self, schema: &str, table: &str) -> Result<TableCatalog>;
}

/// A catalog dumped to JSON ahead of time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCatalog {
    /// Oracle schema the tables belong to
    pub schema: String,

    /// Version string of the target server, e.g. `5.7.25-TiDB-v5.0.1`
    pub target_version: String,

    #[serde(default)]
    pub tables: Vec<TableCatalog>,
}

impl SnapshotCatalog {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a snapshot file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| {
            ReverseError::Catalog(format!(
                "Failed to parse catalog snapshot {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn check_schema(&self, schema: &str) -> Result<()> {
        if self.schema.eq_ignore_ascii_case(schema) {
            Ok(())
        } else {
            Err(ReverseError::Catalog(format!(
                "snapshot holds schema [{}], not [{}]",
                self.schema, schema
            )))
        }
    }
}

#[async_trait]
impl CatalogReader for SnapshotCatalog {
    async fn target_version(&self) -> Result<String> {
        Ok(self.target_version.clone())
    }

    async fn table_names(&self, schema: &str) -> Result<Vec<String>> {
        self.check_schema(schema)?;
        Ok(self.tables.iter().map(|t| t.table_name.clone()).collect())
    }

    async fn table(&self, schema: &str, table: &str) -> Result<TableCatalog> {
        self.check_schema(schema)?;
        self.tables
            .iter()
            .find(|t| t.table_name.eq_ignore_ascii_case(table))
            .cloned()
            .ok_or_else(|| {
                ReverseError::Catalog(format!(
                    "oracle schema [{}] table [{}] not found in snapshot",
                    schema, table
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "schema": "MARVIN",
        "target_version": "8.0.28",
        "tables": [
            {"table_name": "ORDERS", "columns": [{"column_name": "ID", "data_type": "NUMBER", "data_precision": 10}]},
            {"table_name": "CUSTOMERS"}
        ]
    }"#;

    #[tokio::test]
    async fn test_snapshot_lists_tables_in_order() {
        let catalog = SnapshotCatalog::from_json(SNAPSHOT).unwrap();
        assert_eq!(catalog.target_version().await.unwrap(), "8.0.28");
        assert_eq!(
            catalog.table_names("marvin").await.unwrap(),
            vec!["ORDERS", "CUSTOMERS"]
        );
    }

    #[tokio::test]
    async fn test_snapshot_table_lookup() {
        let catalog = SnapshotCatalog::from_json(SNAPSHOT).unwrap();
        let orders = catalog.table("MARVIN", "orders").await.unwrap();
        assert_eq!(orders.columns.len(), 1);
        assert_eq!(orders.columns[0].data_precision, "10");

        assert!(catalog.table("MARVIN", "MISSING").await.is_err());
        assert!(catalog.table_names("OTHER").await.is_err());
    }

    #[test]
    fn test_snapshot_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = SnapshotCatalog::from_file(&path).unwrap_err();
        assert!(matches!(err, ReverseError::Catalog(_)));
    }
}
