//! ora2my-reverse: Synthesize MySQL/TiDB DDL from Oracle catalog metadata
//!
//! Given the data-dictionary description of an Oracle schema (columns,
//! keys, check constraints, indexes) and the version of the target server,
//! this crate produces:
//!
//! - `reverse_<schema>.sql`: CREATE TABLE statements plus the unique keys,
//!   indexes and constraints that apply to the target as-is
//! - `compatibility_<schema>.sql`: statements a human should review first
//!   (bitmap and function-based indexes, constraints the target may not enforce)
//! - `reverse_<schema>.log`: one line per table with its status
//!
//! # Library usage
//!
//! ```rust,ignore
//! let summary = ora2my_reverse::ReverseBuilder::new("catalog.json", "MARVIN")
//!     .target_schema("steven")
//!     .output_dir("out")
//!     .column_type_rule("NUMBER(10)", "BIGINT")
//!     .run()
//!     .await?;
//! println!("{} tables reversed", summary.succeeded);
//! ```
//!
//! Single tables can be synthesized without any I/O through [`reverse::synthesize`].
//!
//! # CLI Usage
//!
//! ```bash
//! ora2my-reverse --catalog catalog.json --schema MARVIN --output ./out reverse
//! ```

pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod reverse;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

pub use catalog::{CatalogReader, SnapshotCatalog};
pub use config::ReverseConfig;
pub use driver::{Reverser, RunSummary, TableFailure};
pub use error::{ErrorScope, ReverseError, Result};
pub use reverse::DdlBundle;

/// Main entry point: reverse the configured schema from its catalog snapshot
pub async fn run(config: &ReverseConfig) -> Result<RunSummary> {
    config.validate()?;
    info!("Loading catalog snapshot: {:?}", config.catalog_file);
    let catalog = SnapshotCatalog::from_file(&config.catalog_file)?;
    Reverser::new(config.clone()).run(Arc::new(catalog)).await
}

/// Builder for programmatic runs
pub struct ReverseBuilder {
    config: ReverseConfig,
}

impl ReverseBuilder {
    /// Create a new builder for the given catalog snapshot and Oracle schema
    pub fn new(catalog_file: impl AsRef<Path>, source_schema: &str) -> Self {
        Self {
            config: ReverseConfig::default_with_catalog(
                catalog_file.as_ref().to_path_buf(),
                source_schema,
            ),
        }
    }

    /// Set the MySQL schema name (defaults to the source schema)
    pub fn target_schema(mut self, schema: &str) -> Self {
        self.config.target_schema = Some(schema.to_string());
        self
    }

    /// Set the directory receiving the output files
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the number of tables synthesized concurrently
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Set tables to include
    pub fn include_tables(mut self, tables: &[&str]) -> Self {
        self.config.include_tables = tables.join(",");
        self
    }

    /// Set tables to exclude
    pub fn exclude_tables(mut self, tables: &[&str]) -> Self {
        self.config.exclude_tables = tables.join(",");
        self
    }

    /// Replace the built-in mapping for every column of an Oracle type
    pub fn column_type_rule(mut self, source_type: &str, target_type: &str) -> Self {
        self.config.column_type_rules.push(config::ColumnTypeRule {
            source_type: source_type.to_string(),
            target_type: target_type.to_string(),
        });
        self
    }

    /// Replace the type of one column; `table` limits the rule to one table
    pub fn custom_column_rule(
        mut self,
        table: Option<&str>,
        column: &str,
        source_type: &str,
        target_type: &str,
    ) -> Self {
        self.config.custom_column_rules.push(config::CustomColumnRule {
            table: table.map(str::to_string),
            column: column.to_string(),
            source_type: source_type.to_string(),
            target_type: target_type.to_string(),
        });
        self
    }

    /// Rename a table in the generated DDL
    pub fn table_rule(mut self, source_table: &str, target_table: &str) -> Self {
        self.config.table_rules.push(config::TableRule {
            source_table: source_table.to_string(),
            target_table: target_table.to_string(),
        });
        self
    }

    /// Stop scheduling tables after the first failure
    pub fn fail_fast(mut self) -> Self {
        self.config.fail_fast = true;
        self
    }

    /// Enable dry run mode (synthesize without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    /// The assembled configuration
    pub fn config(&self) -> &ReverseConfig {
        &self.config
    }

    /// Run the reverse
    pub async fn run(self) -> Result<RunSummary> {
        run(&self.config).await
    }
}
