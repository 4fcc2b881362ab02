//! Configuration settings for ora2my-reverse

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::error::{ReverseError, Result};

/// Main configuration struct for a reverse run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseConfig {
    /// Path to the JSON catalog snapshot
    #[serde(default)]
    pub catalog_file: PathBuf,

    /// Oracle schema (owner) to reverse
    #[serde(default)]
    pub source_schema: String,

    /// MySQL schema the DDL is written for (defaults to the source schema)
    #[serde(default)]
    pub target_schema: Option<String>,

    /// Tables to include (comma-separated, or "*" for all)
    #[serde(default = "default_include_tables")]
    pub include_tables: String,

    /// Tables to exclude (comma-separated)
    #[serde(default = "default_exclude_tables")]
    pub exclude_tables: String,

    /// Directory receiving reverse_<schema>.sql, compatibility_<schema>.sql and reverse_<schema>.log
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of tables synthesized concurrently
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Options appended after the CREATE TABLE column list
    #[serde(default = "default_table_option")]
    pub table_option: String,

    /// Stop scheduling tables after the first failed one
    #[serde(default = "default_fail_fast")]
    pub fail_fast: bool,

    /// Dry run mode - synthesize everything but write nothing
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,

    /// Schema-wide type substitutions keyed by Oracle type
    #[serde(default)]
    pub column_type_rules: Vec<ColumnTypeRule>,

    /// Per-column type substitutions
    #[serde(default)]
    pub custom_column_rules: Vec<CustomColumnRule>,

    /// Target table renames
    #[serde(default)]
    pub table_rules: Vec<TableRule>,
}

/// Plan-level rule: every column whose Oracle type matches `source_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTypeRule {
    /// Oracle display type, e.g. `NUMBER(10)` or `DATE`
    pub source_type: String,
    /// MySQL type written instead of the built-in mapping
    pub target_type: String,
}

/// Custom rule: one named column of one Oracle type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomColumnRule {
    /// Restrict the rule to one table; applies to every table when absent
    #[serde(default)]
    pub table: Option<String>,
    pub column: String,
    pub source_type: String,
    pub target_type: String,
}

/// Renames a source table in the generated DDL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRule {
    pub source_table: String,
    pub target_table: String,
}

/// Borrowed view of both override tiers, handed to the type resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideRules<'a> {
    pub plan: &'a [ColumnTypeRule],
    pub custom: &'a [CustomColumnRule],
}

// Default value functions for serde
fn default_include_tables() -> String {
    defaults::INCLUDE_TABLES.to_string()
}
fn default_exclude_tables() -> String {
    defaults::EXCLUDE_TABLES.to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_threads() -> usize {
    defaults::THREADS
}
fn default_table_option() -> String {
    defaults::TABLE_OPTION.to_string()
}
fn default_fail_fast() -> bool {
    defaults::FAIL_FAST
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self {
            catalog_file: PathBuf::new(),
            source_schema: String::new(),
            target_schema: None,
            include_tables: default_include_tables(),
            exclude_tables: default_exclude_tables(),
            output_dir: default_output_dir(),
            threads: default_threads(),
            table_option: default_table_option(),
            fail_fast: default_fail_fast(),
            dry_run: default_dry_run(),
            log_level: None,
            column_type_rules: Vec::new(),
            custom_column_rules: Vec::new(),
            table_rules: Vec::new(),
        }
    }
}

impl ReverseConfig {
    /// Create a default config for the given catalog snapshot and schema
    pub fn default_with_catalog(catalog_file: PathBuf, source_schema: &str) -> Self {
        Self {
            catalog_file,
            source_schema: source_schema.to_string(),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ReverseConfig = toml::from_str(&content).map_err(|e| {
            ReverseError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name(defaults::CONFIG_FILE_NAME).required(false));
        }

        // ORA2MY_OUTPUT_DIR -> output_dir
        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ReverseConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Effective MySQL schema name
    pub fn target_schema(&self) -> &str {
        match self.target_schema.as_deref() {
            Some(schema) if !schema.trim().is_empty() => schema,
            _ => &self.source_schema,
        }
    }

    /// Effective MySQL table name for a source table
    pub fn target_table(&self, source_table: &str) -> String {
        self.table_rules
            .iter()
            .find(|r| r.source_table.eq_ignore_ascii_case(source_table))
            .map(|r| r.target_table.clone())
            .unwrap_or_else(|| source_table.to_string())
    }

    /// Both override tiers as one view
    pub fn override_rules(&self) -> OverrideRules<'_> {
        OverrideRules {
            plan: &self.column_type_rules,
            custom: &self.custom_column_rules,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog_file.as_os_str().is_empty() {
            return Err(ReverseError::Validation("catalog_file is required".into()));
        }

        if !self.catalog_file.exists() {
            return Err(ReverseError::Validation(format!(
                "Catalog file not found: {}",
                self.catalog_file.display()
            )));
        }

        if self.source_schema.trim().is_empty() {
            return Err(ReverseError::Validation(
                "source_schema is required".into(),
            ));
        }

        if self.threads == 0 {
            return Err(ReverseError::Validation(
                "threads must be at least 1".into(),
            ));
        }

        for rule in &self.column_type_rules {
            if rule.source_type.trim().is_empty() || rule.target_type.trim().is_empty() {
                return Err(ReverseError::Validation(format!(
                    "column_type_rules entry {:?} needs both source_type and target_type",
                    rule
                )));
            }
        }

        for rule in &self.custom_column_rules {
            if rule.column.trim().is_empty()
                || rule.source_type.trim().is_empty()
                || rule.target_type.trim().is_empty()
            {
                return Err(ReverseError::Validation(format!(
                    "custom_column_rules entry {:?} needs column, source_type and target_type",
                    rule
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReverseConfig::default();
        assert_eq!(config.include_tables, "*");
        assert_eq!(config.threads, 4);
        assert!(!config.dry_run);
        assert!(config.log_level.is_none());
        assert!(config.table_option.starts_with("ENGINE=InnoDB"));
    }

    #[test]
    fn test_validation_missing_catalog() {
        let config = ReverseConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_threads() {
        let catalog = tempfile::NamedTempFile::new().unwrap();
        let mut config =
            ReverseConfig::default_with_catalog(catalog.path().to_path_buf(), "MARVIN");
        assert!(config.validate().is_ok());

        config.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_with_rules() {
        let toml_content = r#"
            catalog_file = "catalog.json"
            source_schema = "MARVIN"
            target_schema = "steven"
            log_level = "debug"

            [[column_type_rules]]
            source_type = "NUMBER(10)"
            target_type = "BIGINT"

            [[custom_column_rules]]
            table = "ORDERS"
            column = "ID"
            source_type = "NUMBER(10)"
            target_type = "INT UNSIGNED"

            [[table_rules]]
            source_table = "ORDERS"
            target_table = "orders_v2"
        "#;
        let config: ReverseConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.log_level, Some("debug".to_string()));
        assert_eq!(config.target_schema(), "steven");
        assert_eq!(config.target_table("orders"), "orders_v2");
        assert_eq!(config.target_table("CUSTOMERS"), "CUSTOMERS");

        let rules = config.override_rules();
        assert_eq!(rules.plan.len(), 1);
        assert_eq!(rules.custom[0].table.as_deref(), Some("ORDERS"));
    }

    #[test]
    fn test_target_schema_falls_back_to_source() {
        let mut config = ReverseConfig::default();
        config.source_schema = "MARVIN".into();
        assert_eq!(config.target_schema(), "MARVIN");

        config.target_schema = Some("  ".into());
        assert_eq!(config.target_schema(), "MARVIN");
    }
}
