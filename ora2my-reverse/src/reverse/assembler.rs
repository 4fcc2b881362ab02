//! Per-table DDL synthesis
//!
//! [`synthesize`] turns one table's catalog descriptors into a [`DdlBundle`].
//! It does no I/O and shares no state, so the driver calls it concurrently,
//! once per table.

use tracing::{debug, warn};

use super::banner::{
    render_banner, COMPATIBILITY_TITLE, REVERSE_TITLE, SUGGEST_MANUAL, SUGGEST_MANUAL_CREATE,
};
use super::column::{quote_comment, render_column};
use super::constraint::{
    alter_table_add, check_clauses, foreign_key_clauses, primary_key_clause, unique_key_clauses,
    DeleteRule,
};
use super::index::{extract_indexes, IndexTarget};
use super::naming::{display_table, quote_table};
use super::type_resolver::TypeResolver;
use super::version::{Destination, VersionInfo};
use super::warning::{ReverseWarning, WarningKind};
use crate::catalog::{TableCatalog, Uniqueness};
use crate::config::OverrideRules;
use crate::error::{ReverseError, Result};

/// Everything needed to synthesize one table
#[derive(Debug, Clone, Copy)]
pub struct TableRequest<'a> {
    pub source_schema: &'a str,
    pub target_schema: &'a str,
    pub target_table: &'a str,
    pub table_option: &'a str,
    pub catalog: &'a TableCatalog,
    pub rules: OverrideRules<'a>,
    pub version: &'a VersionInfo,
}

/// Kind of statements in a compatibility group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    ForeignKeys,
    CheckConstraints,
    /// Foreign keys whose delete rule has no generated counterpart
    UnhandledDeleteRules,
    Indexes,
}

/// Statements that share one review banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityGroup {
    pub kind: GroupKind,
    pub statements: Vec<String>,
}

/// Generated DDL for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlBundle {
    /// `SCHEMA.TABLE` on the Oracle side
    pub source: String,
    /// `schema.table` on the MySQL side
    pub target: String,
    pub create_table: String,
    /// ALTER and CREATE INDEX statements following the CREATE TABLE
    pub primary: Vec<String>,
    pub compatibility: Vec<CompatibilityGroup>,
    pub warnings: Vec<ReverseWarning>,
}

impl DdlBundle {
    /// Primary script block: banner, CREATE TABLE, then the portable statements
    pub fn primary_sql(&self) -> String {
        let mut sql = render_banner(REVERSE_TITLE, &self.source, &self.target, SUGGEST_MANUAL);
        sql.push_str(&self.create_table);
        sql.push_str(";\n\n");
        for stmt in &self.primary {
            sql.push_str(stmt);
            sql.push_str(";\n");
        }
        sql
    }

    /// Compatibility script block, one banner per group; empty when nothing needs review
    pub fn compatibility_sql(&self) -> String {
        let mut sql = String::new();
        for group in &self.compatibility {
            sql.push_str(&render_banner(
                COMPATIBILITY_TITLE,
                &self.source,
                &self.target,
                SUGGEST_MANUAL_CREATE,
            ));
            for stmt in &group.statements {
                sql.push_str(stmt);
                sql.push_str(";\n");
            }
        }
        sql
    }

    /// Number of statements across every compatibility group
    pub fn compatibility_count(&self) -> usize {
        self.compatibility.iter().map(|g| g.statements.len()).sum()
    }
}

/// Synthesize the primary and compatibility DDL of one table
pub fn synthesize(req: &TableRequest<'_>) -> Result<DdlBundle> {
    let catalog = req.catalog;
    let source_table = catalog.table_name.as_str();

    if catalog.columns.is_empty() {
        return Err(ReverseError::EmptyTable {
            schema: req.source_schema.to_string(),
            table: source_table.to_string(),
        });
    }

    let table_comment = match catalog.comments.as_slice() {
        [] => None,
        [comment] => Some(comment.as_str()).filter(|c| !c.is_empty()),
        rows => {
            return Err(ReverseError::AmbiguousTableComment {
                schema: req.source_schema.to_string(),
                table: source_table.to_string(),
                rows: rows.to_vec(),
            })
        }
    };

    // Column definitions
    let resolver = TypeResolver::new(source_table, req.rules);
    let mut body = Vec::with_capacity(catalog.columns.len() + 1);
    for column in &catalog.columns {
        let resolved = resolver.resolve(column)?;
        body.push(render_column(column, &resolved.target));
    }
    if let Some(pk) = primary_key_clause(req.source_schema, source_table, &catalog.primary_keys)? {
        body.push(pk);
    }

    let mut create_table = format!(
        "CREATE TABLE {} (\n  {}\n)",
        quote_table(req.target_schema, req.target_table),
        body.join(",\n  ")
    );
    if !req.table_option.trim().is_empty() {
        create_table.push(' ');
        create_table.push_str(req.table_option.trim());
    }
    if let Some(comment) = table_comment {
        create_table.push_str(" COMMENT=");
        create_table.push_str(&quote_comment(comment));
    }
    debug!("{}", create_table);

    let alter = |clause: &str| alter_table_add(req.target_schema, req.target_table, clause);
    let target = IndexTarget {
        source_table,
        schema: req.target_schema,
        table: req.target_table,
    };

    let unique_indexes = extract_indexes(&target, &catalog.unique_indexes, Uniqueness::Unique)?;
    let normal_indexes = extract_indexes(&target, &catalog.normal_indexes, Uniqueness::NonUnique)?;

    let mut warnings = Vec::new();
    warnings.extend(unique_indexes.warnings);
    warnings.extend(normal_indexes.warnings);

    let mut primary: Vec<String> = unique_key_clauses(&catalog.unique_keys)
        .iter()
        .map(|uk| alter(uk))
        .collect();
    primary.extend(unique_indexes.portable);
    primary.extend(normal_indexes.portable);

    let placement = req.version.placement();

    let checks: Vec<(&str, String)> = check_clauses(&catalog.check_constraints)
        .into_iter()
        .map(|(name, ck)| (name, alter(&ck)))
        .collect();

    let mut foreign_keys = Vec::new();
    let mut unhandled = Vec::new();
    for fk in foreign_key_clauses(&catalog.foreign_keys) {
        let stmt = alter(&fk.clause);
        if matches!(fk.delete_rule, DeleteRule::Unhandled(_)) {
            warn!(
                "Table {} foreign key {} has delete rule {}, moved to compatibility output without ON DELETE",
                source_table, fk.name, fk.delete_rule
            );
            warnings.push(ReverseWarning::new(
                WarningKind::UnhandledDeleteRule,
                &fk.name,
                format!("delete rule [{}] is not generated", fk.delete_rule),
            ));
            unhandled.push(stmt);
        } else {
            foreign_keys.push((fk.name, stmt));
        }
    }

    let mut compatibility = Vec::new();

    if placement.check_constraints == Destination::Primary {
        primary.extend(checks.into_iter().map(|(_, stmt)| stmt));
    } else if !checks.is_empty() {
        let mut statements = Vec::with_capacity(checks.len());
        for (name, stmt) in checks {
            warn!("Table {} check constraint moved to compatibility output: {}", source_table, stmt);
            warnings.push(ReverseWarning::new(
                WarningKind::CheckConstraint,
                name,
                format!("target {} may not enforce CHECK", req.version.raw),
            ));
            statements.push(stmt);
        }
        compatibility.push(CompatibilityGroup {
            kind: GroupKind::CheckConstraints,
            statements,
        });
    }

    if placement.foreign_keys == Destination::Primary {
        primary.extend(foreign_keys.into_iter().map(|(_, stmt)| stmt));
    } else if !foreign_keys.is_empty() {
        let mut statements = Vec::with_capacity(foreign_keys.len());
        for (name, stmt) in foreign_keys {
            warn!("Table {} foreign key moved to compatibility output: {}", source_table, stmt);
            warnings.push(ReverseWarning::new(
                WarningKind::ForeignKey,
                name,
                format!("target {} foreign key support is not assumed", req.version.raw),
            ));
            statements.push(stmt);
        }
        compatibility.push(CompatibilityGroup {
            kind: GroupKind::ForeignKeys,
            statements,
        });
    }

    if !unhandled.is_empty() {
        compatibility.push(CompatibilityGroup {
            kind: GroupKind::UnhandledDeleteRules,
            statements: unhandled,
        });
    }

    let mut index_statements = unique_indexes.compatibility;
    index_statements.extend(normal_indexes.compatibility);
    if !index_statements.is_empty() {
        compatibility.push(CompatibilityGroup {
            kind: GroupKind::Indexes,
            statements: index_statements,
        });
    }

    for stmt in &primary {
        debug!("{}", stmt);
    }

    Ok(DdlBundle {
        source: display_table(req.source_schema, source_table),
        target: display_table(
            &req.target_schema.to_lowercase(),
            &req.target_table.to_lowercase(),
        ),
        create_table,
        primary,
        compatibility,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        CheckDescriptor, ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, IndexType,
        KeyDescriptor,
    };

    fn make_column(name: &str, data_type: &str, precision: &str, nullable: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            column_name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: nullable.to_string(),
            data_length: "22".to_string(),
            data_precision: precision.to_string(),
            data_scale: "0".to_string(),
            data_default: String::new(),
            comments: String::new(),
        }
    }

    fn make_table() -> TableCatalog {
        TableCatalog {
            table_name: "ORDERS".to_string(),
            comments: vec!["customer orders".to_string()],
            columns: vec![
                make_column("ID", "NUMBER", "10", "N"),
                make_column("CUSTOMER_ID", "NUMBER", "10", "Y"),
                make_column("CREATED_AT", "DATE", "0", "N"),
            ],
            primary_keys: vec![KeyDescriptor {
                constraint_name: "PK_ORDERS".to_string(),
                column_list: vec!["ID".to_string()],
            }],
            foreign_keys: vec![ForeignKeyDescriptor {
                constraint_name: "FK_CUSTOMER".to_string(),
                column_list: vec!["CUSTOMER_ID".to_string()],
                r_owner: "MARVIN".to_string(),
                r_table_name: "CUSTOMERS".to_string(),
                r_column_list: vec!["ID".to_string()],
                delete_rule: "CASCADE".to_string(),
            }],
            check_constraints: vec![CheckDescriptor {
                constraint_name: "CK_ID".to_string(),
                search_condition: "\"ID\" IS NOT NULL AND ID > 0".to_string(),
            }],
            normal_indexes: vec![
                IndexDescriptor {
                    index_name: "IDX_CREATED".to_string(),
                    uniqueness: Uniqueness::NonUnique,
                    index_type: IndexType::Normal,
                    column_list: vec!["CREATED_AT".to_string()],
                    column_expressions: Vec::new(),
                },
                IndexDescriptor {
                    index_name: "BIX_CUST".to_string(),
                    uniqueness: Uniqueness::NonUnique,
                    index_type: IndexType::Bitmap,
                    column_list: vec!["CUSTOMER_ID".to_string()],
                    column_expressions: Vec::new(),
                },
            ],
            ..Default::default()
        }
    }

    fn request<'a>(catalog: &'a TableCatalog, version: &'a VersionInfo) -> TableRequest<'a> {
        TableRequest {
            source_schema: "MARVIN",
            target_schema: "steven",
            target_table: "ORDERS",
            table_option: "ENGINE=InnoDB",
            catalog,
            rules: OverrideRules::default(),
            version,
        }
    }

    #[test]
    fn test_create_table_statement() {
        let table = make_table();
        let version = VersionInfo::parse("8.0.28");
        let bundle = synthesize(&request(&table, &version)).unwrap();
        assert_eq!(
            bundle.create_table,
            "CREATE TABLE `steven`.`orders` (\n  \
             `id` bigint NOT NULL,\n  \
             `customer_id` bigint,\n  \
             `created_at` datetime NOT NULL,\n  \
             PRIMARY KEY (`id`)\n\
             ) ENGINE=InnoDB COMMENT='customer orders'"
        );
        assert_eq!(bundle.source, "MARVIN.ORDERS");
        assert_eq!(bundle.target, "steven.orders");
    }

    #[test]
    fn test_newer_mysql_keeps_constraints_primary() {
        let table = make_table();
        let version = VersionInfo::parse("8.0.28");
        let bundle = synthesize(&request(&table, &version)).unwrap();
        assert_eq!(
            bundle.primary,
            vec![
                "CREATE INDEX `idx_created` ON `steven`.`orders`(`created_at`)",
                "ALTER TABLE `steven`.`orders` ADD CONSTRAINT `ck_id` CHECK (ID > 0)",
                "ALTER TABLE `steven`.`orders` ADD CONSTRAINT `fk_customer` FOREIGN KEY(`customer_id`) \
                 REFERENCES `marvin`.`customers`(`id`) ON DELETE CASCADE",
            ]
        );
        assert_eq!(bundle.compatibility.len(), 1);
        assert_eq!(bundle.compatibility[0].kind, GroupKind::Indexes);
        assert!(!bundle.primary_sql().contains("BITMAP"));
        assert!(bundle.compatibility_sql().contains("CREATE BITMAP INDEX `bix_cust`"));
    }

    #[test]
    fn test_tidb_moves_constraints_to_compatibility() {
        let table = make_table();
        let version = VersionInfo::parse("5.7.25-TiDB-v5.0.1");
        let bundle = synthesize(&request(&table, &version)).unwrap();

        let primary = bundle.primary_sql();
        assert!(!primary.contains("FOREIGN KEY"));
        assert!(!primary.contains("CHECK"));

        let kinds: Vec<GroupKind> = bundle.compatibility.iter().map(|g| g.kind).collect();
        assert_eq!(
            kinds,
            vec![GroupKind::CheckConstraints, GroupKind::ForeignKeys, GroupKind::Indexes]
        );
        let compat = bundle.compatibility_sql();
        assert!(compat.contains("FOREIGN KEY"));
        assert!(compat.contains("CHECK (ID > 0)"));
        assert_eq!(compat.matches("Manual Create").count(), 3);
        assert!(bundle.warnings.iter().any(|w| w.kind == WarningKind::ForeignKey));
    }

    #[test]
    fn test_older_mysql_moves_checks_only() {
        let table = make_table();
        let version = VersionInfo::parse("5.7.36");
        let bundle = synthesize(&request(&table, &version)).unwrap();
        assert!(bundle.primary_sql().contains("FOREIGN KEY"));
        assert!(!bundle.primary_sql().contains("CHECK"));
        assert!(bundle.compatibility_sql().contains("CHECK (ID > 0)"));
    }

    #[test]
    fn test_unhandled_delete_rule_has_own_group() {
        let mut table = make_table();
        table.foreign_keys[0].delete_rule = "SET DEFAULT".to_string();
        let version = VersionInfo::parse("8.0.28");
        let bundle = synthesize(&request(&table, &version)).unwrap();

        assert!(!bundle.primary_sql().contains("FOREIGN KEY"));
        let group = bundle
            .compatibility
            .iter()
            .find(|g| g.kind == GroupKind::UnhandledDeleteRules)
            .unwrap();
        assert!(group.statements[0].ends_with("REFERENCES `marvin`.`customers`(`id`)"));
        assert!(bundle
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnhandledDeleteRule && w.detail.contains("SET DEFAULT")));
    }

    #[test]
    fn test_primary_sql_layout() {
        let mut table = make_table();
        table.foreign_keys.clear();
        table.check_constraints.clear();
        table.normal_indexes.clear();
        table.unique_keys = vec![KeyDescriptor {
            constraint_name: "UK_CUST".to_string(),
            column_list: vec!["CUSTOMER_ID".to_string()],
        }];
        let version = VersionInfo::parse("8.0.28");
        let bundle = synthesize(&request(&table, &version)).unwrap();

        let sql = bundle.primary_sql();
        assert!(sql.starts_with("/*\n oracle table reverse sql\n┌"));
        assert!(sql.contains("*/\nCREATE TABLE `steven`.`orders` ("));
        assert!(sql.ends_with(
            "COMMENT='customer orders';\n\nALTER TABLE `steven`.`orders` ADD UNIQUE `uk_cust` (`customer_id`);\n"
        ));
        assert!(bundle.compatibility_sql().is_empty());
        assert_eq!(bundle.compatibility_count(), 0);
    }

    #[test]
    fn test_two_primary_keys_fail_the_table() {
        let mut table = make_table();
        table.primary_keys.push(KeyDescriptor {
            constraint_name: "PK_OTHER".to_string(),
            column_list: vec!["CUSTOMER_ID".to_string()],
        });
        let version = VersionInfo::parse("8.0.28");
        let err = synthesize(&request(&table, &version)).unwrap_err();
        assert!(matches!(err, ReverseError::AmbiguousPrimaryKey { .. }));
    }

    #[test]
    fn test_multiple_comment_rows_fail_the_table() {
        let mut table = make_table();
        table.comments.push("second".to_string());
        let version = VersionInfo::parse("8.0.28");
        let err = synthesize(&request(&table, &version)).unwrap_err();
        assert!(matches!(err, ReverseError::AmbiguousTableComment { .. }));
    }

    #[test]
    fn test_table_without_comment_or_columns() {
        let mut table = make_table();
        table.comments = vec![String::new()];
        let version = VersionInfo::parse("8.0.28");
        let bundle = synthesize(&request(&table, &version)).unwrap();
        assert!(bundle.create_table.ends_with(") ENGINE=InnoDB"));

        table.columns.clear();
        let err = synthesize(&request(&table, &version)).unwrap_err();
        assert!(matches!(err, ReverseError::EmptyTable { .. }));
    }

    #[test]
    fn test_custom_rule_applies_to_table_columns() {
        let table = make_table();
        let version = VersionInfo::parse("8.0.28");
        let custom = vec![crate::config::CustomColumnRule {
            table: Some("ORDERS".to_string()),
            column: "ID".to_string(),
            source_type: "NUMBER(10)".to_string(),
            target_type: "BIGINT UNSIGNED".to_string(),
        }];
        let mut req = request(&table, &version);
        req.rules = OverrideRules {
            plan: &[],
            custom: &custom,
        };
        let bundle = synthesize(&req).unwrap();
        assert!(bundle.create_table.contains("`id` bigint unsigned NOT NULL"));
        assert!(bundle.create_table.contains("`customer_id` bigint,"));
    }
}
