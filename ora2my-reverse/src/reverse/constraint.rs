//! Primary, unique, foreign key and check constraint rendering

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::naming::{quote_column_list, quote_ident, quote_table};
use crate::catalog::{CheckDescriptor, ForeignKeyDescriptor, KeyDescriptor};
use crate::error::{ReverseError, Result};

static LOGICAL_OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?i:AND)\s+|\s+(?i:OR)\s+").expect("valid logical operator pattern")
});

static NOT_NULL_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^.*)(?i:IS NOT NULL)").expect("valid not null pattern"));

/// ON DELETE behaviour of a foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRule {
    NoAction,
    Cascade,
    SetNull,
    /// A rule MySQL output is not generated for, e.g. `SET DEFAULT`
    Unhandled(String),
}

impl DeleteRule {
    pub fn parse(rule: &str) -> Self {
        match rule.trim().to_uppercase().as_str() {
            "" | "NO ACTION" => DeleteRule::NoAction,
            "CASCADE" => DeleteRule::Cascade,
            "SET NULL" => DeleteRule::SetNull,
            _ => DeleteRule::Unhandled(rule.trim().to_string()),
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            DeleteRule::Cascade => " ON DELETE CASCADE",
            DeleteRule::SetNull => " ON DELETE SET NULL",
            DeleteRule::NoAction | DeleteRule::Unhandled(_) => "",
        }
    }
}

impl fmt::Display for DeleteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteRule::NoAction => f.write_str("NO ACTION"),
            DeleteRule::Cascade => f.write_str("CASCADE"),
            DeleteRule::SetNull => f.write_str("SET NULL"),
            DeleteRule::Unhandled(rule) => f.write_str(rule),
        }
    }
}

/// A rendered foreign key together with its parsed delete rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyClause {
    pub name: String,
    pub clause: String,
    pub delete_rule: DeleteRule,
}

/// `ALTER TABLE ... ADD <clause>`
pub fn alter_table_add(schema: &str, table: &str, clause: &str) -> String {
    format!("ALTER TABLE {} ADD {}", quote_table(schema, table), clause)
}

/// Primary key clause embedded in the CREATE TABLE body
///
/// No descriptor means no primary key; more than one is ambiguous.
pub fn primary_key_clause(schema: &str, table: &str, keys: &[KeyDescriptor]) -> Result<Option<String>> {
    match keys {
        [] => Ok(None),
        [pk] => Ok(Some(format!(
            "PRIMARY KEY ({})",
            quote_column_list(&pk.column_list)
        ))),
        _ => Err(ReverseError::AmbiguousPrimaryKey {
            schema: schema.to_string(),
            table: table.to_string(),
            rows: keys
                .iter()
                .map(|k| format!("{}({})", k.constraint_name, k.column_list.join(",")))
                .collect(),
        }),
    }
}

/// One `UNIQUE `name` (cols)` clause per unique key
pub fn unique_key_clauses(keys: &[KeyDescriptor]) -> Vec<String> {
    keys.iter()
        .map(|uk| {
            format!(
                "UNIQUE {} ({})",
                quote_ident(&uk.constraint_name),
                quote_column_list(&uk.column_list)
            )
        })
        .collect()
}

/// One `CONSTRAINT ... FOREIGN KEY ... REFERENCES ...` clause per foreign key
pub fn foreign_key_clauses(keys: &[ForeignKeyDescriptor]) -> Vec<ForeignKeyClause> {
    keys.iter()
        .map(|fk| {
            let delete_rule = DeleteRule::parse(&fk.delete_rule);
            let clause = format!(
                "CONSTRAINT {} FOREIGN KEY({}) REFERENCES {}({}){}",
                quote_ident(&fk.constraint_name),
                quote_column_list(&fk.column_list),
                quote_table(&fk.r_owner, &fk.r_table_name),
                quote_column_list(&fk.r_column_list),
                delete_rule.suffix()
            );
            ForeignKeyClause {
                name: fk.constraint_name.clone(),
                clause,
                delete_rule,
            }
        })
        .collect()
}

/// `(constraint name, CONSTRAINT `name` CHECK (...))` per check constraint that survives decomposition
pub fn check_clauses(checks: &[CheckDescriptor]) -> Vec<(&str, String)> {
    checks
        .iter()
        .filter_map(|ck| {
            decompose_check(&ck.search_condition).map(|pred| {
                (
                    ck.constraint_name.as_str(),
                    format!("CONSTRAINT {} CHECK ({})", quote_ident(&ck.constraint_name), pred),
                )
            })
        })
        .collect()
}

/// Strip NOT NULL sub-clauses from a check predicate
///
/// Returns `None` when nothing but NOT NULL clauses remain. The match is
/// textual: a literal containing `IS NOT NULL` is treated as a NOT NULL clause.
pub fn decompose_check(search_condition: &str) -> Option<String> {
    let predicate = search_condition.trim();

    if !LOGICAL_OPERATOR.is_match(predicate) {
        if predicate.is_empty() || NOT_NULL_CLAUSE.is_match(predicate) {
            return None;
        }
        return Some(predicate.to_string());
    }

    let tokens: Vec<&str> = predicate.split_whitespace().collect();

    // Each later segment starts with the operator that joins it to the previous one.
    let mut bounds: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| is_logical_operator(t))
        .map(|(i, _)| i)
        .collect();
    bounds.push(tokens.len());

    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut start = 0;
    for end in bounds {
        let segment = &tokens[start..end];
        start = end;
        if segment.is_empty() || NOT_NULL_CLAUSE.is_match(&segment.join(" ")) {
            continue;
        }
        kept.extend_from_slice(segment);
    }

    if kept.first().is_some_and(|t| is_logical_operator(t)) {
        kept.remove(0);
    }
    if kept.last().is_some_and(|t| is_logical_operator(t)) {
        kept.pop();
    }

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(" "))
    }
}

fn is_logical_operator(token: &str) -> bool {
    token.eq_ignore_ascii_case("AND") || token.eq_ignore_ascii_case("OR")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key(name: &str, cols: &[&str]) -> KeyDescriptor {
        KeyDescriptor {
            constraint_name: name.to_string(),
            column_list: cols.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn make_fk(name: &str, rule: &str) -> ForeignKeyDescriptor {
        ForeignKeyDescriptor {
            constraint_name: name.to_string(),
            column_list: vec!["CUSTOMER_ID".to_string()],
            r_owner: "MARVIN".to_string(),
            r_table_name: "CUSTOMERS".to_string(),
            r_column_list: vec!["ID".to_string()],
            delete_rule: rule.to_string(),
        }
    }

    #[test]
    fn test_primary_key_clause() {
        assert_eq!(primary_key_clause("S", "T", &[]).unwrap(), None);

        let pk = [make_key("PK_T", &["ID", "TENANT"])];
        assert_eq!(
            primary_key_clause("S", "T", &pk).unwrap().as_deref(),
            Some("PRIMARY KEY (`id`,`tenant`)")
        );
    }

    #[test]
    fn test_two_primary_keys_are_ambiguous() {
        let pks = [make_key("PK_A", &["ID"]), make_key("PK_B", &["CODE"])];
        match primary_key_clause("MARVIN", "T", &pks).unwrap_err() {
            ReverseError::AmbiguousPrimaryKey { table, rows, .. } => {
                assert_eq!(table, "T");
                assert_eq!(rows, vec!["PK_A(ID)", "PK_B(CODE)"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unique_key_statement() {
        let uks = [make_key("UK_EMAIL", &["EMAIL"])];
        let clauses = unique_key_clauses(&uks);
        assert_eq!(
            alter_table_add("steven", "users", &clauses[0]),
            "ALTER TABLE `steven`.`users` ADD UNIQUE `uk_email` (`email`)"
        );
    }

    #[test]
    fn test_foreign_key_delete_rules() {
        let fks = [
            make_fk("FK_A", ""),
            make_fk("FK_B", "NO ACTION"),
            make_fk("FK_C", "CASCADE"),
            make_fk("FK_D", "SET NULL"),
            make_fk("FK_E", "SET DEFAULT"),
        ];
        let clauses = foreign_key_clauses(&fks);
        assert_eq!(
            clauses[0].clause,
            "CONSTRAINT `fk_a` FOREIGN KEY(`customer_id`) REFERENCES `marvin`.`customers`(`id`)"
        );
        assert_eq!(clauses[1].delete_rule, DeleteRule::NoAction);
        assert!(clauses[2].clause.ends_with(" ON DELETE CASCADE"));
        assert!(clauses[3].clause.ends_with(" ON DELETE SET NULL"));
        assert_eq!(clauses[4].delete_rule, DeleteRule::Unhandled("SET DEFAULT".to_string()));
        assert_eq!(clauses[4].delete_rule.to_string(), "SET DEFAULT");
        assert!(clauses[4].clause.ends_with("(`id`)"));
    }

    #[test]
    fn test_atomic_check_is_unchanged() {
        assert_eq!(
            decompose_check("  STATUS IN ('A','B') ").as_deref(),
            Some("STATUS IN ('A','B')")
        );
        assert_eq!(decompose_check("\"LOC\" IS NOT NULL"), None);
    }

    #[test]
    fn test_not_null_segment_is_removed() {
        assert_eq!(
            decompose_check("\"LOC\" IS NOT NULL AND LOC IN ('a','b','c')").as_deref(),
            Some("LOC IN ('a','b','c')")
        );
        assert_eq!(
            decompose_check("AMOUNT > 0 and \"AMOUNT\" is not null").as_deref(),
            Some("AMOUNT > 0")
        );
    }

    #[test]
    fn test_operators_travel_with_following_clause() {
        assert_eq!(
            decompose_check("A > 0 AND B IS NOT NULL OR C < 5").as_deref(),
            Some("A > 0 OR C < 5")
        );
    }

    #[test]
    fn test_all_not_null_segments_emit_nothing() {
        assert_eq!(decompose_check("A IS NOT NULL AND B IS NOT NULL"), None);
        let checks = [CheckDescriptor {
            constraint_name: "CK_X".to_string(),
            search_condition: "A IS NOT NULL AND B IS NOT NULL".to_string(),
        }];
        assert!(check_clauses(&checks).is_empty());
    }

    #[test]
    fn test_not_null_inside_literal_is_misclassified() {
        // Textual heuristic: the literal is mistaken for a NOT NULL clause.
        assert_eq!(decompose_check("NOTE <> 'X IS NOT NULL'"), None);
    }

    #[test]
    fn test_check_clause_rendering() {
        let checks = [CheckDescriptor {
            constraint_name: "CK_STATUS".to_string(),
            search_condition: "STATUS IN ('A','B')".to_string(),
        }];
        assert_eq!(
            check_clauses(&checks),
            vec![("CK_STATUS", "CONSTRAINT `ck_status` CHECK (STATUS IN ('A','B'))".to_string())]
        );
    }
}
