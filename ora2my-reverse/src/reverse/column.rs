//! Column clause rendering

use std::sync::LazyLock;

use regex::Regex;

use super::naming::quote_ident;
use crate::catalog::ColumnDescriptor;

static SINGLE_QUOTED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(.*)'").expect("valid single-quoted run pattern"));

/// Quote a column or table comment as a string literal
///
/// Double quotes become single quotes. If the result then holds a
/// single-quoted run, the whole text is wrapped in double quotes so the
/// literal stays terminated; otherwise it is wrapped in single quotes.
pub fn quote_comment(text: &str) -> String {
    let text = text.replace('"', "'");
    if SINGLE_QUOTED_RUN.is_match(&text) {
        format!("\"{}\"", text)
    } else {
        format!("'{}'", text)
    }
}

/// Render one column definition for the CREATE TABLE body
/// e.g., "`created_at` datetime NOT NULL DEFAULT SYSDATE COMMENT 'creation time'"
pub fn render_column(column: &ColumnDescriptor, target_type: &str) -> String {
    let mut clause = format!(
        "{} {}",
        quote_ident(&column.column_name),
        target_type.trim().to_lowercase()
    );

    if !column.is_nullable() {
        clause.push_str(" NOT NULL");
    }

    let default = column.data_default.trim();
    if !default.is_empty() {
        clause.push_str(" DEFAULT ");
        clause.push_str(default);
    }

    if !column.comments.is_empty() {
        clause.push_str(" COMMENT ");
        clause.push_str(&quote_comment(&column.comments));
    }

    clause
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_column(name: &str, data_type: &str, nullable: &str, default: &str, comment: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            column_name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: nullable.to_string(),
            data_length: "0".to_string(),
            data_precision: "0".to_string(),
            data_scale: "0".to_string(),
            data_default: default.to_string(),
            comments: comment.to_string(),
        }
    }

    #[test]
    fn test_not_null_date_column() {
        let col = make_column("COLNAME", "DATE", "N", "", "");
        assert_eq!(render_column(&col, "DATETIME"), "`colname` datetime NOT NULL");
    }

    #[test]
    fn test_default_and_comment_combinations() {
        let plain = make_column("A", "NUMBER", "Y", "", "");
        assert_eq!(render_column(&plain, "INT"), "`a` int");

        let with_default = make_column("A", "NUMBER", "Y", "0 ", "");
        assert_eq!(render_column(&with_default, "INT"), "`a` int DEFAULT 0");

        let with_comment = make_column("A", "NUMBER", "Y", "", "amount");
        assert_eq!(render_column(&with_comment, "INT"), "`a` int COMMENT 'amount'");

        let both = make_column("A", "NUMBER", "N", "1", "amount");
        assert_eq!(
            render_column(&both, "INT"),
            "`a` int NOT NULL DEFAULT 1 COMMENT 'amount'"
        );
    }

    #[test]
    fn test_anything_but_y_is_not_null() {
        let col = make_column("A", "DATE", "", "", "");
        assert_eq!(render_column(&col, "DATETIME"), "`a` datetime NOT NULL");
    }

    #[test]
    fn test_quote_comment() {
        assert_eq!(quote_comment("plain text"), "'plain text'");
        assert_eq!(quote_comment("status 'A' or 'B'"), "\"status 'A' or 'B'\"");
        assert_eq!(quote_comment("say \"hi\""), "\"say 'hi'\"");
    }

    #[test]
    fn test_lone_apostrophe_leaves_literal_unterminated() {
        // Only a quoted run switches to double quotes; a lone apostrophe is not escaped.
        assert_eq!(quote_comment("it's"), "'it's'");
        assert_eq!(quote_comment("customer's name"), "'customer's name'");

        let col = make_column("NAME", "VARCHAR2", "Y", "", "customer's name");
        assert_eq!(
            render_column(&col, "VARCHAR(100)"),
            "`name` varchar(100) COMMENT 'customer's name'"
        );
    }
}
