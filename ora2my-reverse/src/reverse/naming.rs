//! Identifier rendering shared by every statement builder

/// Lower-case and backtick-quote an identifier
/// e.g., "ORDER_ID" -> "`order_id`"
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.trim().to_lowercase().replace('`', "``"))
}

/// Quote a schema-qualified table name
/// e.g., ("MARVIN", "ORDERS") -> "`marvin`.`orders`"
pub fn quote_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Quote and comma-join a column list without spaces
/// e.g., ["ID", "NAME"] -> "`id`,`name`"
pub fn quote_column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Plain `schema.table` text used in banners and log lines
pub fn display_table(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("ORDER_ID"), "`order_id`");
        assert_eq!(quote_ident(" Mixed "), "`mixed`");
        assert_eq!(quote_ident("A`B"), "`a``b`");
    }

    #[test]
    fn test_quote_table() {
        assert_eq!(quote_table("MARVIN", "ORDERS"), "`marvin`.`orders`");
    }

    #[test]
    fn test_quote_column_list() {
        let cols = vec!["ID".to_string(), "CREATED_AT".to_string()];
        assert_eq!(quote_column_list(&cols), "`id`,`created_at`");
        assert_eq!(quote_column_list(&[]), "");
    }
}
