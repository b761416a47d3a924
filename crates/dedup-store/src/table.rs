//! Qualified Postgres table names.

use crate::error::StoreError;

/// Fully-qualified Postgres table name (schema + table).
#[derive(Debug, Clone)]
pub struct TableName {
    schema: String,
    table: String,
}

impl TableName {
    /// Builds a new table identifier.
    pub fn new<S, T>(schema: S, table: T) -> Result<Self, StoreError>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let schema = schema.into();
        let table = table.into();
        if schema.trim().is_empty() {
            return Err(StoreError::InvalidIdentifier(
                "schema name is required".to_string(),
            ));
        }
        if table.trim().is_empty() {
            return Err(StoreError::InvalidIdentifier(
                "table name is required".to_string(),
            ));
        }
        Ok(Self { schema, table })
    }

    /// Fully-qualified table reference with quoted identifiers.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }

    /// Index name used for the embedding ANN index.
    pub fn embedding_index_name(&self) -> String {
        quote_ident(&format!(
            "{}_{}_embedding_idx",
            sanitize_ident(&self.schema),
            sanitize_ident(&self.table)
        ))
    }
}

/// Quotes Postgres identifiers, escaping embedded quotes.
pub fn quote_ident(input: &str) -> String {
    let escaped = input.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

fn sanitize_ident(input: &str) -> String {
    input
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_quotes_both_parts() {
        let table = TableName::new("public", "messages").unwrap();
        assert_eq!(table.qualified(), r#""public"."messages""#);
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(TableName::new("", "t").is_err());
        assert!(TableName::new("public", " ").is_err());
    }

    #[test]
    fn test_embedding_index_name() {
        let table = TableName::new("public", "chat-logs").unwrap();
        assert_eq!(
            table.embedding_index_name(),
            r#""public_chat_logs_embedding_idx""#
        );
    }
}
