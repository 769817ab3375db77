use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleQuery {
    name: String,
    sql: String,
    source_url: Option<Url>,
}

impl SampleQuery {
    pub fn new(name: String, sql: String, source_url: Option<Url>) -> Self {
        Self {
            name,
            sql,
            source_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn source_url(&self) -> Option<&Url> {
        self.source_url.as_ref()
    }

    /// Case-insensitive check for the table name appearing anywhere in the
    /// query text. An approximation of "references this table": it also
    /// matches comments and CTE bodies.
    pub fn mentions_table(&self, table_name: &str) -> bool {
        self.sql
            .to_lowercase()
            .contains(&table_name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_table_is_case_insensitive() {
        let query = SampleQuery::new(
            "daily_sales".to_string(),
            "SELECT * FROM Orders WHERE amount > 0".to_string(),
            None,
        );

        assert!(query.mentions_table("orders"));
        assert!(query.mentions_table("ORDERS"));
        assert!(!query.mentions_table("customers"));
    }
}
