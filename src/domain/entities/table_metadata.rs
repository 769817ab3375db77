use serde::{Deserialize, Serialize};

/// Column list embedded in JSON-encoded metadata descriptions.
///
/// The metadata batch stores descriptions as JSON documents; older stores
/// hold free text. Both shapes are accepted at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    table_name: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    columns: Vec<ColumnDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ColumnDocument {
    column_name: String,
    #[serde(default)]
    column_type: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    name: String,
    description: String,
    columns: Vec<String>,
}

impl TableMetadata {
    /// Build a typed record from a stored description. JSON-encoded
    /// descriptions contribute a parsed column list; free-text descriptions
    /// keep an empty one.
    pub fn new(name: String, description: String) -> Self {
        let columns = serde_json::from_str::<MetadataDocument>(&description)
            .map(|doc| doc.columns.into_iter().map(|c| c.column_name).collect())
            .unwrap_or_default();

        Self {
            name,
            description,
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The LLM-facing text blob. Kept separate from the internal record so
    /// the prompt format can change without touching storage.
    pub fn prompt_text(&self) -> &str {
        &self.description
    }
}
