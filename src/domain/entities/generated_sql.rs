use serde::{Deserialize, Serialize};

/// The per-request output pair. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSql {
    pub query: String,
    pub explanation: String,
}

impl GeneratedSql {
    pub fn new(query: String, explanation: String) -> Self {
        Self { query, explanation }
    }
}
