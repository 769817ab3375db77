use async_trait::async_trait;

use crate::domain::entities::SampleQuery;

#[derive(Debug)]
pub enum SampleQueryRepositoryError {
    NotFound(String),
    StorageError(String),
    ValidationError(String),
}

impl std::fmt::Display for SampleQueryRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleQueryRepositoryError::NotFound(name) => {
                write!(f, "Sample query not found: {}", name)
            }
            SampleQueryRepositoryError::StorageError(msg) => {
                write!(f, "Storage error: {}", msg)
            }
            SampleQueryRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SampleQueryRepositoryError {}

/// Lookup of curated sample queries by name.
///
/// Unlike table metadata, `get` fails with `NotFound` when a requested name
/// is absent: sample-query names come from the vector store, and a dangling
/// reference means the stores have drifted apart.
#[async_trait]
pub trait SampleQueryRepository: Send + Sync {
    async fn get(
        &self,
        query_names: &[String],
    ) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError>;

    async fn get_all(&self) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError>;

    /// Insert or overwrite the record for `query.name()`.
    async fn put(&self, query: &SampleQuery) -> Result<(), SampleQueryRepositoryError>;

    /// Case-insensitive substring match of the table name against stored
    /// query text. Approximate: it also matches comments and CTE bodies.
    async fn retrieve_by_table_name(
        &self,
        table_name: &str,
    ) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError>;
}
