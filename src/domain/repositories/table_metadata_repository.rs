use async_trait::async_trait;

use crate::domain::entities::TableMetadata;

#[derive(Debug)]
pub enum TableMetadataRepositoryError {
    StorageError(String),
    ValidationError(String),
}

impl std::fmt::Display for TableMetadataRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableMetadataRepositoryError::StorageError(msg) => {
                write!(f, "Storage error: {}", msg)
            }
            TableMetadataRepositoryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for TableMetadataRepositoryError {}

/// Lookup of table metadata by name.
///
/// `get` keeps the order of the requested names and silently drops names
/// that are not in the store, logging a warning for each. Metadata is prompt
/// context: a missing entry degrades the prompt, it does not fail the
/// request.
#[async_trait]
pub trait TableMetadataRepository: Send + Sync {
    async fn get(
        &self,
        table_names: &[String],
    ) -> Result<Vec<TableMetadata>, TableMetadataRepositoryError>;

    async fn get_all(&self) -> Result<Vec<TableMetadata>, TableMetadataRepositoryError>;

    /// Insert or overwrite the record for `metadata.name()`.
    async fn put(&self, metadata: &TableMetadata) -> Result<(), TableMetadataRepositoryError>;
}
