use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::entities::TableMetadata;
use crate::domain::repositories::TableMetadataRepository;
use crate::domain::repositories::table_metadata_repository::TableMetadataRepositoryError;
use crate::infrastructure::file_system::list_file_stems;

/// Flat-file metadata store: one `<table_name>.txt` per table.
pub struct FileTableMetadataRepository {
    metadata_dir: PathBuf,
}

impl FileTableMetadataRepository {
    pub fn new(metadata_dir: &Path) -> Result<Self, TableMetadataRepositoryError> {
        if !metadata_dir.is_dir() {
            return Err(TableMetadataRepositoryError::StorageError(format!(
                "Metadata directory not found: {}",
                metadata_dir.display()
            )));
        }
        Ok(Self {
            metadata_dir: metadata_dir.to_path_buf(),
        })
    }

    fn read_entry(&self, name: &str) -> Result<TableMetadata, TableMetadataRepositoryError> {
        let path = self.metadata_dir.join(format!("{}.txt", name));
        let content = std::fs::read_to_string(&path)
            .map_err(|e| TableMetadataRepositoryError::StorageError(e.to_string()))?;
        Ok(TableMetadata::new(name.to_string(), content))
    }
}

#[async_trait]
impl TableMetadataRepository for FileTableMetadataRepository {
    async fn get(
        &self,
        table_names: &[String],
    ) -> Result<Vec<TableMetadata>, TableMetadataRepositoryError> {
        let available = list_file_stems(&self.metadata_dir, "txt")
            .map_err(TableMetadataRepositoryError::StorageError)?;

        let mut results = Vec::new();
        for name in table_names {
            if !available.contains(name) {
                log::warn!(
                    "Schema file not found for table: {} (available tables: {:?})",
                    name,
                    available
                );
                continue;
            }
            results.push(self.read_entry(name)?);
        }
        Ok(results)
    }

    async fn get_all(&self) -> Result<Vec<TableMetadata>, TableMetadataRepositoryError> {
        let available = list_file_stems(&self.metadata_dir, "txt")
            .map_err(TableMetadataRepositoryError::StorageError)?;

        available.iter().map(|name| self.read_entry(name)).collect()
    }

    async fn put(&self, metadata: &TableMetadata) -> Result<(), TableMetadataRepositoryError> {
        let path = self.metadata_dir.join(format!("{}.txt", metadata.name()));
        std::fs::write(&path, metadata.description())
            .map_err(|e| TableMetadataRepositoryError::StorageError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileTableMetadataRepository::new(dir.path()).unwrap();
        let metadata = TableMetadata::new("orders".to_string(), "orders facts".to_string());

        repository.put(&metadata).await.unwrap();
        let fetched = repository.get(&["orders".to_string()]).await.unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].name(), "orders");
        assert_eq!(fetched[0].description(), "orders facts");
    }

    #[tokio::test]
    async fn test_missing_name_is_skipped_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileTableMetadataRepository::new(dir.path()).unwrap();

        let fetched = repository.get(&["ghost".to_string()]).await.unwrap();

        assert!(fetched.is_empty());
    }

    #[test]
    fn test_missing_directory_is_a_startup_error() {
        let result = FileTableMetadataRepository::new(Path::new("/nonexistent/metadata"));

        assert!(matches!(
            result,
            Err(TableMetadataRepositoryError::StorageError(_))
        ));
    }
}
