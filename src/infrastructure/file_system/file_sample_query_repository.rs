use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::entities::SampleQuery;
use crate::domain::repositories::SampleQueryRepository;
use crate::domain::repositories::sample_query_repository::SampleQueryRepositoryError;
use crate::infrastructure::file_system::list_file_stems;

/// Flat-file query store: one `<query_name>.sql` per sample query.
/// Files carry no source URL; that field only exists in the database
/// backing.
pub struct FileSampleQueryRepository {
    query_dir: PathBuf,
}

impl FileSampleQueryRepository {
    pub fn new(query_dir: &Path) -> Result<Self, SampleQueryRepositoryError> {
        if !query_dir.is_dir() {
            return Err(SampleQueryRepositoryError::StorageError(format!(
                "Sample query directory not found: {}",
                query_dir.display()
            )));
        }
        Ok(Self {
            query_dir: query_dir.to_path_buf(),
        })
    }

    fn read_entry(&self, name: &str) -> Result<SampleQuery, SampleQueryRepositoryError> {
        let path = self.query_dir.join(format!("{}.sql", name));
        let content = std::fs::read_to_string(&path)
            .map_err(|e| SampleQueryRepositoryError::StorageError(e.to_string()))?;
        Ok(SampleQuery::new(name.to_string(), content, None))
    }
}

#[async_trait]
impl SampleQueryRepository for FileSampleQueryRepository {
    async fn get(
        &self,
        query_names: &[String],
    ) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
        let available = list_file_stems(&self.query_dir, "sql")
            .map_err(SampleQueryRepositoryError::StorageError)?;

        let mut results = Vec::new();
        for name in query_names {
            if !available.contains(name) {
                return Err(SampleQueryRepositoryError::NotFound(format!(
                    "{} (available queries: {:?})",
                    name, available
                )));
            }
            results.push(self.read_entry(name)?);
        }
        Ok(results)
    }

    async fn get_all(&self) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
        let available = list_file_stems(&self.query_dir, "sql")
            .map_err(SampleQueryRepositoryError::StorageError)?;

        available.iter().map(|name| self.read_entry(name)).collect()
    }

    async fn put(&self, query: &SampleQuery) -> Result<(), SampleQueryRepositoryError> {
        let path = self.query_dir.join(format!("{}.sql", query.name()));
        std::fs::write(&path, query.sql())
            .map_err(|e| SampleQueryRepositoryError::StorageError(e.to_string()))
    }

    async fn retrieve_by_table_name(
        &self,
        table_name: &str,
    ) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|query| query.mentions_table(table_name))
            .collect())
    }
}
