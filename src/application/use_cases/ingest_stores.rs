use std::path::Path;
use std::sync::Arc;

use crate::domain::entities::{SampleQuery, TableMetadata};
use crate::domain::repositories::{SampleQueryRepository, TableMetadataRepository};

#[derive(Debug)]
pub enum IngestStoresError {
    DirectoryNotFound(String),
    IoError(String),
    RepositoryError(String),
}

impl std::fmt::Display for IngestStoresError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestStoresError::DirectoryNotFound(path) => {
                write!(f, "Directory not found: {}", path)
            }
            IngestStoresError::IoError(msg) => write!(f, "IO error: {}", msg),
            IngestStoresError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for IngestStoresError {}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestSummary {
    pub tables_ingested: usize,
    pub queries_ingested: usize,
}

/// Offline batch: load flat metadata/query files into the backing stores.
///
/// Metadata files are `<table_name>.txt`, sample queries `<query_name>.sql`;
/// the file stem becomes the record name, matching how the stores were
/// originally seeded from a data directory.
pub struct IngestStoresUseCase {
    table_metadata_repository: Arc<dyn TableMetadataRepository>,
    sample_query_repository: Arc<dyn SampleQueryRepository>,
}

impl IngestStoresUseCase {
    pub fn new(
        table_metadata_repository: Arc<dyn TableMetadataRepository>,
        sample_query_repository: Arc<dyn SampleQueryRepository>,
    ) -> Self {
        Self {
            table_metadata_repository,
            sample_query_repository,
        }
    }

    pub async fn execute(
        &self,
        metadata_dir: &Path,
        queries_dir: &Path,
    ) -> Result<IngestSummary, IngestStoresError> {
        let tables_ingested = self.ingest_table_metadata(metadata_dir).await?;
        let queries_ingested = self.ingest_sample_queries(queries_dir).await?;

        Ok(IngestSummary {
            tables_ingested,
            queries_ingested,
        })
    }

    async fn ingest_table_metadata(&self, metadata_dir: &Path) -> Result<usize, IngestStoresError> {
        let mut count = 0;
        for (name, content) in read_files_with_extension(metadata_dir, "txt")? {
            let metadata = TableMetadata::new(name.clone(), content);
            self.table_metadata_repository
                .put(&metadata)
                .await
                .map_err(|e| IngestStoresError::RepositoryError(e.to_string()))?;
            log::info!("Ingested table metadata: {}", name);
            count += 1;
        }
        Ok(count)
    }

    async fn ingest_sample_queries(&self, queries_dir: &Path) -> Result<usize, IngestStoresError> {
        let mut count = 0;
        for (name, content) in read_files_with_extension(queries_dir, "sql")? {
            let query = SampleQuery::new(name.clone(), content, None);
            self.sample_query_repository
                .put(&query)
                .await
                .map_err(|e| IngestStoresError::RepositoryError(e.to_string()))?;
            log::info!("Ingested sample query: {}", name);
            count += 1;
        }
        Ok(count)
    }
}

/// Stem/content pairs for every `*.{extension}` file, in name order.
fn read_files_with_extension(
    dir: &Path,
    extension: &str,
) -> Result<Vec<(String, String)>, IngestStoresError> {
    if !dir.is_dir() {
        return Err(IngestStoresError::DirectoryNotFound(
            dir.display().to_string(),
        ));
    }

    let mut entries = Vec::new();
    let dir_entries =
        std::fs::read_dir(dir).map_err(|e| IngestStoresError::IoError(e.to_string()))?;
    for entry in dir_entries {
        let path = entry
            .map_err(|e| IngestStoresError::IoError(e.to_string()))?
            .path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content =
            std::fs::read_to_string(&path).map_err(|e| IngestStoresError::IoError(e.to_string()))?;
        entries.push((stem.to_string(), content));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
