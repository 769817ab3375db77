use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{EmbeddingProvider, ModelGateway};
use crate::application::services::{PromptLoader, Text2SqlService};
use crate::application::services::text2sql_service::{DEFAULT_K_QUERIES, DEFAULT_K_TABLES};
use crate::application::use_cases::{
    GenerateSqlQueryUseCase, IngestStoresUseCase, RegisterRagDocumentsUseCase,
};
use crate::domain::repositories::{
    SampleQueryRepository, TableMetadataRepository, VectorStoreRepository,
};
use crate::infrastructure::database::repositories::{
    SqliteSampleQueryRepository, SqliteTableMetadataRepository, SqliteVectorStoreRepository,
};
use crate::infrastructure::database::{
    create_connection_pool, get_connection_from_pool, run_migrations,
};
use crate::infrastructure::external_services::OpenAiClient;
use crate::infrastructure::file_system::{FileSampleQueryRepository, FileTableMetadataRepository};

/// Which backing holds table metadata and sample queries. Embedding vectors
/// always live in the embedded database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Files,
    EmbeddedDb,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub storage_backend: StorageBackend,
    pub metadata_dir: PathBuf,
    pub queries_dir: PathBuf,
    pub prompt_template_path: PathBuf,
    pub k_tables: usize,
    pub k_queries: usize,
    pub create_database_if_missing: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let storage_backend = match std::env::var("TEXT2SQL_STORAGE_BACKEND")
            .unwrap_or_else(|_| "embedded-db".to_string())
            .as_str()
        {
            "embedded-db" => StorageBackend::EmbeddedDb,
            "files" => StorageBackend::Files,
            other => {
                return Err(format!(
                    "Unknown TEXT2SQL_STORAGE_BACKEND: {} (expected embedded-db or files)",
                    other
                ));
            }
        };

        Ok(Self {
            database_path: std::env::var("TEXT2SQL_DATABASE_PATH")
                .unwrap_or_else(|_| "text2sql.db".to_string()),
            storage_backend,
            metadata_dir: PathBuf::from(
                std::env::var("TEXT2SQL_METADATA_DIR")
                    .unwrap_or_else(|_| "data/table_metadata".to_string()),
            ),
            queries_dir: PathBuf::from(
                std::env::var("TEXT2SQL_QUERIES_DIR")
                    .unwrap_or_else(|_| "data/sample_queries".to_string()),
            ),
            prompt_template_path: PathBuf::from(
                std::env::var("TEXT2SQL_PROMPT_TEMPLATE")
                    .unwrap_or_else(|_| "prompts/generate_sql_prompt.txt".to_string()),
            ),
            k_tables: DEFAULT_K_TABLES,
            k_queries: DEFAULT_K_QUERIES,
            create_database_if_missing: false,
        })
    }
}

pub struct AppContainer {
    // Repositories
    pub table_metadata_repository: Arc<dyn TableMetadataRepository>,
    pub sample_query_repository: Arc<dyn SampleQueryRepository>,
    pub vector_store: Arc<dyn VectorStoreRepository>,

    // External services
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub model_gateway: Arc<dyn ModelGateway>,

    // Application services
    pub text2sql_service: Arc<Text2SqlService>,

    // Use cases
    pub generate_sql_query_use_case: Arc<GenerateSqlQueryUseCase>,
    pub ingest_stores_use_case: Arc<IngestStoresUseCase>,
    pub register_rag_documents_use_case: Arc<RegisterRagDocumentsUseCase>,
}

impl AppContainer {
    /// Construct every client and repository once and wire them together.
    /// Configuration problems (missing credentials, missing stores, missing
    /// prompt template) surface here, before any request is taken.
    pub fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // Open the embedded database and bring the schema up to date
        let db_pool =
            create_connection_pool(&config.database_path, config.create_database_if_missing)?;
        let mut conn = get_connection_from_pool(&db_pool)?;
        run_migrations(&mut conn)?;
        drop(conn);

        // One OpenAI client serves both ports
        let openai_client = Arc::new(OpenAiClient::from_env()?);
        let embedding_provider: Arc<dyn EmbeddingProvider> = openai_client.clone();
        let model_gateway: Arc<dyn ModelGateway> = openai_client;

        // Create repositories for the configured backing
        let (table_metadata_repository, sample_query_repository): (
            Arc<dyn TableMetadataRepository>,
            Arc<dyn SampleQueryRepository>,
        ) = match config.storage_backend {
            StorageBackend::EmbeddedDb => (
                Arc::new(SqliteTableMetadataRepository::new(db_pool.clone())),
                Arc::new(SqliteSampleQueryRepository::new(db_pool.clone())),
            ),
            StorageBackend::Files => (
                Arc::new(FileTableMetadataRepository::new(&config.metadata_dir)?),
                Arc::new(FileSampleQueryRepository::new(&config.queries_dir)?),
            ),
        };

        let vector_store: Arc<dyn VectorStoreRepository> = Arc::new(
            SqliteVectorStoreRepository::new(db_pool, embedding_provider.clone()),
        );

        // Create application services
        let prompt_template = PromptLoader::new(&config.prompt_template_path).load()?;
        let text2sql_service = Arc::new(
            Text2SqlService::new(
                vector_store.clone(),
                table_metadata_repository.clone(),
                sample_query_repository.clone(),
                model_gateway.clone(),
                prompt_template,
            )
            .with_retrieval_limits(config.k_tables, config.k_queries),
        );

        // Create use cases
        let generate_sql_query_use_case =
            Arc::new(GenerateSqlQueryUseCase::new(text2sql_service.clone()));
        let ingest_stores_use_case = Arc::new(IngestStoresUseCase::new(
            table_metadata_repository.clone(),
            sample_query_repository.clone(),
        ));
        let register_rag_documents_use_case = Arc::new(RegisterRagDocumentsUseCase::new(
            table_metadata_repository.clone(),
            sample_query_repository.clone(),
            vector_store.clone(),
            model_gateway.clone(),
        ));

        Ok(Self {
            table_metadata_repository,
            sample_query_repository,
            vector_store,
            embedding_provider,
            model_gateway,
            text2sql_service,
            generate_sql_query_use_case,
            ingest_stores_use_case,
            register_rag_documents_use_case,
        })
    }
}
