use std::sync::Arc;

use crate::application::ports::model_gateway::{
    FieldSpec, ModelGateway, OutputSchema, parse_structured,
};
use crate::application::services::prompt_loader::PromptTemplate;
use crate::domain::entities::{GeneratedSql, SampleQuery, TableMetadata};
use crate::domain::repositories::{
    SampleQueryRepository, TableMetadataRepository, VectorStoreRepository,
};

pub const TABLE_EMBEDDINGS_COLLECTION: &str = "table_embeddings";
pub const QUERY_EMBEDDINGS_COLLECTION: &str = "query_embeddings";

pub const DEFAULT_K_TABLES: usize = 20;
pub const DEFAULT_K_QUERIES: usize = 5;

#[derive(Debug)]
pub enum Text2SqlError {
    VectorStoreError(String),
    RepositoryError(String),
    GatewayError(String),
    PromptError(String),
}

impl std::fmt::Display for Text2SqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Text2SqlError::VectorStoreError(msg) => write!(f, "Vector store error: {}", msg),
            Text2SqlError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            Text2SqlError::GatewayError(msg) => write!(f, "Gateway error: {}", msg),
            Text2SqlError::PromptError(msg) => write!(f, "Prompt error: {}", msg),
        }
    }
}

impl std::error::Error for Text2SqlError {}

fn sql_output_schema() -> OutputSchema {
    OutputSchema::new(vec![
        FieldSpec::string(
            "query",
            "The generated SQL query. Write keywords in lowercase, break lines for \
             readability, start CTE names with an underscore and comment each step.",
        ),
        FieldSpec::string("explanation", "Explanation of the generated SQL query."),
    ])
}

/// Orchestrates the serving path: retrieve related tables, retrieve related
/// sample queries, assemble the prompt, call the model, return the pair.
///
/// Stateless; every call is independent and nothing is retried. Failures in
/// any step propagate unmodified to the caller.
pub struct Text2SqlService {
    vector_store: Arc<dyn VectorStoreRepository>,
    table_metadata_repository: Arc<dyn TableMetadataRepository>,
    sample_query_repository: Arc<dyn SampleQueryRepository>,
    model_gateway: Arc<dyn ModelGateway>,
    prompt_template: PromptTemplate,
    k_tables: usize,
    k_queries: usize,
}

impl Text2SqlService {
    pub fn new(
        vector_store: Arc<dyn VectorStoreRepository>,
        table_metadata_repository: Arc<dyn TableMetadataRepository>,
        sample_query_repository: Arc<dyn SampleQueryRepository>,
        model_gateway: Arc<dyn ModelGateway>,
        prompt_template: PromptTemplate,
    ) -> Self {
        Self {
            vector_store,
            table_metadata_repository,
            sample_query_repository,
            model_gateway,
            prompt_template,
            k_tables: DEFAULT_K_TABLES,
            k_queries: DEFAULT_K_QUERIES,
        }
    }

    pub fn with_retrieval_limits(mut self, k_tables: usize, k_queries: usize) -> Self {
        self.k_tables = k_tables;
        self.k_queries = k_queries;
        self
    }

    pub async fn process_query(
        &self,
        question: &str,
        dialect: &str,
    ) -> Result<GeneratedSql, Text2SqlError> {
        let tables = self.retrieve_related_tables(question).await?;
        log::info!(
            "Retrieved tables: {:?}",
            tables.iter().map(|t| t.name()).collect::<Vec<_>>()
        );
        let tables_metadata = tables
            .iter()
            .map(|t| t.prompt_text())
            .collect::<Vec<_>>()
            .join("\n\n");

        let sample_queries = self.retrieve_related_sample_queries(question).await?;
        log::info!(
            "Retrieved sample queries: {:?}",
            sample_queries.iter().map(|q| q.name()).collect::<Vec<_>>()
        );
        let related_sample_queries = sample_queries
            .iter()
            .map(|q| q.sql())
            .collect::<Vec<_>>()
            .join("\n\n");

        self.text2sql(question, dialect, &tables_metadata, &related_sample_queries)
            .await
    }

    /// Top-k table records for the question, in decreasing similarity order.
    /// Retrieved identifiers with no stored metadata are logged and dropped
    /// by the repository, not fatal.
    pub async fn retrieve_related_tables(
        &self,
        question: &str,
    ) -> Result<Vec<TableMetadata>, Text2SqlError> {
        let docs = self
            .vector_store
            .retrieve_relevant_docs(question, TABLE_EMBEDDINGS_COLLECTION, self.k_tables)
            .await
            .map_err(|e| Text2SqlError::VectorStoreError(e.to_string()))?;

        let names: Vec<String> = docs.into_iter().map(|d| d.doc_id).collect();
        self.table_metadata_repository
            .get(&names)
            .await
            .map_err(|e| Text2SqlError::RepositoryError(e.to_string()))
    }

    /// Top-k sample queries for the question. A retrieved identifier with no
    /// stored query text is a lookup failure: the vector store and the query
    /// store have drifted apart.
    pub async fn retrieve_related_sample_queries(
        &self,
        question: &str,
    ) -> Result<Vec<SampleQuery>, Text2SqlError> {
        let docs = self
            .vector_store
            .retrieve_relevant_docs(question, QUERY_EMBEDDINGS_COLLECTION, self.k_queries)
            .await
            .map_err(|e| Text2SqlError::VectorStoreError(e.to_string()))?;

        let names: Vec<String> = docs.into_iter().map(|d| d.doc_id).collect();
        self.sample_query_repository
            .get(&names)
            .await
            .map_err(|e| Text2SqlError::RepositoryError(e.to_string()))
    }

    async fn text2sql(
        &self,
        question: &str,
        dialect: &str,
        tables_metadata: &str,
        related_sample_queries: &str,
    ) -> Result<GeneratedSql, Text2SqlError> {
        // The question fills both original_query and question; the template
        // contract has carried both placeholders since its first version.
        let prompt = self
            .prompt_template
            .render(&[
                ("dialect", dialect),
                ("table_schemas", tables_metadata),
                ("original_query", question),
                ("question", question),
                ("related_sample_queries", related_sample_queries),
            ])
            .map_err(|e| Text2SqlError::PromptError(e.to_string()))?;

        let response = self
            .model_gateway
            .generate_response_with_structured_output(&prompt, &sql_output_schema())
            .await
            .map_err(|e| Text2SqlError::GatewayError(e.to_string()))?;

        parse_structured::<GeneratedSql>(response)
            .map_err(|e| Text2SqlError::GatewayError(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::application::ports::model_gateway::ModelGatewayError;
    use crate::domain::repositories::sample_query_repository::SampleQueryRepositoryError;
    use crate::domain::repositories::table_metadata_repository::TableMetadataRepositoryError;
    use crate::domain::repositories::vector_store_repository::{
        RetrievedDocument, VectorStoreError,
    };

    pub(crate) struct StubVectorStore {
        docs_by_collection: HashMap<String, Vec<RetrievedDocument>>,
    }

    impl StubVectorStore {
        pub(crate) fn empty() -> Self {
            Self {
                docs_by_collection: HashMap::new(),
            }
        }

        pub(crate) fn with_docs(collection: &str, doc_ids: &[&str]) -> Self {
            let docs = doc_ids
                .iter()
                .enumerate()
                .map(|(rank, doc_id)| RetrievedDocument {
                    doc_id: doc_id.to_string(),
                    document: format!("summary of {}", doc_id),
                    similarity_score: 1.0 - rank as f32 * 0.1,
                })
                .collect();
            Self {
                docs_by_collection: HashMap::from([(collection.to_string(), docs)]),
            }
        }
    }

    #[async_trait]
    impl VectorStoreRepository for StubVectorStore {
        async fn retrieve_relevant_docs(
            &self,
            _question: &str,
            collection: &str,
            k: usize,
        ) -> Result<Vec<RetrievedDocument>, VectorStoreError> {
            let mut docs = self
                .docs_by_collection
                .get(collection)
                .cloned()
                .unwrap_or_default();
            docs.truncate(k);
            Ok(docs)
        }

        async fn put(
            &self,
            _doc_id: &str,
            _document: &str,
            _collection: &str,
        ) -> Result<(), VectorStoreError> {
            Ok(())
        }

        async fn put_bulk(
            &self,
            _documents: &[(String, String)],
            _collection: &str,
        ) -> Result<(), VectorStoreError> {
            Ok(())
        }
    }

    pub(crate) struct StubTableMetadataRepository {
        entries: Vec<TableMetadata>,
    }

    impl StubTableMetadataRepository {
        pub(crate) fn new(entries: Vec<TableMetadata>) -> Self {
            Self { entries }
        }
    }

    #[async_trait]
    impl TableMetadataRepository for StubTableMetadataRepository {
        async fn get(
            &self,
            table_names: &[String],
        ) -> Result<Vec<TableMetadata>, TableMetadataRepositoryError> {
            Ok(table_names
                .iter()
                .filter_map(|name| self.entries.iter().find(|m| m.name() == name).cloned())
                .collect())
        }

        async fn get_all(&self) -> Result<Vec<TableMetadata>, TableMetadataRepositoryError> {
            Ok(self.entries.clone())
        }

        async fn put(&self, _metadata: &TableMetadata) -> Result<(), TableMetadataRepositoryError> {
            Ok(())
        }
    }

    pub(crate) struct StubSampleQueryRepository {
        entries: Vec<SampleQuery>,
    }

    impl StubSampleQueryRepository {
        pub(crate) fn new(entries: Vec<SampleQuery>) -> Self {
            Self { entries }
        }
    }

    #[async_trait]
    impl SampleQueryRepository for StubSampleQueryRepository {
        async fn get(
            &self,
            query_names: &[String],
        ) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
            query_names
                .iter()
                .map(|name| {
                    self.entries
                        .iter()
                        .find(|q| q.name() == name)
                        .cloned()
                        .ok_or_else(|| SampleQueryRepositoryError::NotFound(name.clone()))
                })
                .collect()
        }

        async fn get_all(&self) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
            Ok(self.entries.clone())
        }

        async fn put(&self, _query: &SampleQuery) -> Result<(), SampleQueryRepositoryError> {
            Ok(())
        }

        async fn retrieve_by_table_name(
            &self,
            table_name: &str,
        ) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
            Ok(self
                .entries
                .iter()
                .filter(|q| q.mentions_table(table_name))
                .cloned()
                .collect())
        }
    }

    pub(crate) struct StubModelGateway {
        response: serde_json::Value,
        pub(crate) last_prompt: Mutex<Option<String>>,
    }

    impl StubModelGateway {
        pub(crate) fn returning(response: serde_json::Value) -> Self {
            Self {
                response,
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ModelGateway for StubModelGateway {
        async fn generate_response(&self, prompt: &str) -> Result<String, ModelGatewayError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.response.to_string())
        }

        async fn generate_response_with_structured_output(
            &self,
            prompt: &str,
            schema: &OutputSchema,
        ) -> Result<serde_json::Value, ModelGatewayError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            schema
                .validate(&self.response)
                .map_err(ModelGatewayError::ParseError)?;
            Ok(self.response.clone())
        }
    }

    fn test_template() -> PromptTemplate {
        PromptTemplate::new(
            "dialect={dialect}\nschemas={table_schemas}\noriginal={original_query}\n\
             question={question}\nsamples={related_sample_queries}"
                .to_string(),
        )
    }

    fn service(
        vector_store: StubVectorStore,
        tables: Vec<TableMetadata>,
        queries: Vec<SampleQuery>,
        gateway: Arc<StubModelGateway>,
    ) -> Text2SqlService {
        Text2SqlService::new(
            Arc::new(vector_store),
            Arc::new(StubTableMetadataRepository::new(tables)),
            Arc::new(StubSampleQueryRepository::new(queries)),
            gateway,
            test_template(),
        )
    }

    #[tokio::test]
    async fn test_process_query_passes_gateway_output_through_unchanged() {
        let gateway = Arc::new(StubModelGateway::returning(json!({
            "query": "select 1",
            "explanation": "x",
        })));
        let service = service(
            StubVectorStore::with_docs(TABLE_EMBEDDINGS_COLLECTION, &["orders"]),
            vec![TableMetadata::new(
                "orders".to_string(),
                "orders facts".to_string(),
            )],
            vec![],
            gateway.clone(),
        );

        let result = service.process_query("anything", "SQLite").await.unwrap();

        assert_eq!(result.query, "select 1");
        assert_eq!(result.explanation, "x");
    }

    #[tokio::test]
    async fn test_zero_retrieved_docs_still_builds_a_prompt() {
        let gateway = Arc::new(StubModelGateway::returning(json!({
            "query": "select 1",
            "explanation": "x",
        })));
        let service = service(StubVectorStore::empty(), vec![], vec![], gateway.clone());

        let result = service
            .process_query("total sales?", "SQLite")
            .await
            .unwrap();

        assert_eq!(result.query, "select 1");
        let prompt = gateway.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("schemas=\n"));
        assert!(prompt.contains("samples="));
        assert!(prompt.contains("question=total sales?"));
    }

    #[tokio::test]
    async fn test_missing_table_metadata_is_dropped_not_fatal() {
        let gateway = Arc::new(StubModelGateway::returning(json!({
            "query": "select 1",
            "explanation": "x",
        })));
        let service = service(
            StubVectorStore::with_docs(TABLE_EMBEDDINGS_COLLECTION, &["orders", "ghost"]),
            vec![TableMetadata::new(
                "orders".to_string(),
                "orders facts".to_string(),
            )],
            vec![],
            gateway.clone(),
        );

        let result = service.process_query("anything", "SQLite").await;

        assert!(result.is_ok());
        let prompt = gateway.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("orders facts"));
        assert!(!prompt.contains("ghost"));
    }

    #[tokio::test]
    async fn test_missing_sample_query_fails_the_request() {
        let gateway = Arc::new(StubModelGateway::returning(json!({
            "query": "select 1",
            "explanation": "x",
        })));
        let service = service(
            StubVectorStore::with_docs(QUERY_EMBEDDINGS_COLLECTION, &["ghost"]),
            vec![],
            vec![],
            gateway,
        );

        let result = service.process_query("anything", "SQLite").await;

        assert!(matches!(result, Err(Text2SqlError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_question_fills_both_placeholders() {
        let gateway = Arc::new(StubModelGateway::returning(json!({
            "query": "select 1",
            "explanation": "x",
        })));
        let service = service(StubVectorStore::empty(), vec![], vec![], gateway.clone());

        service.process_query("2023年の売上合計は？", "SQLite").await.unwrap();

        let prompt = gateway.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("original=2023年の売上合計は？"));
        assert!(prompt.contains("question=2023年の売上合計は？"));
    }
}
