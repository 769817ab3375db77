use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::ports::model_gateway::{
    FieldSpec, ModelGateway, OutputSchema, parse_structured,
};
use crate::application::services::prompt_loader::PromptTemplate;
use crate::application::services::related_tables::extract_related_tables;
use crate::application::services::text2sql_service::{
    QUERY_EMBEDDINGS_COLLECTION, TABLE_EMBEDDINGS_COLLECTION,
};
use crate::domain::repositories::{
    SampleQueryRepository, TableMetadataRepository, VectorStoreRepository,
};

const PROMPT_SUMMARIZE_TABLE: &str = "\
You are a data analyst documenting SQL tables.

Summarize the table below based on the given context.

===Table schema
{table_schema}

===Sample queries
{sample_queries}

===Response guidelines

- Describe the summary strictly from the provided information.
- The sample queries are a subset of real usage; they do not cover every way
  the table is used, and only some columns appear in them.
- Do not rate the table with adjectives such as rich or comprehensive; state
  only what kind of data it holds.
- Do not mention the sample queries themselves; describe the data the table
  contains and its possible uses.
- Include the questions the table can answer and the analyses it enables.";

const PROMPT_SUMMARIZE_QUERY: &str = "\
You are an assistant documenting SQL queries.

Document the SQL query below based on the given table schemas.

===SQL query
{query}

===Table schemas
{table_schemas}

===Response guidelines

- Describe the purpose and intent of the query in detail.
- Describe the possible business or functional purpose of the query.
- List the selected columns and what they mean.
- List the input tables and how they are joined.
- Explain the transformation logic step by step and why it is needed.
- Explain every filter and why it is applied.";

/// Structured table summary registered as a vector-store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub summary: String,
    pub utilization: String,
    pub potential_usecases: String,
}

/// Structured sample-query summary registered as a vector-store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlQuerySummary {
    pub purposes: String,
    pub selected_columns: String,
    pub input_tables: String,
    pub detailed_transformation_logics: String,
}

fn table_summary_schema() -> OutputSchema {
    OutputSchema::new(vec![
        FieldSpec::string("name", "The table name."),
        FieldSpec::string("summary", "Overview of the table."),
        FieldSpec::string(
            "utilization",
            "How the table is used: the questions it can answer and the analyses it enables.",
        ),
        FieldSpec::string("potential_usecases", "Potential use cases for the table."),
    ])
}

fn query_summary_schema() -> OutputSchema {
    OutputSchema::new(vec![
        FieldSpec::string("purposes", "Purpose and intent of the query, in detail."),
        FieldSpec::string(
            "selected_columns",
            "Columns selected by the query and what they mean.",
        ),
        FieldSpec::string("input_tables", "Tables the query reads and how they relate."),
        FieldSpec::string(
            "detailed_transformation_logics",
            "The data transformations the query performs, in detail.",
        ),
    ])
}

// Embedding price for text-embedding-3-small; tokens are approximated as
// characters divided by four.
const EMBEDDING_PRICE_DOLLAR_PER_1K_TOKENS: f64 = 0.00002;

fn estimate_embedding_cost(documents: &[(String, String)]) -> (usize, f64) {
    let total_tokens: usize = documents.iter().map(|(_, text)| text.len() / 4).sum();
    let cost_dollar = (total_tokens as f64 / 1000.0) * EMBEDDING_PRICE_DOLLAR_PER_1K_TOKENS;
    (total_tokens, cost_dollar)
}

#[derive(Debug)]
pub enum RegisterRagDocumentsError {
    RepositoryError(String),
    VectorStoreError(String),
    GatewayError(String),
    PromptError(String),
}

impl std::fmt::Display for RegisterRagDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterRagDocumentsError::RepositoryError(msg) => {
                write!(f, "Repository error: {}", msg)
            }
            RegisterRagDocumentsError::VectorStoreError(msg) => {
                write!(f, "Vector store error: {}", msg)
            }
            RegisterRagDocumentsError::GatewayError(msg) => write!(f, "Gateway error: {}", msg),
            RegisterRagDocumentsError::PromptError(msg) => write!(f, "Prompt error: {}", msg),
        }
    }
}

impl std::error::Error for RegisterRagDocumentsError {}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterSummary {
    pub table_documents: usize,
    pub query_documents: usize,
}

/// Offline batch: summarize every stored table and sample query with the
/// model and register the summaries in the matching vector collections.
pub struct RegisterRagDocumentsUseCase {
    table_metadata_repository: Arc<dyn TableMetadataRepository>,
    sample_query_repository: Arc<dyn SampleQueryRepository>,
    vector_store: Arc<dyn VectorStoreRepository>,
    model_gateway: Arc<dyn ModelGateway>,
}

impl RegisterRagDocumentsUseCase {
    pub fn new(
        table_metadata_repository: Arc<dyn TableMetadataRepository>,
        sample_query_repository: Arc<dyn SampleQueryRepository>,
        vector_store: Arc<dyn VectorStoreRepository>,
        model_gateway: Arc<dyn ModelGateway>,
    ) -> Self {
        Self {
            table_metadata_repository,
            sample_query_repository,
            vector_store,
            model_gateway,
        }
    }

    pub async fn execute(&self) -> Result<RegisterSummary, RegisterRagDocumentsError> {
        let table_documents = self.register_table_documents().await?;
        let query_documents = self.register_sample_queries().await?;

        Ok(RegisterSummary {
            table_documents,
            query_documents,
        })
    }

    /// Summarize every table together with the sample queries that mention
    /// it, and register the summaries under "table_embeddings".
    pub async fn register_table_documents(&self) -> Result<usize, RegisterRagDocumentsError> {
        let tables = self
            .table_metadata_repository
            .get_all()
            .await
            .map_err(|e| RegisterRagDocumentsError::RepositoryError(e.to_string()))?;

        let template = PromptTemplate::new(PROMPT_SUMMARIZE_TABLE.to_string());
        let mut documents = Vec::new();
        for metadata in &tables {
            let related = self
                .sample_query_repository
                .retrieve_by_table_name(metadata.name())
                .await
                .map_err(|e| RegisterRagDocumentsError::RepositoryError(e.to_string()))?;
            // Deduplicate query texts; several names can hold the same SQL.
            let sample_queries: BTreeSet<&str> = related.iter().map(|q| q.sql()).collect();
            let joined = sample_queries.into_iter().collect::<Vec<_>>().join("\n\n");

            let prompt = template
                .render(&[
                    ("table_schema", metadata.prompt_text()),
                    ("sample_queries", &joined),
                ])
                .map_err(|e| RegisterRagDocumentsError::PromptError(e.to_string()))?;

            let response = self
                .model_gateway
                .generate_response_with_structured_output(&prompt, &table_summary_schema())
                .await
                .map_err(|e| RegisterRagDocumentsError::GatewayError(e.to_string()))?;
            let summary: TableSummary = parse_structured(response)
                .map_err(|e| RegisterRagDocumentsError::GatewayError(e.to_string()))?;

            let document = serde_json::to_string_pretty(&summary)
                .map_err(|e| RegisterRagDocumentsError::GatewayError(e.to_string()))?;
            log::info!("Summarized table: {}", metadata.name());
            documents.push((metadata.name().to_string(), document));
        }

        let (tokens, cost_dollar) = estimate_embedding_cost(&documents);
        log::info!(
            "Embedding {} table documents: ~{} tokens, estimated cost ${:.4}",
            documents.len(),
            tokens,
            cost_dollar
        );

        self.vector_store
            .put_bulk(&documents, TABLE_EMBEDDINGS_COLLECTION)
            .await
            .map_err(|e| RegisterRagDocumentsError::VectorStoreError(e.to_string()))?;
        Ok(documents.len())
    }

    /// Summarize every sample query against the schemas of the tables it
    /// reads, and register the summaries under "query_embeddings".
    pub async fn register_sample_queries(&self) -> Result<usize, RegisterRagDocumentsError> {
        let queries = self
            .sample_query_repository
            .get_all()
            .await
            .map_err(|e| RegisterRagDocumentsError::RepositoryError(e.to_string()))?;

        let template = PromptTemplate::new(PROMPT_SUMMARIZE_QUERY.to_string());
        let mut documents = Vec::new();
        for query in &queries {
            let related_tables: Vec<String> =
                extract_related_tables(query.sql()).into_iter().collect();
            let schemas = self
                .table_metadata_repository
                .get(&related_tables)
                .await
                .map_err(|e| RegisterRagDocumentsError::RepositoryError(e.to_string()))?;
            let table_schemas = schemas
                .iter()
                .map(|m| m.prompt_text())
                .collect::<Vec<_>>()
                .join("\n\n");

            let prompt = template
                .render(&[("query", query.sql()), ("table_schemas", &table_schemas)])
                .map_err(|e| RegisterRagDocumentsError::PromptError(e.to_string()))?;

            let response = self
                .model_gateway
                .generate_response_with_structured_output(&prompt, &query_summary_schema())
                .await
                .map_err(|e| RegisterRagDocumentsError::GatewayError(e.to_string()))?;
            let summary: SqlQuerySummary = parse_structured(response)
                .map_err(|e| RegisterRagDocumentsError::GatewayError(e.to_string()))?;

            let document = serde_json::to_string_pretty(&summary)
                .map_err(|e| RegisterRagDocumentsError::GatewayError(e.to_string()))?;
            log::info!("Summarized sample query: {}", query.name());
            documents.push((query.name().to_string(), document));
        }

        let (tokens, cost_dollar) = estimate_embedding_cost(&documents);
        log::info!(
            "Embedding {} query documents: ~{} tokens, estimated cost ${:.4}",
            documents.len(),
            tokens,
            cost_dollar
        );

        self.vector_store
            .put_bulk(&documents, QUERY_EMBEDDINGS_COLLECTION)
            .await
            .map_err(|e| RegisterRagDocumentsError::VectorStoreError(e.to_string()))?;
        Ok(documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::application::services::text2sql_service::tests::{
        StubModelGateway, StubSampleQueryRepository, StubTableMetadataRepository,
    };
    use crate::domain::entities::{SampleQuery, TableMetadata};
    use crate::domain::repositories::vector_store_repository::{
        RetrievedDocument, VectorStoreError,
    };

    #[derive(Default)]
    struct RecordingVectorStore {
        puts: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    #[async_trait]
    impl VectorStoreRepository for RecordingVectorStore {
        async fn retrieve_relevant_docs(
            &self,
            _question: &str,
            _collection: &str,
            _k: usize,
        ) -> Result<Vec<RetrievedDocument>, VectorStoreError> {
            Ok(vec![])
        }

        async fn put(
            &self,
            doc_id: &str,
            document: &str,
            collection: &str,
        ) -> Result<(), VectorStoreError> {
            self.put_bulk(
                &[(doc_id.to_string(), document.to_string())],
                collection,
            )
            .await
        }

        async fn put_bulk(
            &self,
            documents: &[(String, String)],
            collection: &str,
        ) -> Result<(), VectorStoreError> {
            self.puts
                .lock()
                .unwrap()
                .push((collection.to_string(), documents.to_vec()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_register_table_documents_stores_summaries() {
        let gateway = Arc::new(StubModelGateway::returning(json!({
            "name": "orders",
            "summary": "order-level sales facts",
            "utilization": "answers revenue questions",
            "potential_usecases": "sales reporting",
        })));
        let vector_store = Arc::new(RecordingVectorStore::default());
        let use_case = RegisterRagDocumentsUseCase::new(
            Arc::new(StubTableMetadataRepository::new(vec![TableMetadata::new(
                "orders".to_string(),
                "orders schema".to_string(),
            )])),
            Arc::new(StubSampleQueryRepository::new(vec![SampleQuery::new(
                "daily_sales".to_string(),
                "select * from orders".to_string(),
                None,
            )])),
            vector_store.clone(),
            gateway.clone(),
        );

        let count = use_case.register_table_documents().await.unwrap();

        assert_eq!(count, 1);
        let puts = vector_store.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        let (collection, documents) = &puts[0];
        assert_eq!(collection, TABLE_EMBEDDINGS_COLLECTION);
        assert_eq!(documents[0].0, "orders");
        assert!(documents[0].1.contains("order-level sales facts"));
        let prompt = gateway.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("orders schema"));
        assert!(prompt.contains("select * from orders"));
    }

    #[tokio::test]
    async fn test_register_sample_queries_uses_extracted_table_schemas() {
        let gateway = Arc::new(StubModelGateway::returning(json!({
            "purposes": "daily revenue",
            "selected_columns": "all columns",
            "input_tables": "orders",
            "detailed_transformation_logics": "none",
        })));
        let vector_store = Arc::new(RecordingVectorStore::default());
        let use_case = RegisterRagDocumentsUseCase::new(
            Arc::new(StubTableMetadataRepository::new(vec![TableMetadata::new(
                "orders".to_string(),
                "orders schema".to_string(),
            )])),
            Arc::new(StubSampleQueryRepository::new(vec![SampleQuery::new(
                "daily_sales".to_string(),
                "select * from orders".to_string(),
                None,
            )])),
            vector_store.clone(),
            gateway.clone(),
        );

        let count = use_case.register_sample_queries().await.unwrap();

        assert_eq!(count, 1);
        let puts = vector_store.puts.lock().unwrap();
        let (collection, documents) = &puts[0];
        assert_eq!(collection, QUERY_EMBEDDINGS_COLLECTION);
        assert_eq!(documents[0].0, "daily_sales");
        assert!(documents[0].1.contains("daily revenue"));
        let prompt = gateway.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("orders schema"));
    }

    #[test]
    fn test_embedding_cost_estimate() {
        let documents = vec![("a".to_string(), "x".repeat(4000))];

        let (tokens, cost_dollar) = estimate_embedding_cost(&documents);

        assert_eq!(tokens, 1000);
        assert!((cost_dollar - 0.00002).abs() < 1e-12);
    }
}
