use std::path::Path;

use crate::application::use_cases::GenerateSqlQueryRequest;
use crate::domain::entities::GeneratedSql;
use crate::infrastructure::container::AppContainer;

/// Human-readable result block: the generated query, then the explanation
/// when the model produced one.
pub fn render_generated_sql(result: &GeneratedSql) -> String {
    let mut output = format!("Generated SQL Query:\n{}\n", result.query);
    if !result.explanation.is_empty() {
        output.push_str(&format!("\nExplanation:\n{}\n", result.explanation));
    }
    output
}

pub async fn run_generate(
    container: &AppContainer,
    question: &str,
    dialect: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = container
        .generate_sql_query_use_case
        .execute(GenerateSqlQueryRequest {
            question: question.to_string(),
            dialect: dialect.to_string(),
        })
        .await?;

    println!("{}", render_generated_sql(&result));
    log::info!("SQL query generation process completed");
    Ok(())
}

pub async fn run_ingest(
    container: &AppContainer,
    metadata_dir: &Path,
    queries_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = container
        .ingest_stores_use_case
        .execute(metadata_dir, queries_dir)
        .await?;

    println!(
        "Ingested {} table metadata entries and {} sample queries",
        summary.tables_ingested, summary.queries_ingested
    );
    Ok(())
}

pub async fn run_index(container: &AppContainer) -> Result<(), Box<dyn std::error::Error>> {
    let summary = container.register_rag_documents_use_case.execute().await?;

    println!(
        "Registered {} table documents and {} query documents",
        summary.table_documents, summary.query_documents
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::application::services::Text2SqlService;
    use crate::application::services::prompt_loader::PromptTemplate;
    use crate::application::services::text2sql_service::TABLE_EMBEDDINGS_COLLECTION;
    use crate::application::services::text2sql_service::tests::{
        StubModelGateway, StubSampleQueryRepository, StubTableMetadataRepository, StubVectorStore,
    };
    use crate::application::use_cases::GenerateSqlQueryUseCase;
    use crate::domain::entities::TableMetadata;

    fn template() -> PromptTemplate {
        PromptTemplate::new(
            "dialect={dialect}\nschemas={table_schemas}\noriginal={original_query}\n\
             question={question}\nsamples={related_sample_queries}"
                .to_string(),
        )
    }

    #[test]
    fn test_render_includes_both_blocks() {
        let rendered = render_generated_sql(&GeneratedSql::new(
            "select 1".to_string(),
            "a constant".to_string(),
        ));

        assert!(rendered.contains("Generated SQL Query:\nselect 1"));
        assert!(rendered.contains("Explanation:\na constant"));
    }

    #[test]
    fn test_render_omits_empty_explanation() {
        let rendered =
            render_generated_sql(&GeneratedSql::new("select 1".to_string(), String::new()));

        assert!(rendered.contains("Generated SQL Query:"));
        assert!(!rendered.contains("Explanation:"));
    }

    // End-to-end over the serving path with the gateway stubbed: the
    // command output carries both blocks with the stubbed content.
    #[tokio::test]
    async fn test_generate_end_to_end_with_stubbed_gateway() {
        let gateway = Arc::new(StubModelGateway::returning(json!({
            "query": "SELECT SUM(sales) FROM sales_table WHERE year = 2023",
            "explanation": "Sums 2023 sales from the sales table.",
        })));
        let service = Text2SqlService::new(
            Arc::new(StubVectorStore::with_docs(
                TABLE_EMBEDDINGS_COLLECTION,
                &["sales_table"],
            )),
            Arc::new(StubTableMetadataRepository::new(vec![TableMetadata::new(
                "sales_table".to_string(),
                "yearly sales".to_string(),
            )])),
            Arc::new(StubSampleQueryRepository::new(vec![])),
            gateway,
            template(),
        );
        let use_case = GenerateSqlQueryUseCase::new(Arc::new(service));

        let result = use_case
            .execute(GenerateSqlQueryRequest {
                question: "2023年の売上合計は？".to_string(),
                dialect: "SQLite".to_string(),
            })
            .await
            .unwrap();
        let rendered = render_generated_sql(&result);

        assert!(rendered.contains("Generated SQL Query:"));
        assert!(rendered.contains("SELECT SUM(sales) FROM sales_table WHERE year = 2023"));
        assert!(rendered.contains("Explanation:"));
        assert!(rendered.contains("Sums 2023 sales from the sales table."));
    }
}
