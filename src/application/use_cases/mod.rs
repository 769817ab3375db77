pub mod generate_sql_query;
pub mod ingest_stores;
pub mod register_rag_documents;

pub use generate_sql_query::{GenerateSqlQueryRequest, GenerateSqlQueryUseCase};
pub use ingest_stores::IngestStoresUseCase;
pub use register_rag_documents::RegisterRagDocumentsUseCase;
