pub mod embedding_document;
pub mod generated_sql;
pub mod sample_query;
pub mod table_metadata;

pub use embedding_document::EmbeddingDocument;
pub use generated_sql::GeneratedSql;
pub use sample_query::SampleQuery;
pub use table_metadata::TableMetadata;
