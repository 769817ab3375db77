pub mod embedding_document_model;
pub mod sample_query_model;
pub mod table_metadata_model;

pub use embedding_document_model::{EmbeddingDocumentModel, NewEmbeddingDocumentModel};
pub use sample_query_model::{NewSampleQueryModel, SampleQueryModel};
pub use table_metadata_model::{NewTableMetadataModel, TableMetadataModel};
