pub mod sample_query_repository;
pub mod table_metadata_repository;
pub mod vector_store_repository;

pub use sample_query_repository::SampleQueryRepository;
pub use table_metadata_repository::TableMetadataRepository;
pub use vector_store_repository::{RetrievedDocument, VectorStoreRepository};
