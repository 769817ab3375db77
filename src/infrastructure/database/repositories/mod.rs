pub mod sqlite_sample_query_repository;
pub mod sqlite_table_metadata_repository;
pub mod sqlite_vector_store_repository;

pub use sqlite_sample_query_repository::SqliteSampleQueryRepository;
pub use sqlite_table_metadata_repository::SqliteTableMetadataRepository;
pub use sqlite_vector_store_repository::SqliteVectorStoreRepository;
