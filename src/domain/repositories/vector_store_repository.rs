use async_trait::async_trait;

#[derive(Debug)]
pub enum VectorStoreError {
    EmbeddingError(String),
    StorageError(String),
    ValidationError(String),
}

impl std::fmt::Display for VectorStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorStoreError::EmbeddingError(msg) => write!(f, "Embedding error: {}", msg),
            VectorStoreError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            VectorStoreError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for VectorStoreError {}

/// A document returned by similarity search, most similar first.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub doc_id: String,
    pub document: String,
    pub similarity_score: f32,
}

/// Embedding storage and nearest-neighbor search over named collections.
///
/// Collections keep table summaries and query summaries apart so one
/// question can be matched independently against both.
#[async_trait]
pub trait VectorStoreRepository: Send + Sync {
    /// Embed the question with the store's embedding provider and return the
    /// top `k` documents of `collection` by decreasing cosine similarity.
    async fn retrieve_relevant_docs(
        &self,
        question: &str,
        collection: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, VectorStoreError>;

    /// Embed `document` and insert it under `(collection, doc_id)`.
    async fn put(
        &self,
        doc_id: &str,
        document: &str,
        collection: &str,
    ) -> Result<(), VectorStoreError>;

    /// Embed and insert many `(doc_id, document)` pairs in one batch.
    async fn put_bulk(
        &self,
        documents: &[(String, String)],
        collection: &str,
    ) -> Result<(), VectorStoreError>;
}
