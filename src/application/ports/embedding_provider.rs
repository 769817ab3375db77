use async_trait::async_trait;

#[derive(Debug)]
pub enum EmbeddingProviderError {
    NetworkError(String),
    ApiError(String),
    InvalidInput(String),
}

impl std::fmt::Display for EmbeddingProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            EmbeddingProviderError::ApiError(msg) => write!(f, "API error: {}", msg),
            EmbeddingProviderError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for EmbeddingProviderError {}

/// Text embedding model behind the vector store.
///
/// Stored documents and search questions must go through the same provider;
/// `model_name` is stamped on every stored document so a mixed collection
/// can be detected at search time.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError>;

    async fn embed_batch(&self, texts: &[String])
    -> Result<Vec<Vec<f32>>, EmbeddingProviderError>;

    fn model_name(&self) -> &str;
}
