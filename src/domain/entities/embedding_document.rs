use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingDocument {
    collection: String,
    doc_id: String,
    document: String,
    embedding: Vec<f32>,
    model_name: String,
    embedded_at: DateTime<Utc>,
}

impl EmbeddingDocument {
    pub fn new(
        collection: String,
        doc_id: String,
        document: String,
        embedding: Vec<f32>,
        model_name: String,
    ) -> Self {
        Self {
            collection,
            doc_id,
            document,
            embedding,
            model_name,
            embedded_at: Utc::now(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn embedded_at(&self) -> DateTime<Utc> {
        self.embedded_at
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Documents are only comparable when they come from the same embedding
    /// model and share a dimension.
    pub fn is_compatible_with_model(&self, model_name: &str) -> bool {
        self.model_name == model_name
    }
}
