use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use crate::application::ports::EmbeddingProvider;
use crate::domain::entities::EmbeddingDocument;
use crate::domain::repositories::VectorStoreRepository;
use crate::domain::repositories::vector_store_repository::{RetrievedDocument, VectorStoreError};
use crate::infrastructure::database::models::{EmbeddingDocumentModel, NewEmbeddingDocumentModel};
use crate::infrastructure::database::schema::embedding_documents::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

/// Embedding store over the embedded SQLite database.
///
/// Similarity search loads the requested collection and ranks it by cosine
/// similarity in memory; the collections are a few hundred summaries, far
/// below the point where an index pays off.
pub struct SqliteVectorStoreRepository {
    pool: DbPool,
    embedding_provider: Arc<dyn EmbeddingProvider>,
}

impl SqliteVectorStoreRepository {
    pub fn new(pool: DbPool, embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            pool,
            embedding_provider,
        }
    }

    fn insert_models(
        &self,
        models: &[NewEmbeddingDocumentModel],
    ) -> Result<(), VectorStoreError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| VectorStoreError::StorageError(e.to_string()))?;

        diesel::replace_into(embedding_documents)
            .values(models)
            .execute(&mut conn)
            .map_err(|e| VectorStoreError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl VectorStoreRepository for SqliteVectorStoreRepository {
    async fn retrieve_relevant_docs(
        &self,
        question: &str,
        collection_name: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, VectorStoreError> {
        let question_embedding = self
            .embedding_provider
            .embed(question)
            .await
            .map_err(|e| VectorStoreError::EmbeddingError(e.to_string()))?;

        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| VectorStoreError::StorageError(e.to_string()))?;

        let models = embedding_documents
            .filter(collection.eq(collection_name))
            .load::<EmbeddingDocumentModel>(&mut conn)
            .map_err(|e| VectorStoreError::StorageError(e.to_string()))?;

        let mut results = Vec::new();
        for model in models {
            // A collection must not mix embedding models; rows written by
            // another model are not comparable and are skipped.
            if model.model_name != self.embedding_provider.model_name() {
                log::warn!(
                    "Skipping document {} in {}: embedded with {}, current model is {}",
                    model.doc_id,
                    collection_name,
                    model.model_name,
                    self.embedding_provider.model_name()
                );
                continue;
            }

            let document_embedding = model
                .embedding_vector()
                .map_err(VectorStoreError::ValidationError)?;
            let similarity_score =
                calculate_cosine_similarity(&question_embedding, &document_embedding);

            results.push(RetrievedDocument {
                doc_id: model.doc_id,
                document: model.document,
                similarity_score,
            });
        }

        results.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }

    async fn put(
        &self,
        document_id: &str,
        document_text: &str,
        collection_name: &str,
    ) -> Result<(), VectorStoreError> {
        let vector = self
            .embedding_provider
            .embed(document_text)
            .await
            .map_err(|e| VectorStoreError::EmbeddingError(e.to_string()))?;

        let domain_document = EmbeddingDocument::new(
            collection_name.to_string(),
            document_id.to_string(),
            document_text.to_string(),
            vector,
            self.embedding_provider.model_name().to_string(),
        );
        let model = NewEmbeddingDocumentModel::try_from(&domain_document)
            .map_err(VectorStoreError::ValidationError)?;

        self.insert_models(&[model])
    }

    async fn put_bulk(
        &self,
        documents: &[(String, String)],
        collection_name: &str,
    ) -> Result<(), VectorStoreError> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|(_, text)| text.clone()).collect();
        let vectors = self
            .embedding_provider
            .embed_batch(&texts)
            .await
            .map_err(|e| VectorStoreError::EmbeddingError(e.to_string()))?;

        if vectors.len() != documents.len() {
            return Err(VectorStoreError::EmbeddingError(format!(
                "Mismatch: {} documents but {} embeddings",
                documents.len(),
                vectors.len()
            )));
        }

        let mut models = Vec::with_capacity(documents.len());
        for ((document_id, document_text), vector) in documents.iter().zip(vectors) {
            let domain_document = EmbeddingDocument::new(
                collection_name.to_string(),
                document_id.clone(),
                document_text.clone(),
                vector,
                self.embedding_provider.model_name().to_string(),
            );
            models.push(
                NewEmbeddingDocumentModel::try_from(&domain_document)
                    .map_err(VectorStoreError::ValidationError)?,
            );
        }

        self.insert_models(&models)
    }
}

fn calculate_cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
