use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::domain::entities::EmbeddingDocument as DomainEmbeddingDocument;
use crate::infrastructure::database::schema::embedding_documents;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = embedding_documents)]
#[diesel(primary_key(collection, doc_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EmbeddingDocumentModel {
    pub collection: String,
    pub doc_id: String,
    pub document: String,
    pub embedding: String,
    pub model_name: String,
    pub embedded_at: NaiveDateTime,
}

impl EmbeddingDocumentModel {
    /// Decode the JSON-encoded embedding column.
    pub fn embedding_vector(&self) -> Result<Vec<f32>, String> {
        serde_json::from_str(&self.embedding)
            .map_err(|e| format!("Invalid embedding for {}: {}", self.doc_id, e))
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = embedding_documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewEmbeddingDocumentModel {
    pub collection: String,
    pub doc_id: String,
    pub document: String,
    pub embedding: String,
    pub model_name: String,
    pub embedded_at: NaiveDateTime,
}

impl TryFrom<&DomainEmbeddingDocument> for NewEmbeddingDocumentModel {
    type Error = String;

    fn try_from(domain_document: &DomainEmbeddingDocument) -> Result<Self, Self::Error> {
        let embedding = serde_json::to_string(domain_document.embedding())
            .map_err(|e| format!("Embedding is not serializable: {}", e))?;

        Ok(Self {
            collection: domain_document.collection().to_string(),
            doc_id: domain_document.doc_id().to_string(),
            document: domain_document.document().to_string(),
            embedding,
            model_name: domain_document.model_name().to_string(),
            embedded_at: domain_document.embedded_at().naive_utc(),
        })
    }
}
