use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::TableMetadata;
use crate::domain::repositories::TableMetadataRepository;
use crate::domain::repositories::table_metadata_repository::TableMetadataRepositoryError;
use crate::infrastructure::database::models::{NewTableMetadataModel, TableMetadataModel};
use crate::infrastructure::database::schema::table_metadata::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct SqliteTableMetadataRepository {
    pool: DbPool,
}

impl SqliteTableMetadataRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableMetadataRepository for SqliteTableMetadataRepository {
    async fn get(
        &self,
        table_names: &[String],
    ) -> Result<Vec<TableMetadata>, TableMetadataRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| TableMetadataRepositoryError::StorageError(e.to_string()))?;

        let models = table_metadata
            .filter(table_name.eq_any(table_names))
            .load::<TableMetadataModel>(&mut conn)
            .map_err(|e| TableMetadataRepositoryError::StorageError(e.to_string()))?;

        let mut models_by_name: HashMap<String, TableMetadataModel> = models
            .into_iter()
            .map(|model| (model.table_name.clone(), model))
            .collect();

        // Preserve the requested order; it carries retrieval relevance.
        let mut results = Vec::new();
        for name in table_names {
            match models_by_name.remove(name) {
                Some(model) => results.push(TableMetadata::from(model)),
                None => log::warn!("Table metadata not found for table: {}", name),
            }
        }
        Ok(results)
    }

    async fn get_all(&self) -> Result<Vec<TableMetadata>, TableMetadataRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| TableMetadataRepositoryError::StorageError(e.to_string()))?;

        let models = table_metadata
            .order(table_name.asc())
            .load::<TableMetadataModel>(&mut conn)
            .map_err(|e| TableMetadataRepositoryError::StorageError(e.to_string()))?;

        Ok(models.into_iter().map(TableMetadata::from).collect())
    }

    async fn put(&self, domain_metadata: &TableMetadata) -> Result<(), TableMetadataRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| TableMetadataRepositoryError::StorageError(e.to_string()))?;

        let new_model = NewTableMetadataModel::from(domain_metadata);

        diesel::replace_into(table_metadata)
            .values(&new_model)
            .execute(&mut conn)
            .map_err(|e| TableMetadataRepositoryError::StorageError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::create_test_pool;

    fn repository() -> SqliteTableMetadataRepository {
        SqliteTableMetadataRepository::new(create_test_pool())
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let repository = repository();
        let entry = TableMetadata::new("orders".to_string(), "orders facts".to_string());

        repository.put(&entry).await.unwrap();
        let fetched = repository.get(&["orders".to_string()]).await.unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].name(), "orders");
        assert_eq!(fetched[0].description(), "orders facts");
    }

    #[tokio::test]
    async fn test_missing_name_is_skipped_without_error() {
        let repository = repository();
        let entry = TableMetadata::new("orders".to_string(), "orders facts".to_string());
        repository.put(&entry).await.unwrap();

        let fetched = repository
            .get(&["ghost".to_string(), "orders".to_string()])
            .await
            .unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].name(), "orders");
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_entry() {
        let repository = repository();
        repository
            .put(&TableMetadata::new(
                "orders".to_string(),
                "old".to_string(),
            ))
            .await
            .unwrap();

        repository
            .put(&TableMetadata::new(
                "orders".to_string(),
                "new".to_string(),
            ))
            .await
            .unwrap();

        let fetched = repository.get(&["orders".to_string()]).await.unwrap();
        assert_eq!(fetched[0].description(), "new");
        assert_eq!(repository.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_preserves_requested_order() {
        let repository = repository();
        for name in ["a_table", "b_table"] {
            repository
                .put(&TableMetadata::new(name.to_string(), name.to_string()))
                .await
                .unwrap();
        }

        let fetched = repository
            .get(&["b_table".to_string(), "a_table".to_string()])
            .await
            .unwrap();

        let names: Vec<&str> = fetched.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["b_table", "a_table"]);
    }
}
