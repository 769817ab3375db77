use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::SampleQuery;
use crate::domain::repositories::SampleQueryRepository;
use crate::domain::repositories::sample_query_repository::SampleQueryRepositoryError;
use crate::infrastructure::database::models::{NewSampleQueryModel, SampleQueryModel};
use crate::infrastructure::database::schema::sample_queries::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct SqliteSampleQueryRepository {
    pool: DbPool,
}

impl SqliteSampleQueryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn load_all(&self) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SampleQueryRepositoryError::StorageError(e.to_string()))?;

        let models = sample_queries
            .order(query_name.asc())
            .load::<SampleQueryModel>(&mut conn)
            .map_err(|e| SampleQueryRepositoryError::StorageError(e.to_string()))?;

        models
            .into_iter()
            .map(|model| {
                SampleQuery::try_from(model)
                    .map_err(SampleQueryRepositoryError::ValidationError)
            })
            .collect()
    }
}

#[async_trait]
impl SampleQueryRepository for SqliteSampleQueryRepository {
    async fn get(
        &self,
        query_names: &[String],
    ) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SampleQueryRepositoryError::StorageError(e.to_string()))?;

        let models = sample_queries
            .filter(query_name.eq_any(query_names))
            .load::<SampleQueryModel>(&mut conn)
            .map_err(|e| SampleQueryRepositoryError::StorageError(e.to_string()))?;

        let mut models_by_name: HashMap<String, SampleQueryModel> = models
            .into_iter()
            .map(|model| (model.query_name.clone(), model))
            .collect();

        // Preserve the requested order; a dangling name means the vector
        // store and this store have drifted apart.
        let mut results = Vec::new();
        for name in query_names {
            let model = models_by_name
                .remove(name)
                .ok_or_else(|| SampleQueryRepositoryError::NotFound(name.clone()))?;
            results.push(
                SampleQuery::try_from(model)
                    .map_err(SampleQueryRepositoryError::ValidationError)?,
            );
        }
        Ok(results)
    }

    async fn get_all(&self) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
        self.load_all()
    }

    async fn put(&self, domain_query: &SampleQuery) -> Result<(), SampleQueryRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| SampleQueryRepositoryError::StorageError(e.to_string()))?;

        let new_model = NewSampleQueryModel::from(domain_query);

        diesel::replace_into(sample_queries)
            .values(&new_model)
            .execute(&mut conn)
            .map_err(|e| SampleQueryRepositoryError::StorageError(e.to_string()))?;

        Ok(())
    }

    async fn retrieve_by_table_name(
        &self,
        table_name: &str,
    ) -> Result<Vec<SampleQuery>, SampleQueryRepositoryError> {
        // Substring match in memory so the semantics stay identical across
        // backends; the stores are small and read-mostly.
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|sample_query| sample_query.mentions_table(table_name))
            .collect())
    }
}
