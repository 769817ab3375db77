use std::sync::Arc;

use crate::application::services::Text2SqlService;
use crate::domain::entities::GeneratedSql;

#[derive(Debug)]
pub enum GenerateSqlQueryError {
    ValidationError(String),
    ProcessingError(String),
}

impl std::fmt::Display for GenerateSqlQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateSqlQueryError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            GenerateSqlQueryError::ProcessingError(msg) => {
                write!(f, "Processing error: {}", msg)
            }
        }
    }
}

impl std::error::Error for GenerateSqlQueryError {}

#[derive(Debug, Clone)]
pub struct GenerateSqlQueryRequest {
    pub question: String,
    pub dialect: String,
}

pub struct GenerateSqlQueryUseCase {
    text2sql_service: Arc<Text2SqlService>,
}

impl GenerateSqlQueryUseCase {
    pub fn new(text2sql_service: Arc<Text2SqlService>) -> Self {
        Self { text2sql_service }
    }

    pub async fn execute(
        &self,
        request: GenerateSqlQueryRequest,
    ) -> Result<GeneratedSql, GenerateSqlQueryError> {
        if request.question.trim().is_empty() {
            return Err(GenerateSqlQueryError::ValidationError(
                "Question cannot be empty".to_string(),
            ));
        }

        self.text2sql_service
            .process_query(&request.question, &request.dialect)
            .await
            .map_err(|e| GenerateSqlQueryError::ProcessingError(e.to_string()))
    }
}
