use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub enum ModelGatewayError {
    NetworkError(String),
    ApiError(String),
    ParseError(String),
    ConfigurationError(String),
}

impl std::fmt::Display for ModelGatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelGatewayError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ModelGatewayError::ApiError(msg) => write!(f, "API error: {}", msg),
            ModelGatewayError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ModelGatewayError::ConfigurationError(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ModelGatewayError {}

/// One field of a declared output schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: String,
    pub description: String,
}

impl FieldSpec {
    pub fn string(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: "string".to_string(),
            description: description.to_string(),
        }
    }
}

/// Declared shape of a structured model response: field names, types and
/// human-readable descriptions. Rendered into format instructions appended
/// to the prompt, and used to validate the parsed response.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    fields: Vec<FieldSpec>,
}

impl OutputSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Instructions telling the model to answer as a JSON object with
    /// exactly the declared fields.
    pub fn format_instructions(&self) -> String {
        let mut lines = vec![
            "Respond with a JSON object containing exactly the following fields:".to_string(),
        ];
        for field in &self.fields {
            lines.push(format!(
                "- \"{}\" ({}): {}",
                field.name, field.field_type, field.description
            ));
        }
        lines.push("Do not wrap the JSON in Markdown code fences.".to_string());
        lines.join("\n")
    }

    /// Check that every declared field is present with the declared type.
    pub fn validate(&self, value: &serde_json::Value) -> Result<(), String> {
        let object = value
            .as_object()
            .ok_or_else(|| "response is not a JSON object".to_string())?;

        for field in &self.fields {
            let field_value = object
                .get(&field.name)
                .ok_or_else(|| format!("missing required field: {}", field.name))?;
            let type_matches = match field.field_type.as_str() {
                "string" => field_value.is_string(),
                "number" => field_value.is_number(),
                "boolean" => field_value.is_boolean(),
                "array" => field_value.is_array(),
                "object" => field_value.is_object(),
                _ => true,
            };
            if !type_matches {
                return Err(format!(
                    "field {} is not of type {}",
                    field.name, field.field_type
                ));
            }
        }
        Ok(())
    }
}

/// Hosted chat-completion model.
///
/// Calls are single-turn and never retried; network, auth and parse
/// failures surface to the caller unchanged.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send a prompt and return the raw response text.
    async fn generate_response(&self, prompt: &str) -> Result<String, ModelGatewayError>;

    /// Send a prompt with format instructions appended and return the
    /// response parsed as JSON and validated against `schema`.
    async fn generate_response_with_structured_output(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, ModelGatewayError>;
}

/// Deserialize a validated structured response into a typed record.
pub fn parse_structured<T: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<T, ModelGatewayError> {
    serde_json::from_value(value).map_err(|e| ModelGatewayError::ParseError(e.to_string()))
}
