pub mod embedding_provider;
pub mod model_gateway;

pub use embedding_provider::EmbeddingProvider;
pub use model_gateway::ModelGateway;
