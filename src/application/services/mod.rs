pub mod prompt_loader;
pub mod related_tables;
pub mod text2sql_service;

pub use prompt_loader::{PromptLoader, PromptTemplate};
pub use text2sql_service::Text2SqlService;
