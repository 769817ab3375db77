//! Retrieval-augmented text-to-SQL generation.
//!
//! A question is matched against embedded summaries of tables and past
//! queries, the hits are resolved to schemas and SQL text, and a hosted
//! chat model turns the assembled prompt into a query with an explanation.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
