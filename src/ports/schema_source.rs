use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ApiSchema;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("failed to parse {source_name} as JSON or YAML: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("unresolvable reference {reference}: {reason}")]
    Reference { reference: String, reason: String },

    #[error("document does not describe an API: {0}")]
    Shape(String),
}

/// Port for obtaining a fully dereferenced API description
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Human-readable origin of the document (path or URL), used in errors
    fn describe(&self) -> String;

    /// Load, parse and dereference the document
    async fn load(&self) -> Result<ApiSchema, SchemaError>;
}
