use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroovyscopeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Classpath error: {0}")]
    Classpath(String),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<groovyscope_api::ApiError> for GroovyscopeError {
    fn from(err: groovyscope_api::ApiError) -> Self {
        GroovyscopeError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GroovyscopeError>;
