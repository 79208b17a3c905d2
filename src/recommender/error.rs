use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecommendError {
    /// The index cannot be built from the given catalog.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No catalog title is close enough to the query.
    #[error("no title close to {query:?}")]
    NotFound { query: String },
}
