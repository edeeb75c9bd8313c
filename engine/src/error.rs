use thiserror::Error;

/// Failure to bring the index up. Terminal for the page: never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("search engine is not available")]
    EngineUnavailable,
    #[error("search index is not available")]
    IndexMissing,
    #[error("search index has no document store")]
    StoreMissing,
    #[error("document store is malformed: {0}")]
    StoreMalformed(String),
    #[error("search engine failed to load the index: {0}")]
    EngineFailed(String),
}

/// Failure of a single query. The next query is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search engine error: {0}")]
    Engine(String),
    #[error("search engine returned malformed hits: {0}")]
    MalformedHits(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing host element: {0}")]
    MissingElement(String),
}
