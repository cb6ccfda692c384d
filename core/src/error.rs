use thiserror::Error;

/// Errors surfaced by the search engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The keyword string could not be parsed. `offset` is the byte offset where parsing failed.
    #[error("malformed query at offset {offset}: {message}")]
    MalformedQuery { message: String, offset: usize },

    /// A document id is missing its stored document or domain record. Indicates a defect in the
    /// build pipeline, never a user error.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),
}

impl SearchError {
    pub fn malformed(message: impl Into<String>, offset: usize) -> Self {
        SearchError::MalformedQuery { message: message.into(), offset }
    }

    pub fn is_malformed_query(&self) -> bool {
        matches!(self, SearchError::MalformedQuery { .. })
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
