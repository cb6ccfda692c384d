//! In-memory full-text search over a fixed corpus.
//!
//! Build once with [`SearchSystem::build`], then call [`SearchSystem::search`] from as many
//! threads as needed.

pub mod config;
pub mod error;
pub mod index;
pub mod query;
pub mod scorer;
pub mod search;
pub mod tokenizer;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use index::{DocId, DocumentStore, IndexBuilder, InvertedIndex, Posting, StoredDocument, TermId};
pub use query::{ParsedQuery, QueryParser};
pub use scorer::{execute, ScoredDoc};
pub use search::{Document, SearchResult, SearchSystem};
