use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::index::{DocId, DocumentStore, IndexBuilder, InvertedIndex, StoredDocument};
use crate::query::QueryParser;
use crate::scorer::execute;
use serde::Serialize;

/// One record of the corpus handed to [`SearchSystem::build`].
#[derive(Debug, Clone)]
pub struct Document<T> {
    pub text: String,
    pub external_id: Option<String>,
    pub payload: T,
}

impl<T> Document<T> {
    pub fn new(text: impl Into<String>, payload: T) -> Self {
        Self { text: text.into(), external_id: None, payload }
    }

    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResult<'a, T> {
    pub doc_id: DocId,
    pub score: f32,
    pub entity: &'a T,
    pub document: &'a StoredDocument,
}

/// A searchable snapshot of a fixed corpus of domain records.
///
/// The index, the stored documents and the records are filled from a single pass over the
/// corpus, so the n-th record always has doc id n. Nothing mutates them afterwards; `search`
/// takes `&self` and can run from any number of threads.
#[derive(Debug)]
pub struct SearchSystem<T> {
    index: InvertedIndex,
    store: DocumentStore,
    entities: Vec<T>,
    parser: QueryParser,
    config: SearchConfig,
}

impl<T> SearchSystem<T> {
    /// Index the corpus. Runs once, to completion, before any search.
    pub fn build<I>(corpus: I, config: SearchConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Document<T>>,
    {
        let mut builder = IndexBuilder::new();
        let mut store = DocumentStore::new();
        let mut entities = Vec::new();

        tracing::info!("indexing corpus...");
        for doc in corpus {
            let doc_id = builder.add_document(&doc.text);
            let stored_id = store.push(StoredDocument { text: doc.text, external_id: doc.external_id });
            entities.push(doc.payload);
            if stored_id != doc_id || entities.len() != builder.len() {
                return Err(SearchError::InternalConsistency(format!(
                    "document id {doc_id} was stored as {stored_id} with {} records",
                    entities.len()
                )));
            }
        }
        let index = builder.finish();

        let num_docs = index.num_docs() as usize;
        if store.len() != num_docs || entities.len() != num_docs {
            return Err(SearchError::InternalConsistency(format!(
                "index has {num_docs} documents but {} stored documents and {} records",
                store.len(),
                entities.len()
            )));
        }
        tracing::info!(num_docs, num_terms = index.num_terms(), "indexing done");

        let parser = QueryParser::new().with_leading_wildcard(config.allow_leading_wildcard);
        Ok(Self { index, store, entities, parser, config })
    }

    /// Search for the given keyword, best matches first.
    pub fn search(&self, keyword: &str) -> Result<Vec<SearchResult<'_, T>>> {
        tracing::info!(keyword, "searching");
        let query = self.parser.parse(keyword)?;
        let hits = execute(&query, &self.index, self.config.max_results);
        tracing::info!(hits = hits.len(), "search done");

        hits.into_iter()
            .map(|hit| {
                let (Some(document), Some(entity)) = (self.store.get(hit.doc_id), self.entities.get(hit.doc_id as usize)) else {
                    tracing::error!(doc_id = hit.doc_id, "matched document has no stored record");
                    return Err(SearchError::InternalConsistency(format!("doc id {} has no stored record", hit.doc_id)));
                };
                Ok(SearchResult { doc_id: hit.doc_id, score: hit.score, entity, document })
            })
            .collect()
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn documents(&self) -> &DocumentStore { &self.store }

    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn len(&self) -> usize { self.entities.len() }

    pub fn is_empty(&self) -> bool { self.entities.is_empty() }
}
