use crate::tokenizer::tokenize_with_positions;
use serde::Serialize;
use std::collections::HashMap;

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
    /// Token positions of the term within the document, ascending.
    pub positions: Vec<u32>,
}

/// Term -> postings lookup over a fixed set of documents.
///
/// Only [`IndexBuilder::finish`] produces one; there is no way to add documents afterwards.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    dictionary: HashMap<String, TermId>,
    postings: Vec<Vec<Posting>>, // by term id, each sorted by doc_id
    doc_lengths: Vec<u32>,
}

impl InvertedIndex {
    /// Build an index from document texts, assigning ids 0, 1, 2, ... in input order.
    pub fn build<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = IndexBuilder::new();
        for text in texts {
            builder.add_document(text.as_ref());
        }
        builder.finish()
    }

    pub fn num_docs(&self) -> u32 { self.doc_lengths.len() as u32 }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn is_empty(&self) -> bool { self.doc_lengths.is_empty() }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    /// Postings for a term; empty when the term was never indexed.
    pub fn postings(&self, term: &str) -> &[Posting] {
        match self.term_id(term) {
            Some(tid) => self.postings_by_id(tid),
            None => &[],
        }
    }

    pub fn postings_by_id(&self, term_id: TermId) -> &[Posting] {
        self.postings.get(term_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of documents containing the term.
    pub fn document_frequency(&self, term: &str) -> u32 { self.postings(term).len() as u32 }

    /// Token count of a document.
    pub fn doc_length(&self, doc_id: DocId) -> Option<u32> { self.doc_lengths.get(doc_id as usize).copied() }

    /// All indexed terms with their ids, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, TermId)> + '_ {
        self.dictionary.iter().map(|(term, tid)| (term.as_str(), *tid))
    }
}

/// One-shot accumulator for an [`InvertedIndex`]. Consumed by [`IndexBuilder::finish`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    next_doc_id: DocId,
    dictionary: HashMap<String, TermId>,
    postings: Vec<Vec<Posting>>,
    doc_lengths: Vec<u32>,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    /// Tokenize `text` and record it under the next document id, which is returned.
    pub fn add_document(&mut self, text: &str) -> DocId {
        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;

        let tokens = tokenize_with_positions(text);
        self.doc_lengths.push(tokens.len() as u32);

        // term id -> positions, in first-occurrence order so postings are appended deterministically
        let mut order: Vec<TermId> = Vec::new();
        let mut positions: HashMap<TermId, Vec<u32>> = HashMap::new();
        for (term, pos) in tokens {
            let next_term_id = self.postings.len() as TermId;
            let tid = *self.dictionary.entry(term).or_insert(next_term_id);
            if tid == next_term_id {
                self.postings.push(Vec::new());
            }
            positions
                .entry(tid)
                .or_insert_with(|| {
                    order.push(tid);
                    Vec::new()
                })
                .push(pos as u32);
        }

        for tid in order {
            let positions = positions.remove(&tid).unwrap_or_default();
            self.postings[tid as usize].push(Posting {
                doc_id,
                term_frequency: positions.len() as u32,
                positions,
            });
        }
        doc_id
    }

    pub fn len(&self) -> usize { self.doc_lengths.len() }

    pub fn is_empty(&self) -> bool { self.doc_lengths.is_empty() }

    pub fn finish(mut self) -> InvertedIndex {
        for plist in self.postings.iter_mut() {
            plist.shrink_to_fit();
        }
        tracing::debug!(num_docs = self.doc_lengths.len(), num_terms = self.dictionary.len(), "postings frozen");
        InvertedIndex { dictionary: self.dictionary, postings: self.postings, doc_lengths: self.doc_lengths }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredDocument {
    /// The raw text that was indexed.
    pub text: String,
    /// Key of the domain record this document came from, e.g. a post id.
    pub external_id: Option<String>,
}

/// Stored documents addressed by [`DocId`].
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: Vec<StoredDocument>,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    /// Append a document; its position is its id.
    pub(crate) fn push(&mut self, doc: StoredDocument) -> DocId {
        self.docs.push(doc);
        (self.docs.len() - 1) as DocId
    }

    pub fn get(&self, doc_id: DocId) -> Option<&StoredDocument> { self.docs.get(doc_id as usize) }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }
}
