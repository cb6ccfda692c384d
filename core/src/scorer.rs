use crate::index::{DocId, InvertedIndex, Posting};
use crate::query::{Occur, ParsedQuery, QueryNode, WildcardPattern};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f32,
}

impl Eq for ScoredDoc {}

impl Ord for ScoredDoc {
    /// Greater is better: higher score first, then lower doc id.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score).then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// Documents matched by one clause: (doc_id, frequency) ascending by doc_id.
type Matches = Vec<(DocId, u32)>;

#[derive(Default)]
struct Accumulator {
    score: f32,
    required_hits: usize,
}

/// Evaluate `query` against `index`, returning at most `limit` documents ordered by descending
/// score with ties broken by ascending doc id.
pub fn execute(query: &ParsedQuery, index: &InvertedIndex, limit: usize) -> Vec<ScoredDoc> {
    if index.is_empty() || query.matches_nothing() || limit == 0 {
        return Vec::new();
    }
    let n = index.num_docs() as f32;

    let mut required = 0usize;
    let mut excluded: HashSet<DocId> = HashSet::new();
    let mut scores: HashMap<DocId, Accumulator> = HashMap::new();
    for clause in &query.clauses {
        let matches = resolve(&clause.node, index);
        match clause.occur {
            Occur::MustNot => {
                excluded.extend(matches.iter().map(|(doc_id, _)| *doc_id));
                continue;
            }
            Occur::Must => required += 1,
            Occur::Should => {}
        }
        if matches.is_empty() {
            continue;
        }
        let idf = (1.0 + n / matches.len() as f32).ln();
        for (doc_id, tf) in matches {
            let acc = scores.entry(doc_id).or_default();
            acc.score += tf as f32 * idf;
            if clause.occur == Occur::Must {
                acc.required_hits += 1;
            }
        }
    }

    let candidates: Vec<ScoredDoc> = scores
        .into_iter()
        .filter(|(doc_id, acc)| acc.required_hits == required && acc.score > 0.0 && !excluded.contains(doc_id))
        .map(|(doc_id, acc)| ScoredDoc { doc_id, score: acc.score })
        .collect();
    top_k(candidates.into_iter(), limit)
}

/// Keep the best `k` entries using a bounded min-heap.
fn top_k(candidates: impl ExactSizeIterator<Item = ScoredDoc>, k: usize) -> Vec<ScoredDoc> {
    let mut heap: BinaryHeap<Reverse<ScoredDoc>> = BinaryHeap::with_capacity(k.min(candidates.len()).saturating_add(1));
    for doc in candidates {
        if heap.len() < k {
            heap.push(Reverse(doc));
        } else if heap.peek().is_some_and(|Reverse(worst)| doc > *worst) {
            heap.pop();
            heap.push(Reverse(doc));
        }
    }
    // ascending Reverse == descending ScoredDoc
    heap.into_sorted_vec().into_iter().map(|Reverse(doc)| doc).collect()
}

fn resolve(node: &QueryNode, index: &InvertedIndex) -> Matches {
    match node {
        QueryNode::Term(term) => term_matches(index.postings(term)),
        QueryNode::Wildcard(pattern) => wildcard_matches(pattern, index),
        QueryNode::Phrase(terms) => phrase_matches(terms, index),
    }
}

fn term_matches(postings: &[Posting]) -> Matches {
    postings.iter().map(|p| (p.doc_id, p.term_frequency)).collect()
}

/// Merge postings lists, deduplicating by document and summing frequencies.
fn union<'a>(lists: impl Iterator<Item = &'a [Posting]>) -> Matches {
    let mut merged: BTreeMap<DocId, u32> = BTreeMap::new();
    for list in lists {
        for p in list {
            *merged.entry(p.doc_id).or_insert(0) += p.term_frequency;
        }
    }
    merged.into_iter().collect()
}

fn wildcard_matches(pattern: &WildcardPattern, index: &InvertedIndex) -> Matches {
    let lists = index
        .terms()
        .filter(|(term, _)| pattern.matches(term))
        .map(|(_, tid)| index.postings_by_id(tid));
    union(lists)
}

fn phrase_matches(terms: &[String], index: &InvertedIndex) -> Matches {
    let lists: Vec<&[Posting]> = terms.iter().map(|t| index.postings(t)).collect();
    if lists.iter().any(|l| l.is_empty()) {
        return Vec::new();
    }

    // drive from the first term's postings; the rest are looked up by doc id
    let mut out = Vec::new();
    'docs: for first in lists[0] {
        let mut rest: Vec<&Posting> = Vec::with_capacity(lists.len() - 1);
        for list in &lists[1..] {
            match list.binary_search_by_key(&first.doc_id, |p| p.doc_id) {
                Ok(i) => rest.push(&list[i]),
                Err(_) => continue 'docs,
            }
        }
        let count = first
            .positions
            .iter()
            .filter(|&&start| {
                rest.iter()
                    .enumerate()
                    .all(|(offset, p)| p.positions.binary_search(&(start + offset as u32 + 1)).is_ok())
            })
            .count() as u32;
        if count > 0 {
            out.push((first.doc_id, count));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParser;

    fn run(texts: &[&str], keyword: &str) -> Vec<ScoredDoc> {
        let index = InvertedIndex::build(texts.iter().copied());
        let query = QueryParser::new().parse(keyword).unwrap();
        execute(&query, &index, 2000)
    }

    fn ids(docs: &[ScoredDoc]) -> Vec<DocId> { docs.iter().map(|d| d.doc_id).collect() }

    #[test]
    fn tf_idf_formula() {
        let hits = run(&["fox fox", "dog", "fox"], "fox");
        assert_eq!(ids(&hits), vec![0, 2]);
        let idf = (1.0f32 + 3.0 / 2.0).ln();
        assert!((hits[0].score - 2.0 * idf).abs() < 1e-6);
        assert!((hits[1].score - idf).abs() < 1e-6);
    }

    #[test]
    fn more_matching_terms_rank_higher() {
        let hits = run(&["fox", "quick fox", "quick"], "quick fox");
        assert_eq!(hits[0].doc_id, 1);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn ties_break_on_doc_id() {
        let hits = run(&["cat", "dog", "cat", "cat"], "cat");
        assert_eq!(ids(&hits), vec![0, 2, 3]);
    }

    #[test]
    fn required_and_prohibited() {
        let texts = ["quick fox", "quick dog", "lazy fox", "quick brown fox"];
        assert_eq!(ids(&run(&texts, "+quick fox")).len(), 3);
        let mut both = ids(&run(&texts, "quick AND fox"));
        both.sort();
        assert_eq!(both, vec![0, 3]);
        assert_eq!(ids(&run(&texts, "fox -brown")), vec![0, 2]);
        assert!(run(&texts, "-fox").is_empty());
    }

    #[test]
    fn phrase_requires_adjacency() {
        let texts = ["quick brown fox", "brown quick fox", "quick brown quick brown"];
        let hits = run(&texts, "\"quick brown\"");
        assert_eq!(ids(&hits), vec![2, 0]);
        assert!(run(&texts, "\"fox quick\"").is_empty());
    }

    #[test]
    fn wildcard_union_is_deduplicated() {
        let texts = ["fox box", "dog", "ox"];
        let hits = run(&texts, "*ox");
        assert_eq!(ids(&hits), vec![0, 2]);
        let idf = (1.0f32 + 3.0 / 2.0).ln();
        assert!((hits[0].score - 2.0 * idf).abs() < 1e-6);
    }

    #[test]
    fn split_word_scores_like_separate_terms() {
        let texts = ["new new", "new york"];
        let joined = run(&texts, "new_york");
        let separate = run(&texts, "new york");
        assert_eq!(joined, separate);
        assert_eq!(ids(&joined), vec![1, 0]);
        assert!(joined[0].score > joined[1].score);
    }

    #[test]
    fn unbounded_limit() {
        let index = InvertedIndex::build(["fox", "dog fox"]);
        let query = QueryParser::new().parse("fox").unwrap();
        assert_eq!(ids(&execute(&query, &index, usize::MAX)), vec![0, 1]);
    }

    #[test]
    fn limit_is_respected() {
        let texts: Vec<String> = (0..50).map(|i| format!("common {i}")).collect();
        let index = InvertedIndex::build(&texts);
        let query = QueryParser::new().parse("common").unwrap();
        let hits = execute(&query, &index, 7);
        assert_eq!(ids(&hits), vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(execute(&query, &index, 0).is_empty());
    }

    #[test]
    fn empty_inputs() {
        assert!(run(&[], "fox").is_empty());
        assert!(run(&["fox"], "").is_empty());
        assert!(run(&["fox"], "zebra").is_empty());
    }
}
