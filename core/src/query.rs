//! Keyword query parsing.
//!
//! Grammar, loosely following the classic Lucene syntax:
//! - `fox dog` matches documents containing any of the terms
//! - `+fox` requires, `-fox` prohibits a clause
//! - `fox AND dog`, `fox && dog`, `fox OR dog`, `fox || dog`, `NOT dog`
//! - `"quick fox"` matches the terms at consecutive positions
//! - `*ox`, `f?x`, `qu*` match every indexed term fitting the pattern
//! - `\` escapes the next character
//!
//! Terms are normalized with the same tokenizer used when indexing.

use crate::error::{Result, SearchError};
use crate::tokenizer::{normalize, tokenize};
use regex::Regex;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    Should,
    Must,
    MustNot,
}

#[derive(Debug, Clone)]
pub enum QueryNode {
    Term(String),
    Phrase(Vec<String>),
    Wildcard(WildcardPattern),
}

#[derive(Debug, Clone)]
pub struct Clause {
    pub occur: Occur,
    pub node: QueryNode,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedQuery {
    pub clauses: Vec<Clause>,
}

impl ParsedQuery {
    /// True when no document can possibly match.
    pub fn matches_nothing(&self) -> bool {
        !self.clauses.iter().any(|c| c.occur != Occur::MustNot)
    }
}

/// A normalized `*`/`?` pattern compiled to an anchored regex.
#[derive(Clone)]
pub struct WildcardPattern {
    pattern: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = normalize(pattern);
        let mut re = String::with_capacity(pattern.len() + 8);
        re.push('^');
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                c => re.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
            }
        }
        re.push('$');
        let regex = Regex::new(&re).map_err(|e| SearchError::malformed(format!("invalid wildcard pattern: {e}"), 0))?;
        Ok(Self { pattern, regex })
    }

    pub fn as_str(&self) -> &str { &self.pattern }

    pub fn matches(&self, term: &str) -> bool { self.regex.is_match(term) }
}

impl fmt::Debug for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WildcardPattern").field(&self.pattern).finish()
    }
}

const UNSUPPORTED: &[char] = &['(', ')', '[', ']', '{', '}', '^', '~', ':'];

#[derive(Debug, Clone)]
pub struct QueryParser {
    allow_leading_wildcard: bool,
}

impl Default for QueryParser {
    fn default() -> Self { Self::new() }
}

impl QueryParser {
    pub fn new() -> Self { Self { allow_leading_wildcard: true } }

    pub fn with_leading_wildcard(mut self, allow: bool) -> Self {
        self.allow_leading_wildcard = allow;
        self
    }

    pub fn parse(&self, keyword: &str) -> Result<ParsedQuery> {
        let lexemes = lex(keyword)?;
        let mut clauses: Vec<Clause> = Vec::new();
        // clauses produced by the previous operand; empty when it normalized to nothing
        let mut prev_operand: Option<Range<usize>> = None;
        let mut pending_and = false;
        let mut pending_not = false;
        let mut pending_op: Option<(&'static str, usize)> = None;

        for lx in lexemes {
            let is_and = lx.kind == LexKind::And;
            match lx.kind {
                LexKind::And | LexKind::Or => {
                    let name = if is_and { "AND" } else { "OR" };
                    if prev_operand.is_none() || pending_op.is_some() {
                        return Err(SearchError::malformed(format!("operator {name} is missing its left operand"), lx.offset));
                    }
                    pending_and = is_and;
                    if pending_and {
                        if let Some(range) = prev_operand.clone() {
                            clauses[range].iter_mut().for_each(promote);
                        }
                    }
                    pending_op = Some((name, lx.offset));
                }
                LexKind::Not => {
                    if pending_not {
                        return Err(SearchError::malformed("operator NOT is repeated", lx.offset));
                    }
                    pending_not = true;
                    pending_op = Some(("NOT", lx.offset));
                }
                LexKind::Word { prefix, text, quoted, wildcard } => {
                    let mut occur = prefix;
                    if pending_not {
                        occur = Occur::MustNot;
                    } else if pending_and && occur == Occur::Should {
                        occur = Occur::Must;
                    }
                    pending_and = false;
                    pending_not = false;
                    pending_op = None;

                    let start = clauses.len();
                    let nodes = self.nodes_for(&text, quoted, wildcard, lx.offset)?;
                    clauses.extend(nodes.into_iter().map(|node| Clause { occur, node }));
                    prev_operand = Some(start..clauses.len());
                }
            }
        }

        if let Some((name, offset)) = pending_op {
            return Err(SearchError::malformed(format!("operator {name} is missing its right operand"), offset));
        }
        let parsed = ParsedQuery { clauses };
        tracing::debug!(query = ?parsed, "parsed keyword");
        Ok(parsed)
    }

    /// An unquoted word that normalizes to several terms yields one term clause per token.
    fn nodes_for(&self, text: &str, quoted: bool, wildcard: bool, offset: usize) -> Result<Vec<QueryNode>> {
        if wildcard {
            if !self.allow_leading_wildcard && text.starts_with(|c| c == '*' || c == '?') {
                return Err(SearchError::malformed("leading wildcards are not allowed", offset));
            }
            let pattern = WildcardPattern::new(text).map_err(|_| SearchError::malformed("invalid wildcard pattern", offset))?;
            return Ok(vec![QueryNode::Wildcard(pattern)]);
        }
        let terms = tokenize(text);
        Ok(if quoted && terms.len() > 1 {
            vec![QueryNode::Phrase(terms)]
        } else {
            terms.into_iter().map(QueryNode::Term).collect()
        })
    }
}

fn promote(clause: &mut Clause) {
    if clause.occur == Occur::Should {
        clause.occur = Occur::Must;
    }
}

#[derive(Debug, Clone, PartialEq)]
enum LexKind {
    And,
    Or,
    Not,
    Word { prefix: Occur, text: String, quoted: bool, wildcard: bool },
}

#[derive(Debug)]
struct Lexeme {
    kind: LexKind,
    offset: usize,
}

fn lex(input: &str) -> Result<Vec<Lexeme>> {
    let mut out = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut prefix = Occur::Should;
        if c == '+' || c == '-' {
            chars.next();
            match chars.peek() {
                Some(&(_, n)) if !n.is_whitespace() => {}
                _ => return Err(SearchError::malformed(format!("operator '{c}' must be followed by a term"), start)),
            }
            prefix = if c == '+' { Occur::Must } else { Occur::MustNot };
        }

        if let Some(&(qstart, '"')) = chars.peek() {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((i, c)) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, e)) => text.push(e),
                        None => return Err(SearchError::malformed("dangling escape character", i)),
                    },
                    c => text.push(c),
                }
            }
            if !closed {
                return Err(SearchError::malformed("unbalanced quote", qstart));
            }
            out.push(Lexeme { kind: LexKind::Word { prefix, text, quoted: true, wildcard: false }, offset: start });
            continue;
        }

        let mut text = String::new();
        let mut wildcard = false;
        let mut escaped_any = false;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            if c == '"' {
                return Err(SearchError::malformed("quote inside a term", i));
            }
            chars.next();
            match c {
                '\\' => match chars.next() {
                    Some((_, e)) => {
                        escaped_any = true;
                        // escaped wildcard characters are literals and never match a term
                        text.push(if e == '*' || e == '?' { ' ' } else { e });
                    }
                    None => return Err(SearchError::malformed("dangling escape character", i)),
                },
                '*' | '?' => {
                    wildcard = true;
                    text.push(c);
                }
                c if UNSUPPORTED.contains(&c) => {
                    return Err(SearchError::malformed(format!("unsupported operator '{c}'"), i));
                }
                c => text.push(c),
            }
        }

        let keyword = match (prefix, escaped_any, text.as_str()) {
            (Occur::Should, false, "AND" | "&&") => Some(LexKind::And),
            (Occur::Should, false, "OR" | "||") => Some(LexKind::Or),
            (Occur::Should, false, "NOT") => Some(LexKind::Not),
            _ => None,
        };
        let kind = keyword.unwrap_or_else(|| LexKind::Word { prefix, text, quoted: false, wildcard });
        out.push(Lexeme { kind, offset: start });
    }
    Ok(out)
}
