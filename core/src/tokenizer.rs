use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{Alphabetic}\p{N}]+").expect("valid regex");
}

/// Normalize a single term: NFKC composition followed by locale-independent lower-casing.
///
/// Both the document side and the query side (including wildcard patterns) go through this
/// function, so a term produced at build time always equals the same term produced at query time.
pub fn normalize(raw: &str) -> String {
    raw.nfkc().collect::<String>().to_lowercase()
}

/// Tokenize text into (term, position). Positions are ordinal token indexes, starting at 0.
pub fn tokenize_with_positions(text: &str) -> Vec<(String, usize)> {
    let composed = text.nfkc().collect::<String>();
    RE.find_iter(&composed)
        .map(|m| m.as_str().to_lowercase())
        .filter(|term| !term.is_empty())
        .enumerate()
        .map(|(pos, term)| (term, pos))
        .collect()
}

/// Tokenize text into normalized terms, preserving order. No stopwords are removed.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with_positions(text).into_iter().map(|(term, _)| term).collect()
}
