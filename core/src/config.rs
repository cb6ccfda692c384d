use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RESULTS: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on the number of results a single search returns.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Accept wildcard terms starting with `*` or `?`.
    #[serde(default = "default_allow_leading_wildcard")]
    pub allow_leading_wildcard: bool,
}

fn default_max_results() -> usize { DEFAULT_MAX_RESULTS }
fn default_allow_leading_wildcard() -> bool { true }

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: default_max_results(), allow_leading_wildcard: default_allow_leading_wildcard() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: SearchConfig = serde_json::from_str(r#"{"max_results": 10}"#).unwrap();
        assert_eq!(cfg.max_results, 10);
        assert!(cfg.allow_leading_wildcard);

        let cfg: SearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.max_results, DEFAULT_MAX_RESULTS);
    }
}
