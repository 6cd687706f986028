//! Shell-style glob matching against bare filenames.
//!
//! `*` matches any run of characters, `?` exactly one; everything else is
//! literal. Matching is anchored and case-insensitive.

use regex::{Regex, RegexBuilder};

/// Longest prefix of a rejected pattern quoted back in the error.
const QUOTE_LIMIT: usize = 40;

/// A pattern that could not be compiled, e.g. one over the regex size limit.
#[derive(Debug, thiserror::Error)]
#[error("invalid pattern '{pattern}': {source}")]
pub struct PatternError {
    pattern: String,
    source: regex::Error,
}

/// A compiled set of glob patterns.
///
/// Blank and whitespace-only patterns are dropped at construction, so a set
/// made only of blanks is empty. Any other pattern must compile; a set never
/// loses a pattern silently.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    compiled: Vec<Regex>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let compiled = patterns
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(glob_to_regex)
            .collect::<Result<_, _>>()?;
        Ok(Self { compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// True if `filename` matches any pattern, or if the set is empty.
    ///
    /// The empty case is vacuous truth; callers using a set for exclusion
    /// check `is_empty` first.
    pub fn matches(&self, filename: &str) -> bool {
        self.is_empty() || self.compiled.iter().any(|re| re.is_match(filename))
    }
}

/// Escape the literal parts, then swap the escaped wildcards back in.
fn glob_to_regex(pattern: &str) -> Result<Regex, PatternError> {
    let body = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()
        .map_err(|source| PatternError {
            pattern: quote(pattern),
            source,
        })
}

fn quote(pattern: &str) -> String {
    match pattern.char_indices().nth(QUOTE_LIMIT) {
        Some((end, _)) => format!("{}...", &pattern[..end]),
        None => pattern.to_string(),
    }
}
