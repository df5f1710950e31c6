use aho_corasick::{AhoCorasick, MatchKind};

use super::CharFilter;
use crate::error::{LookupError, Result};

/// A char filter that replaces literal strings with fixed replacements.
///
/// Matching is leftmost-longest, so overlapping keys resolve to the longest
/// key starting at the earliest position.
pub struct MappingCharFilter {
    ac: AhoCorasick,
    replacements: Vec<String>,
}

impl MappingCharFilter {
    /// Create a filter from `(from, to)` pairs. Keys are matched in the
    /// order given when they are otherwise equivalent.
    pub fn new<I, K, V>(mapping: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut keys: Vec<String> = Vec::new();
        let mut replacements = Vec::new();

        for (k, v) in mapping {
            keys.push(k.into());
            replacements.push(v.into());
        }

        let ac = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&keys)
            .map_err(|e| LookupError::Anyhow(anyhow::Error::from(e)))?;

        Ok(Self { ac, replacements })
    }
}

impl CharFilter for MappingCharFilter {
    fn filter(&self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let mut last_match_end = 0;

        for m in self.ac.find_iter(input) {
            output.push_str(&input[last_match_end..m.start()]);
            output.push_str(&self.replacements[m.pattern().as_usize()]);
            last_match_end = m.end();
        }

        output.push_str(&input[last_match_end..]);
        output
    }

    fn name(&self) -> &'static str {
        "mapping"
    }
}
