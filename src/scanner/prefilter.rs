//! Keyword prefilter
//!
//! One Aho-Corasick automaton over every rule keyword, built once per scan
//! run and shared read-only by all file workers. A file is only handed to
//! the regex detector for the rules whose keyword the automaton saw.

use crate::scanner::error::{ScanError, ScanResult};
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct PrefilterIndex {
    automaton: AhoCorasick,
    /// Lowercased keywords, indexed by automaton pattern id
    keywords: Vec<String>,
}

impl PrefilterIndex {
    /// Build the automaton from a keyword set
    ///
    /// Keywords are folded to ASCII lowercase and deduplicated; empty
    /// keywords are ignored.
    pub fn build<I, S>(keywords: I) -> ScanResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().to_ascii_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&keywords)
            .map_err(|e| ScanError::Configuration {
                message: format!("cannot build keyword prefilter: {}", e),
            })?;

        Ok(Self {
            automaton,
            keywords,
        })
    }

    /// Keywords present in `text`, lowercased
    pub fn matches(&self, text: &str) -> HashSet<String> {
        self.automaton
            .find_iter(text)
            .map(|m| self.keywords[m.pattern().as_usize()].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
