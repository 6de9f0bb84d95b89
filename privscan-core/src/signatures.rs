// Pluggable keyword lists for the substring classifiers

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_TRACKERS: &str = include_str!("../signatures/trackers.txt");
pub const DEFAULT_DISCLOSURE_KEYWORDS: &str = include_str!("../signatures/disclosure.txt");

/// Lower-cased, de-duplicated substrings matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSet {
    entries: Vec<String>,
}

impl SignatureSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            entries: Vec::new(),
        };
        for entry in entries {
            let entry = entry.as_ref().trim().to_lowercase();
            if !entry.is_empty() && !set.entries.contains(&entry) {
                set.entries.push(entry);
            }
        }
        set
    }

    /// Parse a newline-delimited list; `#` comments and blank lines are skipped.
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn default_trackers() -> Self {
        Self::parse(DEFAULT_TRACKERS)
    }

    pub fn default_disclosure_keywords() -> Self {
        Self::parse(DEFAULT_DISCLOSURE_KEYWORDS)
    }

    /// First entry contained in `haystack`, if any.
    pub fn find_match(&self, haystack: &str) -> Option<&str> {
        let haystack = haystack.to_lowercase();
        self.entries
            .iter()
            .find(|entry| haystack.contains(entry.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.find_match(haystack).is_some()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
