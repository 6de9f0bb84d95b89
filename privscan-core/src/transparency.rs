// Transparency: is a privacy disclosure reachable from the page?

use crate::model::{Dimension, Evaluation, Risk};
use crate::signatures::SignatureSet;
use privscan_scanner::LinkRecord;

pub struct TransparencyDetector {
    keywords: SignatureSet,
}

impl TransparencyDetector {
    pub fn new(keywords: SignatureSet) -> Self {
        Self { keywords }
    }

    /// The first link whose text or href names a disclosure keyword.
    pub fn find_policy_link<'a>(&self, links: &'a [LinkRecord]) -> Option<&'a LinkRecord> {
        links
            .iter()
            .find(|link| self.keywords.matches(&format!("{}{}", link.text, link.href)))
    }

    /// Binary signal: presence of an entry point, not its quality.
    pub fn detect(&self, links: &[LinkRecord]) -> Evaluation {
        match self.find_policy_link(links) {
            Some(link) => Evaluation::new(
                Dimension::Transparency,
                Risk::NONE,
                "Privacy policy link found",
            )
            .with_detail(format!("\"{}\" -> {}", link.text, link.href)),
            None => Evaluation::new(
                Dimension::Transparency,
                Risk::MAX,
                "No privacy policy link detected",
            ),
        }
    }
}

impl Default for TransparencyDetector {
    fn default() -> Self {
        Self::new(SignatureSet::default_disclosure_keywords())
    }
}

pub fn detect(links: &[LinkRecord]) -> Evaluation {
    TransparencyDetector::default().detect(links)
}
