// Third-party tracking: which observed destinations belong to known vendors

use crate::model::{Dimension, Evaluation, Risk};
use crate::policy::RiskPolicy;
use crate::signatures::SignatureSet;
use std::collections::BTreeSet;

pub struct TrackerDetector {
    signatures: SignatureSet,
    per_tracker_risk: f64,
}

impl TrackerDetector {
    pub fn new(signatures: SignatureSet, policy: &RiskPolicy) -> Self {
        Self {
            signatures,
            per_tracker_risk: policy.tracker_risk,
        }
    }

    /// Distinct destinations matching a vendor signature, sorted.
    pub fn matched<'a, I>(&self, destinations: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        destinations
            .into_iter()
            .map(|host| host.trim().to_lowercase())
            .filter(|host| self.signatures.matches(host))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn detect<'a, I>(&self, destinations: I) -> Evaluation
    where
        I: IntoIterator<Item = &'a String>,
    {
        let matched = self.matched(destinations);
        if matched.is_empty() {
            return Evaluation::new(
                Dimension::Trackers,
                Risk::NONE,
                "No major third-party trackers detected",
            );
        }

        Evaluation::new(
            Dimension::Trackers,
            Risk::new(matched.len() as f64 * self.per_tracker_risk),
            format!("Third-party trackers detected: {}", matched.len()),
        )
        .with_detail(matched.join(", "))
    }
}

impl Default for TrackerDetector {
    fn default() -> Self {
        Self::new(SignatureSet::default_trackers(), &RiskPolicy::default())
    }
}

pub fn detect(destinations: &BTreeSet<String>) -> Evaluation {
    TrackerDetector::default().detect(destinations)
}
