// Cookie provenance: first-party versus third-party cookies

use crate::model::{Dimension, Evaluation, Risk};
use crate::policy::RiskPolicy;
use privscan_scanner::CookieRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieBreakdown {
    pub first_party: usize,
    pub third_party: usize,
}

impl CookieBreakdown {
    pub fn total(&self) -> usize {
        self.first_party + self.third_party
    }
}

/// A cookie is first-party when the audited hostname appears in its domain,
/// both compared with the dot separators removed.
pub fn is_first_party(hostname: &str, cookie: &CookieRecord) -> bool {
    let site = strip_dots(hostname);
    !site.is_empty() && strip_dots(&cookie.domain).contains(&site)
}

pub fn partition(hostname: &str, cookies: &[CookieRecord]) -> CookieBreakdown {
    let first_party = cookies
        .iter()
        .filter(|cookie| is_first_party(hostname, cookie))
        .count();
    CookieBreakdown {
        first_party,
        third_party: cookies.len() - first_party,
    }
}

fn strip_dots(s: &str) -> String {
    s.chars().filter(|c| *c != '.').flat_map(char::to_lowercase).collect()
}

pub struct CookieClassifier {
    first_party_risk: f64,
    third_party_risk: f64,
}

impl CookieClassifier {
    pub fn new(policy: &RiskPolicy) -> Self {
        Self {
            first_party_risk: policy.first_party_cookie_risk,
            third_party_risk: policy.third_party_cookie_risk,
        }
    }

    pub fn risk(&self, breakdown: CookieBreakdown) -> Risk {
        Risk::new(
            breakdown.third_party as f64 * self.third_party_risk
                + breakdown.first_party as f64 * self.first_party_risk,
        )
    }

    pub fn classify(&self, hostname: &str, cookies: &[CookieRecord]) -> Evaluation {
        let breakdown = partition(hostname, cookies);
        if breakdown.total() == 0 {
            return Evaluation::new(Dimension::Cookies, Risk::NONE, "No cookies detected");
        }

        Evaluation::new(
            Dimension::Cookies,
            self.risk(breakdown),
            format!(
                "Cookies detected: {} (First-Party: {}, Third-Party: {})",
                breakdown.total(),
                breakdown.first_party,
                breakdown.third_party
            ),
        )
    }
}

impl Default for CookieClassifier {
    fn default() -> Self {
        Self::new(&RiskPolicy::default())
    }
}

/// Classify with the default policy.
pub fn classify(hostname: &str, cookies: &[CookieRecord]) -> Evaluation {
    CookieClassifier::default().classify(hostname, cookies)
}
