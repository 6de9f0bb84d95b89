// Tests for the cookie, transparency and tracker evaluators

use privscan_core::cookies::{self, CookieBreakdown, CookieClassifier, is_first_party, partition};
use privscan_core::model::{Dimension, Risk};
use privscan_core::policy::RiskPolicy;
use privscan_core::signatures::SignatureSet;
use privscan_core::trackers::{self, TrackerDetector};
use privscan_core::transparency::{self, TransparencyDetector};
use privscan_scanner::{CookieRecord, LinkRecord};
use std::collections::BTreeSet;

fn destinations(hosts: &[&str]) -> BTreeSet<String> {
    hosts.iter().map(|h| h.to_string()).collect()
}

// ============================================================================
// Cookie Tests
// ============================================================================

#[test]
fn test_no_cookies_is_zero_risk() {
    let evaluation = cookies::classify("example.com", &[]);
    assert_eq!(evaluation.dimension, Dimension::Cookies);
    assert_eq!(evaluation.risk, Risk::NONE);
    assert_eq!(evaluation.finding, "No cookies detected");
}

#[test]
fn test_first_party_matches_own_and_parent_domains() {
    assert!(is_first_party("example.com", &CookieRecord::new("a", "example.com")));
    assert!(is_first_party("example.com", &CookieRecord::new("a", ".example.com")));
    assert!(is_first_party("example.com", &CookieRecord::new("a", "shop.example.com")));
    assert!(!is_first_party("example.com", &CookieRecord::new("a", "tracker.io")));
    assert!(!is_first_party("", &CookieRecord::new("a", "tracker.io")));
}

#[test]
fn test_partition_counts() {
    let jar = vec![
        CookieRecord::new("sid", "example.com"),
        CookieRecord::new("pref", ".example.com"),
        CookieRecord::new("_ga", ".doubleclick.net"),
    ];
    let breakdown = partition("example.com", &jar);
    assert_eq!(breakdown.first_party, 2);
    assert_eq!(breakdown.third_party, 1);
    assert_eq!(breakdown.total(), 3);
}

#[test]
fn test_cookie_finding_reports_breakdown() {
    let jar = vec![
        CookieRecord::new("sid", "example.com"),
        CookieRecord::new("uid", "tracker.io"),
    ];
    let evaluation = cookies::classify("example.com", &jar);
    assert_eq!(
        evaluation.finding,
        "Cookies detected: 2 (First-Party: 1, Third-Party: 1)"
    );
    assert!((evaluation.risk.value() - 0.15).abs() < 1e-9);
}

#[test]
fn test_cookie_risk_is_monotonic() {
    let classifier = CookieClassifier::default();
    for first_party in 0..25 {
        for third_party in 0..15 {
            let base = classifier.risk(CookieBreakdown {
                first_party,
                third_party,
            });
            let more_first = classifier.risk(CookieBreakdown {
                first_party: first_party + 1,
                third_party,
            });
            let more_third = classifier.risk(CookieBreakdown {
                first_party,
                third_party: third_party + 1,
            });
            assert!(more_first >= base);
            assert!(more_third >= base);
        }
    }
}

#[test]
fn test_third_party_cookie_weighs_more_than_first_party() {
    let classifier = CookieClassifier::default();
    let base = CookieBreakdown {
        first_party: 2,
        third_party: 2,
    };
    let plus_first = classifier.risk(CookieBreakdown {
        first_party: 3,
        ..base
    });
    let plus_third = classifier.risk(CookieBreakdown {
        third_party: 3,
        ..base
    });
    let base_risk = classifier.risk(base).value();
    assert!((plus_first.value() - base_risk - 0.05).abs() < 1e-9);
    assert!((plus_third.value() - base_risk - 0.1).abs() < 1e-9);
    assert!(plus_third > plus_first);
}

#[test]
fn test_cookie_risk_saturates() {
    let classifier = CookieClassifier::default();
    let risk = classifier.risk(CookieBreakdown {
        first_party: 40,
        third_party: 40,
    });
    assert_eq!(risk, Risk::MAX);
}

#[test]
fn test_cookie_classifier_uses_policy_increments() {
    let policy = RiskPolicy {
        first_party_cookie_risk: 0.0,
        third_party_cookie_risk: 0.5,
        ..RiskPolicy::default()
    };
    let classifier = CookieClassifier::new(&policy);
    let jar = vec![
        CookieRecord::new("sid", "example.com"),
        CookieRecord::new("uid", "ads.example.net"),
    ];
    let evaluation = classifier.classify("example.com", &jar);
    assert!((evaluation.risk.value() - 0.5).abs() < 1e-9);
}

// ============================================================================
// Transparency Tests
// ============================================================================

#[test]
fn test_policy_link_found_by_text() {
    let links = vec![
        LinkRecord::new("Home", "/"),
        LinkRecord::new("Privacy Policy", "/legal"),
    ];
    let evaluation = transparency::detect(&links);
    assert_eq!(evaluation.dimension, Dimension::Transparency);
    assert_eq!(evaluation.risk, Risk::NONE);
    assert_eq!(evaluation.finding, "Privacy policy link found");
}

#[test]
fn test_policy_link_found_by_href() {
    let links = vec![LinkRecord::new("Legal", "/gdpr-notice")];
    assert_eq!(transparency::detect(&links).risk, Risk::NONE);
}

#[test]
fn test_policy_link_match_is_case_insensitive() {
    let links = vec![LinkRecord::new("DATENSCHUTZ", "/ds")];
    assert_eq!(transparency::detect(&links).risk, Risk::NONE);
}

#[test]
fn test_no_policy_link_is_full_risk() {
    let links = vec![LinkRecord::new("Home", "/"), LinkRecord::new("Shop", "/shop")];
    let evaluation = transparency::detect(&links);
    assert_eq!(evaluation.risk, Risk::MAX);
    assert_eq!(evaluation.finding, "No privacy policy link detected");
}

#[test]
fn test_empty_links_is_full_risk() {
    assert_eq!(transparency::detect(&[]).risk, Risk::MAX);
}

#[test]
fn test_custom_disclosure_keywords() {
    let detector = TransparencyDetector::new(SignatureSet::new(["informativa"]));
    let links = vec![
        LinkRecord::new("Privacy", "/privacy"),
        LinkRecord::new("Informativa", "/info"),
    ];
    let found = detector.find_policy_link(&links).unwrap();
    assert_eq!(found.href, "/info");
}

// ============================================================================
// Tracker Tests
// ============================================================================

#[test]
fn test_no_trackers_is_zero_risk() {
    let evaluation = trackers::detect(&BTreeSet::new());
    assert_eq!(evaluation.dimension, Dimension::Trackers);
    assert_eq!(evaluation.risk, Risk::NONE);
    assert_eq!(evaluation.finding, "No major third-party trackers detected");
}

#[test]
fn test_unknown_destinations_are_not_trackers() {
    let evaluation = trackers::detect(&destinations(&["cdn.example.net", "fonts.bunny.net"]));
    assert_eq!(evaluation.risk, Risk::NONE);
}

#[test]
fn test_tracker_risk_per_destination() {
    let evaluation = trackers::detect(&destinations(&[
        "connect.facebook.net",
        "www.googletagmanager.com",
    ]));
    assert!((evaluation.risk.value() - 0.4).abs() < 1e-9);
    assert_eq!(evaluation.finding, "Third-party trackers detected: 2");
    assert_eq!(
        evaluation.detail.as_deref(),
        Some("connect.facebook.net, www.googletagmanager.com")
    );
}

#[test]
fn test_tracker_risk_saturates_at_five() {
    let hosts = [
        "connect.facebook.net",
        "www.google-analytics.com",
        "static.hotjar.com",
        "cdn.segment.com",
        "bat.bing.com",
        "snap.licdn.linkedin.com",
    ];
    let detector = TrackerDetector::default();
    for n in 5..=hosts.len() {
        let evaluation = detector.detect(&destinations(&hosts[..n]));
        assert_eq!(evaluation.risk, Risk::MAX, "{} trackers", n);
    }
    let four = detector.detect(&destinations(&hosts[..4]));
    assert!(four.risk < Risk::MAX);
}

#[test]
fn test_tracker_matches_are_distinct() {
    let detector = TrackerDetector::default();
    let hosts = vec![
        "Connect.Facebook.net".to_string(),
        "connect.facebook.net".to_string(),
    ];
    assert_eq!(detector.matched(&hosts), vec!["connect.facebook.net"]);
}

#[test]
fn test_custom_tracker_signatures() {
    let detector = TrackerDetector::new(SignatureSet::new(["tracker.io"]), &RiskPolicy::default());
    let evaluation = detector.detect(&destinations(&["tracker.io", "cdn.example.net"]));
    assert!((evaluation.risk.value() - 0.2).abs() < 1e-9);
}
