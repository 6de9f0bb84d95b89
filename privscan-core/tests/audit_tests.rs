// Tests for the audit pipeline, using a scripted collector

use privscan_core::audit::{AuditOptions, AuditProgressCallback, execute_audit};
use privscan_core::model::{AuditTarget, Dimension, Risk};
use privscan_core::policy::RiskPolicy;
use privscan_core::report::Score;
use privscan_core::signatures::SignatureSet;
use privscan_scanner::{Collection, Collector, CookieRecord};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Returns a canned collection, optionally after a delay.
struct ScriptedCollector {
    collection: Collection,
    delay: Option<Duration>,
}

impl ScriptedCollector {
    fn new(collection: Collection) -> Self {
        Self {
            collection,
            delay: None,
        }
    }

    fn slow(collection: Collection, delay: Duration) -> Self {
        Self {
            collection,
            delay: Some(delay),
        }
    }
}

impl Collector for ScriptedCollector {
    async fn collect(&self, _url: &Url, _timeout: Duration) -> Collection {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.collection.clone()
    }
}

fn collection(url: &str) -> Collection {
    Collection::new(url.to_string())
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_http_site_with_trackers_scores_30() {
    let target = AuditTarget::parse("http://example.com/").unwrap();
    let mut page = collection("http://example.com/");
    page.rendered_markup = r#"<html><body><a href="/shop">Shop</a></body></html>"#.to_string();
    page.third_party_destinations = [
        "www.google-analytics.com",
        "connect.facebook.net",
        "static.hotjar.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let report = execute_audit(
        &target,
        &ScriptedCollector::new(page),
        &AuditOptions::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.score, Score::Value(30));
    let components = report.components.unwrap();
    assert_eq!(components.transport, Risk::MAX);
    assert_eq!(components.cookies, Risk::NONE);
    assert_eq!(components.transparency, Risk::MAX);
    assert!((components.trackers.value() - 0.6).abs() < 1e-9);
}

#[tokio::test]
async fn test_markup_links_feed_transparency_and_cookies_feed_provenance() {
    let target = AuditTarget::parse("http://www.example.com/").unwrap();
    let mut page = collection("http://www.example.com/");
    page.rendered_markup =
        r#"<footer><a href="/privacy">Privacy Policy</a></footer>"#.to_string();
    page.cookies = vec![
        CookieRecord::new("sid", "www.example.com"),
        CookieRecord::new("uid", ".tracker.io"),
    ];
    page.third_party_destinations = ["tracker.io".to_string()].into();

    let options = AuditOptions {
        trackers: SignatureSet::new(["doubleclick"]),
        ..AuditOptions::default()
    };
    let report = execute_audit(&target, &ScriptedCollector::new(page), &options, None)
        .await
        .unwrap();

    let components = report.components.unwrap();
    assert_eq!(components.transparency, Risk::NONE);
    assert!((components.cookies.value() - 0.15).abs() < 1e-9);
    assert_eq!(components.trackers, Risk::NONE);
    // Plain http costs the full transport weight: 0.30 + 0.20 * 0.15
    assert_eq!(report.score, Score::Value(67));
}

#[tokio::test]
async fn test_failed_collection_is_unavailable() {
    let target = AuditTarget::parse("http://example.com/").unwrap();
    let page = Collection::failed(
        "http://example.com/".to_string(),
        "net::ERR_TIMED_OUT".to_string(),
    );

    let report = execute_audit(
        &target,
        &ScriptedCollector::new(page),
        &AuditOptions::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.score, Score::Unavailable);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].message, "Scan error: net::ERR_TIMED_OUT");
    assert!(report.components.is_none());
}

#[tokio::test]
async fn test_failed_collection_ignores_partial_data() {
    let target = AuditTarget::parse("http://example.com/").unwrap();
    let mut page = Collection::failed("http://example.com/".to_string(), "blocked".to_string());
    page.rendered_markup = r#"<a href="/privacy">Privacy</a>"#.to_string();
    page.cookies = vec![CookieRecord::new("sid", "example.com")];

    let report = execute_audit(
        &target,
        &ScriptedCollector::new(page),
        &AuditOptions::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.score, Score::Unavailable);
}

#[tokio::test]
async fn test_deadline_exceeded_is_unavailable() {
    let target = AuditTarget::parse("http://example.com/").unwrap();
    let collector =
        ScriptedCollector::slow(collection("http://example.com/"), Duration::from_secs(5));
    let options = AuditOptions {
        deadline: Duration::from_millis(100),
        ..AuditOptions::default()
    };

    let report = execute_audit(&target, &collector, &options, None)
        .await
        .unwrap();

    assert_eq!(report.score, Score::Unavailable);
    assert!(report.findings[0].message.starts_with("Scan error: Audit deadline exceeded"));
}

#[tokio::test]
async fn test_https_probe_failure_is_scored_not_fatal() {
    let target = AuditTarget::parse("https://127.0.0.1/").unwrap();
    let mut page = collection("https://127.0.0.1/");
    page.rendered_markup = r#"<a href="/privacy">Privacy</a>"#.to_string();

    let options = AuditOptions {
        tls_timeout: Duration::from_secs(2),
        tls_port: Some(closed_port()),
        ..AuditOptions::default()
    };
    let report = execute_audit(&target, &ScriptedCollector::new(page), &options, None)
        .await
        .unwrap();

    assert_eq!(report.score, Score::Value(70));
    assert_eq!(report.findings[0].dimension, Some(Dimension::Transport));
    assert_eq!(
        report.findings[0].message,
        "Invalid or missing SSL certificate, or host unreachable"
    );
}

#[tokio::test]
async fn test_invalid_policy_is_an_error() {
    let target = AuditTarget::parse("http://example.com/").unwrap();
    let mut policy = RiskPolicy::default();
    policy.weights.trackers = 0.9;
    let options = AuditOptions {
        policy,
        ..AuditOptions::default()
    };

    let result = execute_audit(
        &target,
        &ScriptedCollector::new(collection("http://example.com/")),
        &options,
        None,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_progress_callback_receives_messages() {
    let target = AuditTarget::parse("http://example.com/").unwrap();
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();
    let callback: AuditProgressCallback = Arc::new(move |msg: String| {
        sink.lock().unwrap().push(msg);
    });

    execute_audit(
        &target,
        &ScriptedCollector::new(collection("http://example.com/")),
        &AuditOptions::default(),
        Some(callback),
    )
    .await
    .unwrap();

    let messages = messages.lock().unwrap();
    assert!(messages[0].contains("http://example.com/"));
    assert!(messages.iter().any(|m| m.starts_with("Evaluating")));
}
