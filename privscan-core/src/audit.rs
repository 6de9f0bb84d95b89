use crate::aggregate::{Aggregator, Evaluations, ScanStatus};
use crate::cookies::CookieClassifier;
use crate::error::Result;
use crate::model::{AuditTarget, Evaluation};
use crate::policy::RiskPolicy;
use crate::report::ComplianceReport;
use crate::signatures::SignatureSet;
use crate::trackers::TrackerDetector;
use crate::transparency::TransparencyDetector;
use crate::transport::TransportValidator;
use indicatif::{ProgressBar, ProgressStyle};
use privscan_scanner::collector::DEFAULT_COLLECT_TIMEOUT_SECS;
use privscan_scanner::markup::extract_links;
use privscan_scanner::tls::DEFAULT_TLS_TIMEOUT_SECS;
use privscan_scanner::{Collection, Collector, TlsProbe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_DEADLINE_SECS: u64 = 60;

/// Options for configuring a single audit
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub collector_timeout: Duration,
    pub tls_timeout: Duration,
    /// Hard limit for the whole audit, probe and collection included.
    pub deadline: Duration,
    /// Overrides the port used by the TLS probe.
    pub tls_port: Option<u16>,
    pub policy: RiskPolicy,
    pub trackers: SignatureSet,
    pub disclosure_keywords: SignatureSet,
    pub show_progress: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            collector_timeout: Duration::from_secs(DEFAULT_COLLECT_TIMEOUT_SECS),
            tls_timeout: Duration::from_secs(DEFAULT_TLS_TIMEOUT_SECS),
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
            tls_port: None,
            policy: RiskPolicy::default(),
            trackers: SignatureSet::default_trackers(),
            disclosure_keywords: SignatureSet::default_disclosure_keywords(),
            show_progress: false,
        }
    }
}

/// Callback for reporting audit progress
pub type AuditProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Audit one site: the TLS probe and page collection run concurrently, then
/// the four evaluators score what was observed.
///
/// Errors only for an invalid policy. A collection failure or a blown
/// deadline yields an unavailable report, never a partial score.
pub async fn execute_audit<C: Collector>(
    target: &AuditTarget,
    collector: &C,
    options: &AuditOptions,
    progress_callback: Option<AuditProgressCallback>,
) -> Result<ComplianceReport> {
    let aggregator = Aggregator::new(options.policy.clone())?;

    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let report_progress = |message: String| {
        if let Some(pb) = &progress_bar {
            pb.set_message(message.clone());
        }
        if let Some(callback) = &progress_callback {
            callback(message);
        }
    };

    let mut probe = TlsProbe::new(options.tls_timeout);
    if let Some(port) = options.tls_port {
        probe = probe.with_port(port);
    }
    let validator = TransportValidator::with_probe(probe);

    report_progress(format!("Auditing {}...", target.url));
    info!("Starting audit of {}", target.url);

    let work = async {
        tokio::join!(
            validator.validate(target),
            collector.collect(&target.url, options.collector_timeout)
        )
    };

    let (transport, collection) = match tokio::time::timeout(options.deadline, work).await {
        Ok(outcome) => outcome,
        Err(_) => {
            let reason = format!("Audit deadline exceeded ({:?})", options.deadline);
            warn!("Audit of {} exceeded its deadline", target.url);
            finish(progress_bar.as_ref(), "Audit failed");
            return Ok(aggregator.unavailable(&reason));
        }
    };

    if !collection.success {
        let reason = collection
            .error
            .clone()
            .unwrap_or_else(|| "page could not be loaded".to_string());
        warn!("Collection of {} failed: {}", target.url, reason);
        finish(progress_bar.as_ref(), "Audit failed");
        return Ok(aggregator.unavailable(&reason));
    }

    report_progress("Evaluating...".to_string());
    let evaluations = evaluate(target, transport, &collection, options);
    let report = aggregator.aggregate(&evaluations, &ScanStatus::Completed);

    finish(progress_bar.as_ref(), "Audit complete");
    Ok(report)
}

/// Score a successful collection. The transport verdict is taken as given.
fn evaluate(
    target: &AuditTarget,
    transport: Evaluation,
    collection: &Collection,
    options: &AuditOptions,
) -> Evaluations {
    let links = extract_links(&collection.rendered_markup);
    debug!(
        "{}: {} cookies, {} links, {} third-party destinations",
        target.hostname,
        collection.cookies.len(),
        links.len(),
        collection.third_party_destinations.len()
    );

    let cookies =
        CookieClassifier::new(&options.policy).classify(&target.hostname, &collection.cookies);
    let transparency =
        TransparencyDetector::new(options.disclosure_keywords.clone()).detect(&links);
    let trackers = TrackerDetector::new(options.trackers.clone(), &options.policy)
        .detect(&collection.third_party_destinations);

    Evaluations {
        transport,
        cookies,
        transparency,
        trackers,
    }
}

fn finish(progress_bar: Option<&ProgressBar>, message: &'static str) {
    if let Some(pb) = progress_bar {
        pb.finish_with_message(message);
    }
}
