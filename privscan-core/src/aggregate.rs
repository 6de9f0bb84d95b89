//! Weighted aggregation of the four risk components
//!
//! `total_risk = Σ weight_i * risk_i` and
//! `score = clamp(round((1 - total_risk) * 100), 0, 100)`.
//! A scan that did not complete never produces a number.

use crate::error::Result;
use crate::model::{Dimension, Evaluation, FindingStatus};
use crate::policy::RiskPolicy;
use crate::report::{ComplianceReport, Finding, RiskComponents, Score};
use tracing::{debug, info};

/// Outcome of the page collection step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Completed,
    Failed { reason: String },
}

impl ScanStatus {
    pub fn failed(reason: impl Into<String>) -> Self {
        ScanStatus::Failed {
            reason: reason.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, ScanStatus::Completed)
    }
}

/// One evaluation per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluations {
    pub transport: Evaluation,
    pub cookies: Evaluation,
    pub transparency: Evaluation,
    pub trackers: Evaluation,
}

impl Evaluations {
    /// Evaluations in the fixed reporting order.
    pub fn in_order(&self) -> [&Evaluation; 4] {
        [
            &self.transport,
            &self.cookies,
            &self.transparency,
            &self.trackers,
        ]
    }

    pub fn components(&self) -> RiskComponents {
        RiskComponents {
            transport: self.transport.risk,
            cookies: self.cookies.risk,
            transparency: self.transparency.risk,
            trackers: self.trackers.risk,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    policy: RiskPolicy,
}

impl Aggregator {
    /// Rejects policies whose weights do not sum to 1.0.
    pub fn new(policy: RiskPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    pub fn total_risk(&self, components: &RiskComponents) -> f64 {
        debug_assert!((self.policy.weights.sum() - 1.0).abs() < 1e-9);
        Dimension::ALL
            .iter()
            .map(|d| self.policy.weights.get(*d) * components.get(*d).value())
            .sum()
    }

    pub fn score_for(total_risk: f64) -> u8 {
        let raw = ((1.0 - total_risk) * 100.0).round();
        if raw.is_nan() {
            return 0;
        }
        raw.clamp(0.0, 100.0) as u8
    }

    pub fn aggregate(&self, evaluations: &Evaluations, status: &ScanStatus) -> ComplianceReport {
        if let ScanStatus::Failed { reason } = status {
            // Partial evaluations are deliberately ignored
            return self.unavailable(reason);
        }

        let components = evaluations.components();
        let total_risk = self.total_risk(&components);
        let score = Self::score_for(total_risk);

        let mut findings = Vec::with_capacity(4);
        let mut legal_summary: Vec<String> = Vec::new();
        for evaluation in evaluations.in_order() {
            let citation = evaluation.dimension.citation().to_string();
            if !legal_summary.contains(&citation) {
                legal_summary.push(citation.clone());
            }
            debug!(
                "{}: risk {:.2} ({})",
                evaluation.dimension,
                evaluation.risk.value(),
                evaluation.finding
            );
            findings.push(Finding {
                dimension: Some(evaluation.dimension),
                status: FindingStatus::for_risk(evaluation.risk),
                message: evaluation.finding.clone(),
                citation: Some(citation),
                detail: evaluation.detail.clone(),
            });
        }

        info!("Total risk {:.4}, compliance score {}", total_risk, score);
        ComplianceReport {
            score: Score::Value(score),
            findings,
            legal_summary,
            components: Some(components),
            total_risk: Some(total_risk),
        }
    }

    /// Report for a scan that could not complete.
    pub fn unavailable(&self, reason: &str) -> ComplianceReport {
        info!("Scan failed, no score generated: {}", reason);
        ComplianceReport {
            score: Score::Unavailable,
            findings: vec![Finding {
                dimension: None,
                status: FindingStatus::Fail,
                message: format!("Scan error: {}", reason),
                citation: None,
                detail: None,
            }],
            legal_summary: Vec::new(),
            components: None,
            total_risk: None,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            policy: RiskPolicy::default(),
        }
    }
}

