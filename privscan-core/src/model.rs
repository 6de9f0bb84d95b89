// Data model shared by the evaluators and the aggregator

use crate::error::{AuditError, Result};
use privscan_scanner::host::normalize_host;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// The site under audit. The hostname is normalized before any matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    pub scheme: Scheme,
    pub hostname: String,
    pub path: String,
    pub url: Url,
}

impl AuditTarget {
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| AuditError::InvalidTarget(format!("{}: {}", input, e)))?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(AuditError::InvalidTarget(format!(
                    "unsupported scheme '{}'",
                    other
                )));
            }
        };

        let hostname = url
            .host_str()
            .map(normalize_host)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AuditError::InvalidTarget(format!("{} has no host", url)))?;

        Ok(Self {
            scheme,
            hostname,
            path: url.path().to_string(),
            url,
        })
    }

    /// Host as written in the URL, used for network connections.
    pub fn connect_host(&self) -> &str {
        self.url.host_str().unwrap_or(&self.hostname)
    }
}

/// One compliance dimension scored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Transport,
    Cookies,
    Transparency,
    Trackers,
}

impl Dimension {
    /// Fixed evaluation order used for findings.
    pub const ALL: [Dimension; 4] = [
        Dimension::Transport,
        Dimension::Cookies,
        Dimension::Transparency,
        Dimension::Trackers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Transport => "transport",
            Dimension::Cookies => "cookies",
            Dimension::Transparency => "transparency",
            Dimension::Trackers => "trackers",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "transport" | "ssl" => Some(Dimension::Transport),
            "cookies" => Some(Dimension::Cookies),
            "transparency" => Some(Dimension::Transparency),
            "trackers" => Some(Dimension::Trackers),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Transport => "Transport Security",
            Dimension::Cookies => "Cookie Provenance",
            Dimension::Transparency => "Transparency",
            Dimension::Trackers => "Third-Party Tracking",
        }
    }

    /// Regulatory citation attached to every finding of this dimension.
    pub fn citation(&self) -> &'static str {
        match self {
            Dimension::Transport => "GDPR Article 32 – Security of Processing",
            Dimension::Cookies => "GDPR Articles 6 & 7 – Lawful Basis and Consent",
            Dimension::Transparency => "GDPR Article 13 – Right to Information",
            Dimension::Trackers => {
                "GDPR Articles 6, 7 & 25 – Consent and Data Protection by Design"
            }
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk for one dimension, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Risk(f64);

impl Risk {
    pub const NONE: Risk = Risk(0.0);
    pub const MAX: Risk = Risk(1.0);

    /// Clamp into range; NaN counts as maximum risk.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Risk::MAX;
        }
        Risk(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0.0
    }

    pub fn is_max(&self) -> bool {
        self.0 >= 1.0
    }
}

impl Default for Risk {
    fn default() -> Self {
        Risk::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    Pass,
    Warning,
    Fail,
}

impl FindingStatus {
    pub fn for_risk(risk: Risk) -> Self {
        if risk.is_none() {
            FindingStatus::Pass
        } else if risk.is_max() {
            FindingStatus::Fail
        } else {
            FindingStatus::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Pass => "pass",
            FindingStatus::Warning => "warning",
            FindingStatus::Fail => "fail",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pass" => Some(FindingStatus::Pass),
            "warning" => Some(FindingStatus::Warning),
            "fail" => Some(FindingStatus::Fail),
            _ => None,
        }
    }
}

/// What one evaluator concluded about its dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub dimension: Dimension,
    pub risk: Risk,
    pub finding: String,
    /// Diagnostic text only; never affects the score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Evaluation {
    pub fn new(dimension: Dimension, risk: Risk, finding: impl Into<String>) -> Self {
        Self {
            dimension,
            risk,
            finding: finding.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
