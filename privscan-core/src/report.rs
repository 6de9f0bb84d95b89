// Compliance report model and its renderings

use crate::model::{Dimension, FindingStatus, Risk};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

/// Final compliance score, or the sentinel for a scan that did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Value(u8),
    Unavailable,
}

impl Score {
    pub fn value(&self) -> Option<u8> {
        match self {
            Score::Value(v) => Some(*v),
            Score::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Score::Value(_))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Value(v) => write!(f, "{}", v),
            Score::Unavailable => f.write_str("unavailable"),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Value(v) => serializer.serialize_u8(*v),
            Score::Unavailable => serializer.serialize_str("unavailable"),
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) if v <= 100 => Ok(Score::Value(v)),
            Raw::Number(v) => Err(de::Error::custom(format!("score {} out of range", v))),
            Raw::Text(s) if s == "unavailable" => Ok(Score::Unavailable),
            Raw::Text(s) => Err(de::Error::custom(format!("unknown score '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    pub transport: Risk,
    pub cookies: Risk,
    pub transparency: Risk,
    pub trackers: Risk,
}

impl RiskComponents {
    pub fn get(&self, dimension: Dimension) -> Risk {
        match dimension {
            Dimension::Transport => self.transport,
            Dimension::Cookies => self.cookies,
            Dimension::Transparency => self.transparency,
            Dimension::Trackers => self.trackers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// `None` for the scan failure finding
    pub dimension: Option<Dimension>,
    pub status: FindingStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.citation {
            Some(ref citation) => write!(f, "{} ({})", self.message, citation),
            None => f.write_str(&self.message),
        }
    }
}

/// Terminal artifact of one audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub score: Score,
    pub findings: Vec<Finding>,
    pub legal_summary: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<RiskComponents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_risk: Option<f64>,
}

/// A report together with what was audited and when; the unit of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub audited_at: DateTime<Utc>,
    pub url: String,
    pub hostname: String,
    pub report: ComplianceReport,
}

impl AuditRecord {
    pub fn new(url: impl Into<String>, hostname: impl Into<String>, report: ComplianceReport) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            audited_at: Utc::now(),
            url: url.into(),
            hostname: hostname.into(),
            report,
        }
    }
}

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

fn status_tag(status: FindingStatus) -> colored::ColoredString {
    match status {
        FindingStatus::Pass => "[PASS]".green().bold(),
        FindingStatus::Warning => "[WARN]".yellow().bold(),
        FindingStatus::Fail => "[FAIL]".red().bold(),
    }
}

fn section(report: &mut String, title: &str) {
    report.push_str(RULE);
    report.push('\n');
    report.push_str(&format!("{}\n", title.bold()));
    report.push_str(RULE);
    report.push_str("\n\n");
}

pub fn generate_text_report(record: &AuditRecord) -> String {
    let mut report = String::new();
    let data = &record.report;

    report.push_str(RULE);
    report.push('\n');
    report.push_str("                        PRIVSCAN COMPLIANCE REPORT\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Audit ID:     {}\n", record.id));
    report.push_str(&format!("Target:       {}\n", record.url));
    report.push_str(&format!(
        "Audit Date:   {}\n",
        record.audited_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let score = match data.score {
        Score::Value(v) if v >= 80 => format!("{}/100", v).green().bold(),
        Score::Value(v) if v >= 50 => format!("{}/100", v).yellow().bold(),
        Score::Value(v) => format!("{}/100", v).red().bold(),
        Score::Unavailable => "UNAVAILABLE".red().bold(),
    };
    report.push_str(&format!("Score:        {}\n\n", score));

    if !data.score.is_available() {
        report.push_str(&format!(
            "{}\n\n",
            "AUDIT FAILED – No compliance score generated.".red().bold()
        ));
    }

    if let Some(ref components) = data.components {
        section(&mut report, "RISK BREAKDOWN");
        for dimension in Dimension::ALL {
            report.push_str(&format!(
                "  {:<22} {:.2}\n",
                dimension.title(),
                components.get(dimension).value()
            ));
        }
        if let Some(total) = data.total_risk {
            report.push_str(&format!("  {:<22} {:.2}\n", "Weighted total", total));
        }
        report.push('\n');
    }

    section(&mut report, "FINDINGS");
    for finding in &data.findings {
        report.push_str(&format!("  {} {}\n", status_tag(finding.status), finding));
        if let Some(ref detail) = finding.detail {
            report.push_str(&format!("         {}\n", detail.dimmed()));
        }
    }
    report.push('\n');

    if !data.legal_summary.is_empty() {
        section(&mut report, "GDPR ARTICLES REFERENCED");
        for article in &data.legal_summary {
            report.push_str(&format!("  - {}\n", article));
        }
        report.push('\n');
    }

    report.push_str(RULE);
    report.push('\n');
    report.push_str("\nGenerated by privscan - an estimate, not a legal GDPR determination.\n\n");

    report
}

pub fn generate_json_report(record: &AuditRecord) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "privscan",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": Utc::now().to_rfc3339(),
                "format": "json",
                "disclaimer": "Compliance estimate only, not a legal determination"
            },
            "audit": {
                "id": record.id,
                "url": record.url,
                "hostname": record.hostname,
                "audited_at": record.audited_at.to_rfc3339(),
            },
            "score": record.report.score,
            "total_risk": record.report.total_risk,
            "components": record.report.components,
            "findings": record.report.findings,
            "legal_summary": record.report.legal_summary,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(record: &AuditRecord) -> String {
    let data = &record.report;
    let mut md = String::new();

    md.push_str(&format!("# Compliance report for {}\n\n", record.url));
    md.push_str(&format!("- **Audit ID:** `{}`\n", record.id));
    md.push_str(&format!(
        "- **Audit date:** {}\n",
        record.audited_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    match data.score {
        Score::Value(v) => md.push_str(&format!("- **Score:** {}/100\n\n", v)),
        Score::Unavailable => {
            md.push_str("- **Score:** unavailable\n\n");
            md.push_str("> **Audit failed** – no compliance score generated.\n\n");
        }
    }

    if let Some(ref components) = data.components {
        md.push_str("## Risk breakdown\n\n");
        md.push_str("| Dimension | Risk |\n|---|---|\n");
        for dimension in Dimension::ALL {
            md.push_str(&format!(
                "| {} | {:.2} |\n",
                dimension.title(),
                components.get(dimension).value()
            ));
        }
        md.push('\n');
    }

    md.push_str("## Findings\n\n");
    for finding in &data.findings {
        md.push_str(&format!(
            "- **{}** {}\n",
            finding.status.as_str().to_uppercase(),
            finding
        ));
        if let Some(ref detail) = finding.detail {
            md.push_str(&format!("  - {}\n", detail));
        }
    }

    if !data.legal_summary.is_empty() {
        md.push_str("\n## GDPR articles referenced\n\n");
        for article in &data.legal_summary {
            md.push_str(&format!("- {}\n", article));
        }
    }

    md
}

pub const CSV_HEADER: &str = "timestamp,url,score";

/// One audit-log line: `timestamp,url,score`.
pub fn generate_csv_line(record: &AuditRecord) -> String {
    format!(
        "{},{},{}",
        record.audited_at.format("%Y-%m-%d %H:%M"),
        csv_field(&record.url),
        record.report.score
    )
}

pub fn generate_csv_report(records: &[AuditRecord]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for record in records {
        csv.push_str(&generate_csv_line(record));
        csv.push('\n');
    }
    csv
}

pub fn render(record: &AuditRecord, format: ReportFormat) -> Result<String, serde_json::Error> {
    Ok(match format {
        ReportFormat::Text => generate_text_report(record),
        ReportFormat::Json => generate_json_report(record)?,
        ReportFormat::Markdown => generate_markdown_report(record),
        ReportFormat::Csv => generate_csv_report(std::slice::from_ref(record)),
    })
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
