pub mod aggregate;
pub mod audit;
pub mod cookies;
pub mod data;
pub mod error;
pub mod model;
pub mod policy;
pub mod report;
pub mod signatures;
pub mod trackers;
pub mod transparency;
pub mod transport;

use colored::Colorize;

pub use aggregate::{Aggregator, Evaluations, ScanStatus};
pub use audit::{AuditOptions, AuditProgressCallback, execute_audit};
pub use error::AuditError;
pub use model::{AuditTarget, Dimension, Evaluation, FindingStatus, Risk};
pub use policy::{RiskPolicy, Weights};
pub use report::{AuditRecord, ComplianceReport, Finding, ReportFormat, Score};
pub use signatures::SignatureSet;

pub fn print_banner() {
    let banner = r#"
             _
  _ __  _ __(_)_   _____  ___ __ _ _ __
 | '_ \| '__| \ \ / / __|/ __/ _` | '_ \
 | |_) | |  | |\ V /\__ \ (_| (_| | | | |
 | .__/|_|  |_| \_/ |___/\___\__,_|_| |_|
 |_|
"#;
    eprintln!("{}", banner.bright_cyan());
    eprintln!(
        "  {} {}\n",
        "privacy compliance auditor".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
