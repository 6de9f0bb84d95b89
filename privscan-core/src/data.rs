use crate::model::{Dimension, FindingStatus};
use crate::report::{AuditRecord, ComplianceReport, Finding};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_DB_NAME: &str = "privscan.db";

/// Append-only audit log: one row per audit plus its ordered findings.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS audits (
    id TEXT PRIMARY KEY,
    audited_at INTEGER NOT NULL, -- unix millis
    url TEXT NOT NULL,
    hostname TEXT NOT NULL,
    status TEXT NOT NULL CHECK(status IN ('completed', 'unavailable')),
    score INTEGER CHECK(score BETWEEN 0 AND 100),

    -- Risk components, NULL when the scan did not complete
    transport_risk REAL,
    cookie_risk REAL,
    transparency_risk REAL,
    tracker_risk REAL,
    total_risk REAL,

    report TEXT NOT NULL      -- JSON of the full report
);

CREATE INDEX IF NOT EXISTS idx_audits_time ON audits(audited_at);
CREATE INDEX IF NOT EXISTS idx_audits_hostname ON audits(hostname);

CREATE TABLE IF NOT EXISTS findings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    audit_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    dimension TEXT CHECK(dimension IN ('transport', 'cookies', 'transparency', 'trackers')),
    status TEXT NOT NULL CHECK(status IN ('pass', 'warning', 'fail')),
    message TEXT NOT NULL,
    citation TEXT,
    detail TEXT,

    FOREIGN KEY(audit_id) REFERENCES audits(id) ON DELETE CASCADE,
    UNIQUE(audit_id, position)
);

CREATE INDEX IF NOT EXISTS idx_findings_audit ON findings(audit_id);
            ",
        )?;
        Ok(())
    }

    pub fn insert_audit(&mut self, record: &AuditRecord) -> Result<()> {
        let report = &record.report;
        let report_json = serde_json::to_string(report)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let status = if report.score.is_available() {
            "completed"
        } else {
            "unavailable"
        };
        let risk = |d: Dimension| report.components.map(|c| c.get(d).value());

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO audits (
                id, audited_at, url, hostname, status, score,
                transport_risk, cookie_risk, transparency_risk, tracker_risk, total_risk, report
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                &record.id,
                record.audited_at.timestamp_millis(),
                &record.url,
                &record.hostname,
                status,
                report.score.value(),
                risk(Dimension::Transport),
                risk(Dimension::Cookies),
                risk(Dimension::Transparency),
                risk(Dimension::Trackers),
                report.total_risk,
                report_json,
            ],
        )?;

        for (position, finding) in report.findings.iter().enumerate() {
            tx.execute(
                "INSERT INTO findings (audit_id, position, dimension, status, message, citation, detail)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    &record.id,
                    position as i64,
                    finding.dimension.map(|d| d.as_str()),
                    finding.status.as_str(),
                    &finding.message,
                    &finding.citation,
                    &finding.detail,
                ],
            )?;
        }
        tx.commit()?;

        debug!("Logged audit {} for {} ({})", record.id, record.url, report.score);
        Ok(())
    }

    pub fn get_audit(&self, id: &str) -> Result<Option<AuditRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, audited_at, url, hostname, report FROM audits WHERE id = ?1")?;

        stmt.query_row(params![id], record_from_row).optional()
    }

    /// Newest first.
    pub fn list_audits(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, audited_at, url, hostname, report FROM audits
             ORDER BY audited_at DESC, rowid DESC
             LIMIT ?1",
        )?;

        let audits = stmt
            .query_map(params![limit as i64], record_from_row)?
            .collect::<Result<Vec<_>>>()?;

        Ok(audits)
    }

    pub fn get_findings(&self, audit_id: &str) -> Result<Vec<Finding>> {
        let mut stmt = self.conn.prepare(
            "SELECT dimension, status, message, citation, detail FROM findings
             WHERE audit_id = ?1 ORDER BY position",
        )?;

        let findings = stmt
            .query_map(params![audit_id], |row| {
                let dimension: Option<String> = row.get(0)?;
                let status: String = row.get(1)?;
                Ok(Finding {
                    dimension: dimension.as_deref().and_then(Dimension::from_str),
                    status: FindingStatus::from_str(&status).unwrap_or(FindingStatus::Fail),
                    message: row.get(2)?,
                    citation: row.get(3)?,
                    detail: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(findings)
    }

    pub fn count_audits(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM audits", [], |row| row.get(0))
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

fn record_from_row(row: &Row) -> Result<AuditRecord> {
    let report_json: String = row.get(4)?;
    let report: ComplianceReport = serde_json::from_str(&report_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(AuditRecord {
        id: row.get(0)?,
        audited_at: timestamp_to_datetime(row.get(1)?),
        url: row.get(2)?,
        hostname: row.get(3)?,
        report,
    })
}

fn timestamp_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default()
}
