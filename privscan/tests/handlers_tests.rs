use privscan::handlers::*;
use privscan_core::aggregate::Aggregator;
use privscan_core::data::Database;
use privscan_core::report::AuditRecord;
use privscan_core::signatures::SignatureSet;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// ============================================================================
// Target Validation Tests
// ============================================================================

#[test]
fn test_normalize_target_bare_domain_defaults_to_https() {
    assert_eq!(
        normalize_target("example.com"),
        Ok("https://example.com".to_string())
    );
}

#[test]
fn test_normalize_target_keeps_www_and_path() {
    assert_eq!(
        normalize_target("www.example.com/page"),
        Ok("https://www.example.com/page".to_string())
    );
}

#[test]
fn test_normalize_target_keeps_explicit_scheme() {
    assert_eq!(
        normalize_target("http://example.com"),
        Ok("http://example.com".to_string())
    );
    assert_eq!(
        normalize_target("https://example.com/page"),
        Ok("https://example.com/page".to_string())
    );
}

#[test]
fn test_normalize_target_trims_surrounding_whitespace() {
    assert_eq!(
        normalize_target("  example.com\n"),
        Ok("https://example.com".to_string())
    );
}

#[test]
fn test_normalize_target_rejects_markup() {
    assert!(normalize_target("<script>alert(1)</script>").is_err());
    assert!(normalize_target("example.com/<b>").is_err());
}

#[test]
fn test_normalize_target_rejects_inner_whitespace() {
    assert!(normalize_target("example .com").is_err());
}

#[test]
fn test_normalize_target_requires_dotted_host() {
    assert!(normalize_target("localhost").is_err());
    assert!(normalize_target("https://intranet/").is_err());
    assert!(normalize_target("").is_err());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_install_config_creates_assets() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().join("privscan");

    let db_path = install_config(&config_dir, true, false)?;

    assert!(Database::exists(&db_path));
    assert!(config_dir.join(SIGNATURES_DIR).join(TRACKERS_FILE).exists());
    assert!(config_dir.join(SIGNATURES_DIR).join(DISCLOSURE_FILE).exists());
    Ok(())
}

#[test]
fn test_install_config_keeps_existing_audits() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().to_path_buf();
    let db_path = install_config(&config_dir, true, false)?;

    {
        let mut db = Database::new(&db_path)?;
        let record = AuditRecord::new(
            "https://example.com/",
            "example.com",
            Aggregator::default().unavailable("blocked"),
        );
        db.insert_audit(&record)?;
    }

    install_config(&config_dir, false, false)?;
    assert_eq!(Database::new(&db_path)?.count_audits()?, 1);

    install_config(&config_dir, false, true)?;
    assert_eq!(Database::new(&db_path)?.count_audits()?, 0);
    Ok(())
}

#[test]
fn test_resolve_signatures_prefers_explicit_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let explicit = temp_dir.path().join("custom.txt");
    fs::write(&explicit, "tracker.io\n")?;

    let set = resolve_signatures(
        Some(&explicit),
        temp_dir.path(),
        TRACKERS_FILE,
        SignatureSet::default_trackers,
    )?;
    assert_eq!(set.entries(), ["tracker.io"]);
    Ok(())
}

#[test]
fn test_resolve_signatures_uses_config_dir() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let signatures_dir = temp_dir.path().join(SIGNATURES_DIR);
    fs::create_dir_all(&signatures_dir)?;
    fs::write(signatures_dir.join(DISCLOSURE_FILE), "# local\nimpressum\n")?;

    let set = resolve_signatures(
        None,
        temp_dir.path(),
        DISCLOSURE_FILE,
        SignatureSet::default_disclosure_keywords,
    )?;
    assert_eq!(set.entries(), ["impressum"]);
    Ok(())
}

#[test]
fn test_resolve_signatures_falls_back_to_builtin() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let set = resolve_signatures(
        None,
        temp_dir.path(),
        TRACKERS_FILE,
        SignatureSet::default_trackers,
    )?;
    assert_eq!(set, SignatureSet::default_trackers());
    Ok(())
}

#[test]
fn test_resolve_signatures_missing_explicit_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = PathBuf::from("/nonexistent/trackers.txt");
    let result = resolve_signatures(
        Some(&missing),
        temp_dir.path(),
        TRACKERS_FILE,
        SignatureSet::default_trackers,
    );
    assert!(result.is_err());
}

#[test]
fn test_resolve_db_path() {
    let config_dir = PathBuf::from("/tmp/privscan");
    assert_eq!(
        resolve_db_path(None, &config_dir),
        PathBuf::from("/tmp/privscan/privscan.db")
    );
    let explicit = PathBuf::from("/var/lib/audits.db");
    assert_eq!(resolve_db_path(Some(&explicit), &config_dir), explicit);
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/.config/privscan/");
    assert!(!expanded.to_string_lossy().starts_with('~'));
}

// ============================================================================
// Audit Log Output Tests
// ============================================================================

#[test]
fn test_append_csv_log_writes_header_once() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("audit_log.csv");
    let record = AuditRecord::new(
        "https://example.com/",
        "example.com",
        Aggregator::default().unavailable("blocked"),
    );

    append_csv_log(&path, &record)?;
    append_csv_log(&path, &record)?;

    let content = fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "timestamp,url,score");
    assert!(lines[1].ends_with(",https://example.com/,unavailable"));
    Ok(())
}

#[test]
fn test_format_history_empty() {
    assert_eq!(format_history(&[]), "No audits logged yet.\n");
}

#[test]
fn test_format_history_lists_records() {
    let record = AuditRecord::new(
        "https://example.com/",
        "example.com",
        Aggregator::default().unavailable("blocked"),
    );
    let out = format_history(std::slice::from_ref(&record));
    let mut lines = out.lines();
    assert!(lines.next().unwrap().starts_with("ID"));
    let row = lines.next().unwrap();
    assert!(row.starts_with(&record.id));
    assert!(row.contains("unavailable"));
    assert!(row.ends_with("https://example.com/"));
}
