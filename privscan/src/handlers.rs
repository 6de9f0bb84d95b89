use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use privscan_core::audit::{AuditOptions, execute_audit};
use privscan_core::data::{DEFAULT_DB_NAME, Database};
use privscan_core::model::AuditTarget;
use privscan_core::policy::RiskPolicy;
use privscan_core::report::{
    self, AuditRecord, CSV_HEADER, ReportFormat, generate_csv_line, generate_csv_report,
};
use privscan_core::signatures::{DEFAULT_DISCLOSURE_KEYWORDS, DEFAULT_TRACKERS, SignatureSet};
use privscan_scanner::HttpCollector;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CONFIG_DIR: &str = "~/.config/privscan/";
pub const SIGNATURES_DIR: &str = "signatures";
pub const TRACKERS_FILE: &str = "trackers.txt";
pub const DISCLOSURE_FILE: &str = "disclosure.txt";

/// Validate user input and turn it into an auditable URL.
///
/// Markup fragments and whitespace are rejected outright, a missing scheme
/// defaults to `https://`, and the host must look like a domain.
pub fn normalize_target(input: &str) -> Result<String, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("No website given".to_string());
    }
    if input.contains(['<', '>']) || input.chars().any(char::is_whitespace) {
        return Err("Invalid URL format detected".to_string());
    }

    let candidate = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&candidate)
        .map_err(|_| "Invalid domain format. Please enter a valid website".to_string())?;
    match url.host_str() {
        Some(host) if host.contains('.') => Ok(candidate),
        _ => Err("Invalid domain format. Please enter a valid website".to_string()),
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// `--db` wins, otherwise the database inside the config directory.
pub fn resolve_db_path(db: Option<&PathBuf>, config_dir: &Path) -> PathBuf {
    db.cloned()
        .unwrap_or_else(|| config_dir.join(DEFAULT_DB_NAME))
}

/// Explicit file, then the copy in the config directory, then the built-in list.
pub fn resolve_signatures(
    explicit: Option<&PathBuf>,
    config_dir: &Path,
    file_name: &str,
    builtin: fn() -> SignatureSet,
) -> Result<SignatureSet> {
    if let Some(path) = explicit {
        return SignatureSet::from_file(path)
            .with_context(|| format!("Failed to read signature list {}", path.display()));
    }

    let installed = config_dir.join(SIGNATURES_DIR).join(file_name);
    if installed.exists() {
        debug!("Using signature list {}", installed.display());
        return SignatureSet::from_file(&installed)
            .with_context(|| format!("Failed to read signature list {}", installed.display()));
    }

    Ok(builtin())
}

/// Append one `timestamp,url,score` line, writing the header on first use.
pub fn append_csv_log(path: &Path, record: &AuditRecord) -> io::Result<()> {
    let is_new = !path.exists() || fs::metadata(path)?.len() == 0;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if is_new {
        writeln!(file, "{}", CSV_HEADER)?;
    }
    writeln!(file, "{}", generate_csv_line(record))
}

/// Plain listing used by `privscan history`.
pub fn format_history(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "No audits logged yet.\n".to_string();
    }

    let mut out = format!("{:<36}  {:<16}  {:>11}  {}\n", "ID", "DATE", "SCORE", "URL");
    for record in records {
        out.push_str(&format!(
            "{:<36}  {:<16}  {:>11}  {}\n",
            record.id,
            record.audited_at.format("%Y-%m-%d %H:%M"),
            record.report.score.to_string(),
            record.url
        ));
    }
    out
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> io::Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Database::new(path).with_context(|| format!("Failed to open audit log {}", path.display()))
}

fn parse_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

fn config_dir(args: &ArgMatches) -> PathBuf {
    expand_path(
        args.get_one::<String>("config-dir")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONFIG_DIR),
    )
}

fn emit(content: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            report::save_report(content, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

// ============================================================================
// init
// ============================================================================

/// Write the default signature lists and create the audit database.
/// An existing database is kept unless `recreate_db` is set.
pub fn install_config(config_dir: &Path, write_signatures: bool, recreate_db: bool) -> Result<PathBuf> {
    fs::create_dir_all(config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    if write_signatures {
        let signatures_dir = config_dir.join(SIGNATURES_DIR);
        fs::create_dir_all(&signatures_dir)
            .with_context(|| format!("Failed to create {}", signatures_dir.display()))?;
        for (name, content) in [
            (TRACKERS_FILE, DEFAULT_TRACKERS),
            (DISCLOSURE_FILE, DEFAULT_DISCLOSURE_KEYWORDS),
        ] {
            let path = signatures_dir.join(name);
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    let db_path = config_dir.join(DEFAULT_DB_NAME);
    if recreate_db && Database::exists(&db_path) {
        Database::drop(&db_path)
            .with_context(|| format!("Failed to remove {}", db_path.display()))?;
    }
    Database::new(&db_path)
        .with_context(|| format!("Failed to create database {}", db_path.display()))?;

    Ok(db_path)
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    print_divider();
    println!("{}", "  PRIVSCAN INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let config_dir = expand_path(
        args.get_one::<String>("PATH")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONFIG_DIR),
    );
    let force = args.get_flag("force");
    let db_path = config_dir.join(DEFAULT_DB_NAME);
    let signatures_dir = config_dir.join(SIGNATURES_DIR);

    println!(
        "{} Target: {}",
        "→".blue(),
        config_dir.display().to_string().bright_white()
    );
    println!();

    let db_exists = Database::exists(&db_path);
    let signatures_exist = signatures_dir.exists();

    let mut write_signatures = true;
    let mut recreate_db = force;

    if !force && (db_exists || signatures_exist) {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("An existing installation was found:");
        if db_exists {
            println!(
                "  {} {}",
                "•".yellow(),
                db_path.display().to_string().bright_white()
            );
        }
        if signatures_exist {
            println!(
                "  {} {}",
                "•".yellow(),
                signatures_dir.display().to_string().bright_white()
            );
        }
        println!();

        if signatures_exist {
            let response = print_prompt("Overwrite the signature lists with the defaults? [y/N]:")?;
            write_signatures = response == "y" || response == "yes";
        }
        if db_exists {
            let response =
                print_prompt("Delete the existing audit log and start fresh? [y/N]:")?;
            recreate_db = response == "y" || response == "yes";
        }
        println!();
    }

    let db_path = install_config(&config_dir, write_signatures, recreate_db)?;

    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Database: {}",
        "✓".green().bold(),
        db_path.display().to_string().bright_white()
    );
    if write_signatures {
        println!(
            "{} Signature lists: {} ({} tracker signatures, {} disclosure keywords)",
            "✓".green().bold(),
            signatures_dir.display().to_string().bright_white(),
            SignatureSet::default_trackers().len().to_string().cyan(),
            SignatureSet::default_disclosure_keywords().len().to_string().cyan()
        );
    } else {
        println!("{} Kept existing signature lists", "→".blue());
    }
    println!();
    Ok(())
}

// ============================================================================
// audit
// ============================================================================

pub async fn handle_audit(args: &ArgMatches, quiet: bool) -> Result<()> {
    let input = args
        .get_one::<String>("TARGET")
        .ok_or_else(|| anyhow!("No website given"))?;
    let url = normalize_target(input).map_err(|e| anyhow!("{}: '{}'", e, input))?;
    let target = AuditTarget::parse(&url)?;

    let config_dir = config_dir(args);
    let format = parse_format(args);
    let output = args.get_one::<PathBuf>("output");
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&45);
    let tls_timeout = *args.get_one::<u64>("tls-timeout").unwrap_or(&10);
    let deadline = *args.get_one::<u64>("deadline").unwrap_or(&60);

    let policy = match args.get_one::<PathBuf>("policy") {
        Some(path) => RiskPolicy::from_file(path)
            .with_context(|| format!("Failed to load risk policy {}", path.display()))?,
        None => RiskPolicy::default(),
    };

    let options = AuditOptions {
        collector_timeout: Duration::from_secs(timeout),
        tls_timeout: Duration::from_secs(tls_timeout),
        deadline: Duration::from_secs(deadline),
        tls_port: None,
        policy,
        trackers: resolve_signatures(
            args.get_one::<PathBuf>("trackers-file"),
            &config_dir,
            TRACKERS_FILE,
            SignatureSet::default_trackers,
        )?,
        disclosure_keywords: resolve_signatures(
            args.get_one::<PathBuf>("keywords-file"),
            &config_dir,
            DISCLOSURE_FILE,
            SignatureSet::default_disclosure_keywords,
        )?,
        show_progress: !quiet && format == ReportFormat::Text && output.is_none(),
    };

    let collector = HttpCollector::with_request_timeout(timeout)?
        .with_subresources(!args.get_flag("no-subresources"));

    info!("Auditing {} as {}", input, target.url);
    let report = execute_audit(&target, &collector, &options, None).await?;
    let record = AuditRecord::new(target.url.as_str(), target.hostname.as_str(), report);

    let rendered = report::render(&record, format)?;
    emit(&rendered, output)?;

    if !args.get_flag("no-log") {
        let db_path = resolve_db_path(args.get_one::<PathBuf>("db"), &config_dir);
        let mut db = open_database(&db_path)?;
        db.insert_audit(&record)
            .with_context(|| format!("Failed to log audit to {}", db_path.display()))?;
        if !quiet {
            eprintln!(
                "{} Audit {} logged to {}",
                "✓".green().bold(),
                record.id.bright_white(),
                db_path.display()
            );
        }
    }

    if let Some(csv_path) = args.get_one::<PathBuf>("csv-log") {
        append_csv_log(csv_path, &record)
            .with_context(|| format!("Failed to append to {}", csv_path.display()))?;
    }

    Ok(())
}

// ============================================================================
// history / show
// ============================================================================

pub fn handle_history(args: &ArgMatches) -> Result<()> {
    let config_dir = config_dir(args);
    let db_path = resolve_db_path(args.get_one::<PathBuf>("db"), &config_dir);
    if !Database::exists(&db_path) {
        bail!(
            "No audit log at {}. Run `privscan init` or an audit first.",
            db_path.display()
        );
    }

    let db = open_database(&db_path)?;
    let limit = *args.get_one::<usize>("limit").unwrap_or(&20);
    let records = db.list_audits(limit)?;

    let out = match args.get_one::<String>("format").map(String::as_str) {
        Some("csv") => generate_csv_report(&records),
        Some("json") => serde_json::to_string_pretty(&records)? + "\n",
        _ => format_history(&records),
    };
    print!("{}", out);
    Ok(())
}

pub fn handle_show(args: &ArgMatches) -> Result<()> {
    let id = args
        .get_one::<String>("ID")
        .ok_or_else(|| anyhow!("No audit id given"))?;
    let config_dir = config_dir(args);
    let db_path = resolve_db_path(args.get_one::<PathBuf>("db"), &config_dir);
    if !Database::exists(&db_path) {
        bail!("No audit log at {}", db_path.display());
    }

    let db = open_database(&db_path)?;
    let record = db
        .get_audit(id)?
        .ok_or_else(|| anyhow!("No audit with id '{}'", id))?;

    let rendered = report::render(&record, parse_format(args))?;
    emit(&rendered, args.get_one::<PathBuf>("output"))
}
