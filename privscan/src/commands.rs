use crate::CLAP_STYLING;
use clap::{ArgAction, arg, command};
use privscan::handlers::DEFAULT_CONFIG_DIR;
use std::path::PathBuf;

fn config_dir_arg() -> clap::Arg {
    arg!(-c --"config-dir" <PATH>)
        .required(false)
        .help("privscan configuration directory")
        .default_value(DEFAULT_CONFIG_DIR)
}

fn db_arg() -> clap::Arg {
    arg!(--"db" <PATH>)
        .required(false)
        .help("Audit log database (default: <config-dir>/privscan.db)")
        .value_parser(clap::value_parser!(PathBuf))
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("privscan")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("privscan")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the privscan configuration directory and audit log")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location of the privscan configuration directory")
                        .default_value(DEFAULT_CONFIG_DIR),
                )
                .arg(
                    arg!(-f --"force")
                        .help(
                            "Overwrites any existing database and signature lists at the \
                        specified location without asking.",
                        )
                        .required(false),
                ),
        )
        .subcommand(
            command!("audit")
                .about(
                    "Audits a website for GDPR privacy risk: transport security, cookies, \
                transparency and third-party tracking.",
                )
                .arg(
                    arg!(<TARGET>)
                        .help("Website to audit: example.com, www.example.com or https://example.com/page"),
                )
                .arg(config_dir_arg())
                .arg(db_arg())
                .arg(
                    arg!(--"no-log")
                        .required(false)
                        .help("Do not record this audit in the audit log")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"csv-log" <PATH>)
                        .required(false)
                        .help("Also append a timestamp,url,score line to this CSV file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-t --"timeout" <SECS>)
                        .required(false)
                        .help("Page collection timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("45"),
                )
                .arg(
                    arg!(--"tls-timeout" <SECS>)
                        .required(false)
                        .help("TLS handshake timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"deadline" <SECS>)
                        .required(false)
                        .help("Hard limit for the whole audit in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("60"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown, csv")
                        .value_parser(["text", "json", "markdown", "md", "csv"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"trackers-file" <PATH>)
                        .required(false)
                        .help("Tracker signature list (default: <config-dir>/signatures/trackers.txt)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"keywords-file" <PATH>)
                        .required(false)
                        .help(
                            "Privacy disclosure keyword list (default: \
                        <config-dir>/signatures/disclosure.txt)",
                        )
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"policy" <PATH>)
                        .required(false)
                        .help("JSON risk policy overriding the default weights and increments")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"no-subresources")
                        .required(false)
                        .help("Only load the document itself, skipping scripts, images and frames")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("history")
                .about("Lists logged audits, newest first")
                .arg(config_dir_arg())
                .arg(db_arg())
                .arg(
                    arg!(-n --"limit" <NUM>)
                        .required(false)
                        .help("Maximum number of audits to list")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: text, csv, json")
                        .value_parser(["text", "csv", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("show")
                .about("Re-renders a logged audit report")
                .arg(arg!(<ID>).help("Audit id as printed by `privscan history`"))
                .arg(config_dir_arg())
                .arg(db_arg())
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown, csv")
                        .value_parser(["text", "json", "markdown", "md", "csv"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}
