//! CLI entry point for `chatline`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use chatline::config::{self, Config};
use chatline::error::ChatlineError;
use chatline::model::record::MessageRecord;
use chatline::parser::container;
use chatline::report::xlsx;
use chatline::timeline;
use chatline::walker;

#[derive(Parser)]
#[command(
    name = "chatline",
    version,
    about = "Flatten a Google Chat data-return export tree into one XLSX timeline"
)]
struct Cli {
    /// Parent directory of the extracted export (e.g. .../Google Chat/Groups/)
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Report file name, written inside ROOT (overrides the config default)
    #[arg(short, long, value_name = "NAME")]
    output: Option<String>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let report_name = cli
        .output
        .unwrap_or_else(|| config.report.file_name.clone());

    run(&cli.root, &report_name, &config)
}

/// Execute the whole pipeline: walk, parse, assemble, write, summarize.
fn run(root: &Path, report_name: &str, config: &Config) -> anyhow::Result<()> {
    let start = Instant::now();

    let root = root
        .canonicalize()
        .map_err(|_| ChatlineError::RootNotFound(root.to_path_buf()))?;

    let scan = walker::scan(&root, &config.scan.container_name, report_name)?;

    if scan.containers.is_empty() {
        println!(
            "  No '{}' files found under {}",
            config.scan.container_name,
            root.display()
        );
    }

    let pb = ProgressBar::new(scan.containers.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Parsing [{bar:40.cyan/blue}] {pos}/{len} conversations")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let mut records: Vec<MessageRecord> = Vec::new();
    let mut containers_parsed: u64 = 0;
    let mut parse_failures: u64 = 0;
    let mut skipped_malformed: u64 = 0;
    let mut dropped_no_timestamp: u64 = 0;

    for path in &scan.containers {
        pb.inc(1);
        match container::parse_container(path, records.len() as u64) {
            Ok(parsed) => {
                containers_parsed += 1;
                skipped_malformed += parsed.skipped_malformed;
                dropped_no_timestamp += parsed.dropped_no_timestamp;
                records.extend(parsed.records);
            }
            Err(e) => {
                warn!(error = %e, "Skipping container");
                parse_failures += 1;
            }
        }
    }
    pb.finish_and_clear();

    if records.is_empty() && !scan.containers.is_empty() {
        return Err(ChatlineError::NoRecords {
            containers: scan.containers.len() as u64,
        }
        .into());
    }

    let (ordered, assemble_stats) = timeline::assemble(records, &scan.attachments);

    let report_path = root.join(report_name);
    if report_path.exists() {
        println!("  Overwriting existing report: {}", report_path.display());
    }
    let report_stats = xlsx::write_report(&ordered, &report_path, &config.report)?;

    print_summary(
        &report_path,
        &scan,
        containers_parsed,
        parse_failures,
        skipped_malformed,
        dropped_no_timestamp,
        &assemble_stats,
        &report_stats,
        start.elapsed(),
    );

    Ok(())
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "chatline.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Print the end-of-run summary table.
#[allow(clippy::too_many_arguments)]
fn print_summary(
    report_path: &Path,
    scan: &walker::ScanOutcome,
    containers_parsed: u64,
    parse_failures: u64,
    skipped_malformed: u64,
    dropped_no_timestamp: u64,
    assemble: &timeline::AssembleStats,
    report: &xlsx::ReportStats,
    elapsed: std::time::Duration,
) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<28} {}", "Files scanned", scan.stats.files_seen);
    println!(
        "  {:<28} {} ({} parsed, {} unreadable)",
        "Containers found",
        scan.containers.len(),
        containers_parsed,
        parse_failures
    );
    println!("  {:<28} {}", "Records emitted", report.rows);
    println!(
        "  {:<28} {} malformed, {} without timestamp",
        "Records skipped", skipped_malformed, dropped_no_timestamp
    );
    println!(
        "  {:<28} {}",
        "Duplicates removed", assemble.duplicates_removed
    );
    println!(
        "  {:<28} {} resolved, {} unresolved",
        "Attachments", assemble.attachments_resolved, assemble.attachments_unresolved
    );
    if scan.attachments.collisions() > 0 {
        println!(
            "  {:<28} {}",
            "Ambiguous filenames",
            scan.attachments.collisions()
        );
    }
    if scan.stats.entries_skipped > 0 {
        println!(
            "  {:<28} {}",
            "Unreadable entries", scan.stats.entries_skipped
        );
    }
    println!(
        "  {:<28} {} ({})",
        "Report",
        report_path.display(),
        format_size(report.bytes, BINARY)
    );
    println!("  {:<28} {:.2?}", "Elapsed", elapsed);
    println!();
}
