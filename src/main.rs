//! Command-line entry point for mailvet.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mailvet_core::core::config::{load_config_file, Config, ConfigBuilder, PolicyChoice};
use mailvet_core::utils::dns::DnsClient;
use mailvet_core::utils::geo::GeoLocator;
use mailvet_core::utils::input::{read_input_dir, read_proxy_file};
use mailvet_core::utils::smtp::SmtpClient;
use mailvet_core::{BatchRunner, Pipeline, ProgressTracker, ProxyRotator, ReportWriter, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Bulk email list validator: DNS, SMTP, geolocation and spam-trap checks.
#[derive(Parser, Debug)]
#[command(name = "mailvet", version, about)]
struct Cli {
    /// Directory of .txt input files (identifier or identifier:secret lines)
    #[arg(short, long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Directory for the generated reports
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path of the resumable progress file
    #[arg(long, value_name = "FILE")]
    progress_file: Option<PathBuf>,

    /// Explicit configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Concurrent workers per batch
    #[arg(short = 'w', long, value_name = "N")]
    workers: Option<usize>,

    /// Records per batch
    #[arg(short = 'b', long, value_name = "N")]
    batch_size: Option<usize>,

    /// SMTP connect/command timeout in seconds
    #[arg(long, value_name = "SECS")]
    smtp_timeout: Option<u64>,

    /// DNS lookup timeout in seconds
    #[arg(long, value_name = "SECS")]
    dns_timeout: Option<u64>,

    /// Proxy URL, repeatable
    #[arg(long = "proxy", value_name = "URL")]
    proxies: Vec<String>,

    /// File with one proxy URL per line
    #[arg(long, value_name = "FILE")]
    proxy_file: Option<PathBuf>,

    /// Uses of a proxy before rotating to the next one
    #[arg(long, value_name = "N")]
    rotation_threshold: Option<u32>,

    /// Allow transmitting supplied secrets to provider SMTP servers
    #[arg(long)]
    enable_auth_checks: bool,

    /// Recipient for the authenticated test-send confirmation
    #[arg(long, value_name = "EMAIL")]
    test_recipient: Option<String>,

    /// Classification policy: strict or weighted
    #[arg(long, value_name = "POLICY")]
    policy: Option<PolicyChoice>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut builder = ConfigBuilder::new();
    if let Some((file, path)) = load_config_file(cli.config.as_deref())? {
        builder = builder.with_config_file(file, Some(path));
    }

    let mut proxies = cli.proxies.clone();
    if let Some(path) = &cli.proxy_file {
        proxies.extend(read_proxy_file(path)?);
    }

    builder
        .with_max_workers(cli.workers)
        .with_batch_size(cli.batch_size)
        .with_smtp_timeout(cli.smtp_timeout)
        .with_dns_timeout(cli.dns_timeout)
        .with_proxies(proxies)
        .with_proxy_rotation_threshold(cli.rotation_threshold)
        .with_enable_auth_checks(cli.enable_auth_checks)
        .with_test_recipient(cli.test_recipient.clone())
        .with_policy(cli.policy)
        .with_input_dir(cli.input_dir.clone())
        .with_output_dir(cli.output_dir.clone())
        .with_progress_file(cli.progress_file.clone())
        .build()
}

async fn run(cli: Cli) -> Result<()> {
    let config = Arc::new(build_config(&cli)?);
    info!(
        "Starting mailvet (workers: {}, batch size: {}, policy: {:?})",
        config.max_workers, config.batch_size, config.classification_policy
    );
    if config.enable_auth_checks {
        warn!("Authentication checks enabled: supplied secrets will be sent to provider SMTP servers");
    }

    let records = read_input_dir(&config.input_dir)?;
    let mut tracker = ProgressTracker::load_or_new(&config.progress_file, records.len())?;

    let proxies = Arc::new(ProxyRotator::new(
        &config.proxies,
        config.proxy_rotation_threshold,
    ));
    let pipeline = Arc::new(Pipeline::new(
        config.clone(),
        Arc::new(DnsClient::new(&config)?),
        Arc::new(SmtpClient::new(config.clone())),
        Arc::new(GeoLocator::new(config.clone())),
        proxies.clone(),
    ));

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing the current batch before exit");
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    let bar = ProgressBar::new(records.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    bar.inc(tracker.processed_count() as u64);

    let runner = BatchRunner::new(config.clone(), pipeline, shutdown).with_progress_bar(bar.clone());
    let summary = runner.run(&records, &mut tracker).await?;
    bar.finish_and_clear();

    ReportWriter::new(&config.output_dir).write_all(tracker.results())?;

    if !config.proxies.is_empty() {
        let stats = proxies.stats();
        info!(
            "Proxy pool: {}/{} working, {} rotation(s)",
            stats.working, stats.total, stats.rotations
        );
    }
    info!(
        "Session {}: {} valid, {} invalid, {} skipped ({} total processed)",
        tracker.session_id(),
        summary.valid,
        summary.invalid,
        summary.skipped,
        tracker.processed_count()
    );
    if summary.interrupted {
        warn!("Run was interrupted; re-run with the same progress file to resume");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}
