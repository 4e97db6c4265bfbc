//! jobdigest CLI
//!
//! Collects fresher job postings, ranks them, and delivers the daily digest.
//! Meant to be invoked once a day by cron or a CI schedule.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobdigest::{
    error::Result,
    models::{Config, Posting},
    pipeline,
    services::{Notifier, OutboxNotifier, Recipient, SmtpNotifier},
};

/// jobdigest - Daily Fresher Job Digest
#[derive(Parser, Debug)]
#[command(
    name = "jobdigest",
    version,
    about = "Aggregates fresher job postings into a ranked daily digest"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect, render and deliver the digest
    Run {
        /// Print the digest HTML instead of delivering it
        #[arg(long)]
        dry_run: bool,

        /// Write the message to the outbox directory instead of sending it
        #[arg(long, conflicts_with = "dry_run")]
        outbox: bool,
    },

    /// Collect and rank postings, writing them as JSON
    Collect {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a digest from a JSON posting list
    Render {
        /// JSON file produced by `collect`
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Write to a file, or stdout when no path is given.
fn emit(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Credentials may live in a local .env file
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Run { dry_run, outbox } => {
            config.validate()?;

            if dry_run {
                let postings = pipeline::run_collect(&config).await?;
                let digest = pipeline::render_digest(&config, &postings);
                log::info!("Dry run: {}", digest.subject);
                emit(None, &digest.html)?;
            } else {
                // Fail before any fetching if delivery cannot happen
                let recipient = Recipient::from_env(&config.notifier)?;
                let notifier: Box<dyn Notifier> = if outbox {
                    Box::new(OutboxNotifier::new(&config.notifier.outbox_dir))
                } else {
                    Box::new(SmtpNotifier::from_env(&config.notifier, &recipient.sender)?)
                };
                pipeline::run_pipeline(&config, notifier.as_ref(), &recipient).await?;
            }
        }

        Command::Collect { output } => {
            config.validate()?;
            let postings = pipeline::run_collect(&config).await?;
            let json = serde_json::to_string_pretty(&postings)?;
            emit(output.as_ref(), &json)?;
        }

        Command::Render { input, output } => {
            let content = fs::read_to_string(&input)?;
            let postings: Vec<Posting> = serde_json::from_str(&content)?;
            let postings: Vec<Posting> = postings.into_iter().map(Posting::normalized).collect();
            log::info!("Loaded {} postings from {}", postings.len(), input.display());

            let digest = pipeline::render_digest(&config, &postings);
            emit(output.as_ref(), &digest.html)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!("✓ Config OK");
            log::info!("    Timeout: {}s", config.fetch.timeout_secs);
            log::info!(
                "    Sources: {} ({} enabled)",
                config.sources.len(),
                config.enabled_sources().count()
            );
            log::info!("    Required skills: {}", config.profile.required_skills.join(", "));
            log::info!("    Any-of skills: {}", config.profile.any_skills.join(", "));
            log::info!("    Digest cap: {}", config.ranking.max_results);
        }
    }

    Ok(())
}
