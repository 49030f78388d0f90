//! Pulse CLI - Main entry point

mod metric;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pulse_foundation::PulseConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// pulsectl - Pulse metric catalog control
#[derive(Parser, Debug)]
#[command(name = "pulsectl")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (default: global + project pulse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Plugin manifest to load into the catalog
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Metric catalog commands
    Metric {
        #[command(subcommand)]
        command: MetricCommand,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MetricCommand {
    /// List metrics (all versions unless a version is given)
    List {
        /// Namespace query, e.g. /intel/mock or /intel/*/foo
        #[arg(short = 'm', long)]
        metric_namespace: Option<String>,

        /// Metric version (0 = all)
        #[arg(short = 'v', long, default_value_t = 0)]
        metric_version: i32,
    },
    /// Show details of one metric
    Get {
        /// Exact metric namespace, e.g. /intel/mock/foo
        #[arg(short = 'm', long)]
        metric_namespace: String,

        /// Metric version (0 = latest)
        #[arg(short = 'v', long, default_value_t = 0)]
        metric_version: i32,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => PulseConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PulseConfig::load()?,
    };

    // Initialize logging
    let log_level = if args.debug { "debug" } else { config.log.level.as_str() };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match args.command {
        Command::Metric { command } => {
            let manifest = args
                .manifest
                .as_deref()
                .context("--manifest is required for metric commands")?;
            let catalog = metric::load_catalog(manifest, &config.catalog)?;

            let output = match command {
                MetricCommand::List {
                    metric_namespace,
                    metric_version,
                } => metric::list(&catalog, metric_namespace.as_deref(), metric_version)?,
                MetricCommand::Get {
                    metric_namespace,
                    metric_version,
                } => metric::get(&catalog, &metric_namespace, metric_version)?,
            };
            print!("{}", output);
        }
        Command::Config {
            command: ConfigCommand::Show,
        } => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
