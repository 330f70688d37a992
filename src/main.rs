//! MEXC Export - Main Entry Point
//!
//! Exports spot balances or futures wallet assets to CSV, or probes a single
//! spot endpoint and prints the raw response.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mexc_export::commands::{
    export_futures_assets, export_spot_balances, probe, ProbeRequest, DEFAULT_FUTURES_CSV,
    DEFAULT_SPOT_CSV,
};
use mexc_export::config::Config;
use mexc_export::exchange::RequestParams;
use mexc_export::export::{ExportOutcome, ExportTarget};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// MEXC Export CLI
#[derive(Parser)]
#[command(name = "mexc-export")]
#[command(version, about = "Export MEXC spot and futures account data to CSV")]
struct Cli {
    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export spot account balances
    Spot {
        /// Output CSV file
        #[arg(short, long, default_value = DEFAULT_SPOT_CSV)]
        output: PathBuf,

        /// Write CSV to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Export futures wallet assets
    Futures {
        /// Output CSV file
        #[arg(short, long, default_value = DEFAULT_FUTURES_CSV)]
        output: PathBuf,

        /// Write CSV to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Send one GET to the spot API and print the raw response
    Probe {
        /// Endpoint path
        #[arg(default_value = "/api/v3/account")]
        endpoint: String,

        /// Send without timestamp and signature
        #[arg(long)]
        unsigned: bool,

        /// Extra query parameter, repeatable
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_logging(cli.log_dir.as_deref())?;

    let config = Config::load()?;

    match cli.command {
        Commands::Spot { output, stdout } => {
            let outcome = export_spot_balances(&config, &target(output, stdout)).await?;
            report(outcome);
        }
        Commands::Futures { output, stdout } => {
            let outcome = export_futures_assets(&config, &target(output, stdout)).await?;
            report(outcome);
        }
        Commands::Probe {
            endpoint,
            unsigned,
            params,
        } => {
            let request = ProbeRequest {
                endpoint,
                signed: !unsigned,
                params: params.into_iter().collect::<RequestParams>(),
            };

            match probe(&config, request).await {
                Ok(raw) => {
                    println!("Status: {}", raw.status);
                    println!("{}", raw.body);
                }
                Err(e) if e.is_transport() => warn!("Probe request failed: {}", e),
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn target(output: PathBuf, stdout: bool) -> ExportTarget {
    if stdout {
        ExportTarget::Stdout
    } else {
        ExportTarget::File(output)
    }
}

fn report(outcome: ExportOutcome) {
    match outcome {
        ExportOutcome::Written { rows, target } => {
            info!("Export complete: {} rows to {}", rows, target)
        }
        ExportOutcome::Skipped => info!("Nothing exported"),
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", s))
}

/// Initialize logging to stderr, plus a rolling file when `log_dir` is given.
///
/// Stdout is left for CSV and probe output.
fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mexc_export=info,warn"));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, "mexc-export.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(file_writer))
                .with_target(true)
                .with_ansi(false)
                .init();

            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();

            Ok(None)
        }
    }
}
