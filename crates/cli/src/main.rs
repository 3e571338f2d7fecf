//! rstore - CLI client for time-series record storage services

mod commands;
mod exit_code;
mod output;
mod progress;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{CliContext, alias, bucket, export, mirror};
use output::OutputConfig;

#[derive(Parser, Debug)]
#[command(
    name = "rstore",
    version,
    about = "CLI client for time-series record storage services"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Suppress informational output and progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,

    /// Directory holding config.toml (default: the platform config dir)
    #[arg(long, global = true, env = "RSTORE_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage aliases for storage endpoints
    Alias {
        #[command(subcommand)]
        command: alias::AliasCommands,
    },

    /// Administer buckets
    Bucket {
        #[command(subcommand)]
        command: bucket::BucketCommands,
    },

    /// Export bucket records out of a storage endpoint
    Export {
        #[command(subcommand)]
        command: export::ExportCommands,
    },

    /// Copy bucket records between endpoints
    Mirror(mirror::MirrorArgs),
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(command = ?cli.command, "Parsed command line");

    let ctx = CliContext {
        output: OutputConfig {
            json: cli.json,
            quiet: cli.quiet,
            no_color: cli.no_color,
        },
        timeout: Duration::from_secs(cli.timeout),
        config_dir: cli.config_dir,
    };

    let code = match cli.command {
        Commands::Alias { command } => alias::execute(command, &ctx).await,
        Commands::Bucket { command } => bucket::execute(command, &ctx).await,
        Commands::Export { command } => export::execute(command, &ctx).await,
        Commands::Mirror(args) => mirror::execute(args, &ctx).await,
    };

    std::process::exit(code.code());
}
