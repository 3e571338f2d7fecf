//! export command - Copy bucket records into a local folder
//!
//! Writes one file per record under `<dest>/<bucket>/<entry>/<timestamp>.<ext>`.

use std::path::PathBuf;

use clap::Subcommand;

use crate::commands::{CliContext, parse_interval, report_outcome};
use crate::exit_code::ExitCode;
use crate::output::Formatter;
use crate::progress::ProgressRenderer;
use rstore_core::{
    FolderSink, NoProgress, Result, TransferOptions, TransferOutcome, TransferProgress,
    parse_bucket_path, run_transfer,
};

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export bucket records to a local folder
    Folder(FolderArgs),
}

/// Arguments for the `export folder` command
#[derive(clap::Args, Debug)]
pub struct FolderArgs {
    /// Source bucket path (alias/bucket)
    pub source: String,

    /// Destination directory
    pub dest: PathBuf,

    /// Export records with timestamps at or after this ISO-8601 instant
    #[arg(long)]
    pub start: Option<String>,

    /// Export records with timestamps strictly before this ISO-8601 instant
    #[arg(long)]
    pub stop: Option<String>,

    /// Comma-separated entry names (default: all entries)
    #[arg(long, value_delimiter = ',')]
    pub entries: Vec<String>,

    /// File extension override (e.g., `.txt`); default is derived from each
    /// record's content type, falling back to `bin`
    #[arg(long)]
    pub ext: Option<String>,
}

/// Execute an export subcommand
pub async fn execute(cmd: ExportCommands, ctx: &CliContext) -> ExitCode {
    let formatter = Formatter::new(ctx.output);

    match cmd {
        ExportCommands::Folder(args) => match run_folder(args, ctx, &formatter).await {
            Ok(outcome) => report_outcome(&formatter, &outcome),
            Err(e) => {
                formatter.abort(&e);
                ExitCode::Failure
            }
        },
    }
}

async fn run_folder(
    args: FolderArgs,
    ctx: &CliContext,
    formatter: &Formatter,
) -> Result<TransferOutcome> {
    // Interval bounds are validated before anything touches the network
    let interval = parse_interval(args.start.as_deref(), args.stop.as_deref())?;
    let path = parse_bucket_path(&args.source)?;

    let client = ctx.client(&path.alias)?;
    let sink = FolderSink::new(args.dest.join(&path.bucket), args.ext.as_deref());
    let options = TransferOptions {
        interval,
        entries: args.entries,
    };

    let progress: Box<dyn TransferProgress> = if formatter.is_quiet() || formatter.is_json() {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressRenderer::new())
    };

    run_transfer(&client, &path.bucket, &sink, &options, progress.as_ref()).await
}
