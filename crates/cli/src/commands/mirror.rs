//! mirror command - Copy bucket records between two endpoints
//!
//! The destination bucket is created with the source bucket's settings when
//! it does not exist yet; an existing destination keeps its own settings.

use std::sync::Arc;

use crate::commands::{CliContext, parse_interval, report_outcome};
use crate::exit_code::ExitCode;
use crate::output::Formatter;
use crate::progress::ProgressRenderer;
use rstore_core::{
    BucketSink, NoProgress, RecordStore, Result, TransferOptions, TransferOutcome,
    TransferProgress, parse_bucket_path, run_transfer,
};

/// Arguments for the `mirror` command
#[derive(clap::Args, Debug)]
pub struct MirrorArgs {
    /// Source bucket path (alias/bucket)
    pub source: String,

    /// Destination bucket path (alias/bucket); the alias may differ
    pub dest: String,

    /// Copy records with timestamps at or after this ISO-8601 instant
    #[arg(long)]
    pub start: Option<String>,

    /// Copy records with timestamps strictly before this ISO-8601 instant
    #[arg(long)]
    pub stop: Option<String>,

    /// Comma-separated entry names (default: all entries)
    #[arg(long, value_delimiter = ',')]
    pub entries: Vec<String>,
}

/// Execute the mirror command
pub async fn execute(args: MirrorArgs, ctx: &CliContext) -> ExitCode {
    let formatter = Formatter::new(ctx.output);

    match run(args, ctx, &formatter).await {
        Ok(outcome) => report_outcome(&formatter, &outcome),
        Err(e) => {
            formatter.abort(&e);
            ExitCode::Failure
        }
    }
}

async fn run(args: MirrorArgs, ctx: &CliContext, formatter: &Formatter) -> Result<TransferOutcome> {
    let interval = parse_interval(args.start.as_deref(), args.stop.as_deref())?;
    let source = parse_bucket_path(&args.source)?;
    let dest = parse_bucket_path(&args.dest)?;

    let source_client = ctx.client(&source.alias)?;
    let dest_client: Arc<dyn RecordStore> = Arc::new(ctx.client(&dest.alias)?);

    // The source settings travel with the records; a failed source lookup
    // aborts here, before the destination is touched
    let settings = source_client.get_settings(&source.bucket).await?;

    let sink = BucketSink::new(dest_client, &dest.bucket, settings);
    let options = TransferOptions {
        interval,
        entries: args.entries,
    };

    let progress: Box<dyn TransferProgress> = if formatter.is_quiet() || formatter.is_json() {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressRenderer::new())
    };

    run_transfer(
        &source_client,
        &source.bucket,
        &sink,
        &options,
        progress.as_ref(),
    )
    .await
}
