//! Bucket administration commands
//!
//! Listing, inspection, creation and removal of buckets on a configured
//! endpoint. All size flags are parsed locally before any network call.

use clap::Subcommand;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

use crate::commands::CliContext;
use crate::exit_code::ExitCode;
use crate::output::Formatter;
use rstore_core::{
    BucketInfo, BucketSettings, EntryInfo, Error, QuotaType, RecordStore as _, Result,
    format_size, format_timestamp, parse_bucket_path, parse_size,
};

const MICROS_PER_HOUR: i64 = 3_600_000_000;

/// Bucket subcommands
#[derive(Subcommand, Debug)]
pub enum BucketCommands {
    /// List buckets on an endpoint
    Ls(LsArgs),

    /// Show bucket details
    Show(ShowArgs),

    /// Create a bucket
    Create(CreateArgs),

    /// Remove a bucket and all its records
    Rm(PathArg),
}

/// Arguments for the `bucket ls` command
#[derive(clap::Args, Debug)]
pub struct LsArgs {
    /// Alias of the endpoint
    pub alias: String,

    /// Show a table with details instead of names only
    #[arg(long)]
    pub full: bool,
}

/// Arguments for the `bucket show` command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Bucket path (alias/bucket)
    pub path: String,

    /// Also show settings and the entry table
    #[arg(long)]
    pub full: bool,
}

/// Arguments for the `bucket create` command
#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Bucket path (alias/bucket)
    pub path: String,

    /// Retention policy: NONE or FIFO
    #[arg(long)]
    pub quota_type: Option<String>,

    /// Quota size (bytes or units like 100Gb, 500Mb)
    #[arg(long)]
    pub quota_size: Option<String>,

    /// Maximum block size (bytes or units like 19Mb)
    #[arg(long)]
    pub block_size: Option<String>,

    /// Maximum number of records per block
    #[arg(long)]
    pub block_records: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct PathArg {
    /// Bucket path (alias/bucket)
    pub path: String,
}

impl CreateArgs {
    /// Resolve the flag values into settings. Runs before any network call,
    /// so a malformed size never reaches the service.
    fn settings(&self) -> Result<BucketSettings> {
        let quota_type = match &self.quota_type {
            Some(value) => Some(
                value
                    .parse::<QuotaType>()
                    .map_err(|_| Error::Parse(value.clone()))?,
            ),
            None => None,
        };

        Ok(BucketSettings {
            quota_type,
            quota_size: self.quota_size.as_deref().map(parse_size).transpose()?,
            max_block_size: self.block_size.as_deref().map(parse_size).transpose()?,
            max_block_records: self.block_records,
        })
    }
}

/// Execute a bucket subcommand
pub async fn execute(cmd: BucketCommands, ctx: &CliContext) -> ExitCode {
    let formatter = Formatter::new(ctx.output);

    let result = match cmd {
        BucketCommands::Ls(args) => execute_ls(args, ctx, &formatter).await,
        BucketCommands::Show(args) => execute_show(args, ctx, &formatter).await,
        BucketCommands::Create(args) => execute_create(args, ctx, &formatter).await,
        BucketCommands::Rm(args) => execute_rm(args, ctx, &formatter).await,
    };

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.abort(&e);
            ExitCode::Failure
        }
    }
}

async fn execute_ls(args: LsArgs, ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    let client = ctx.client(&args.alias)?;
    let buckets = client.list_buckets().await?;

    if formatter.is_json() {
        formatter.json(&serde_json::json!({ "buckets": buckets }));
    } else if args.full {
        formatter.println(&bucket_table(&buckets).to_string());
    } else {
        for bucket in &buckets {
            formatter.println(&bucket.name);
        }
    }
    Ok(())
}

async fn execute_show(args: ShowArgs, ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    let path = parse_bucket_path(&args.path)?;
    let client = ctx.client(&path.alias)?;
    let info = client.get_bucket(&path.bucket).await?;

    if args.full {
        let settings = client.get_settings(&path.bucket).await?;
        let entries = client.get_entry_list(&path.bucket).await?;

        if formatter.is_json() {
            formatter.json(&serde_json::json!({
                "info": info,
                "settings": settings,
                "entries": entries,
            }));
            return Ok(());
        }

        print_info(formatter, &info);
        formatter.println("");
        print_settings(formatter, &settings);
        formatter.println("");
        formatter.println(&entry_table(&entries).to_string());
        return Ok(());
    }

    if formatter.is_json() {
        formatter.json(&serde_json::json!({ "info": info }));
    } else {
        print_info(formatter, &info);
    }
    Ok(())
}

async fn execute_create(args: CreateArgs, ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    let settings = args.settings()?;
    let path = parse_bucket_path(&args.path)?;

    let client = ctx.client(&path.alias)?;
    client.create_bucket(&path.bucket, &settings, false).await?;

    let styled_name = formatter.style_name(&path.bucket);
    formatter.success(&format!("Bucket '{styled_name}' created"));
    Ok(())
}

async fn execute_rm(args: PathArg, ctx: &CliContext, formatter: &Formatter) -> Result<()> {
    let path = parse_bucket_path(&args.path)?;
    let client = ctx.client(&path.alias)?;
    client.remove_bucket(&path.bucket).await?;

    let styled_name = formatter.style_name(&path.bucket);
    formatter.success(&format!("Bucket '{styled_name}' removed"));
    Ok(())
}

fn print_info(formatter: &Formatter, info: &BucketInfo) {
    let history_hours = (info.latest_record - info.oldest_record).max(0) / MICROS_PER_HOUR;

    let rows = [
        ("Name", formatter.style_name(&info.name)),
        ("Entries", info.entry_count.to_string()),
        ("Size", formatter.style_size(&format_size(info.size))),
        (
            "Oldest record (UTC)",
            formatter.style_date(&format_timestamp(info.oldest_record)),
        ),
        (
            "Latest record (UTC)",
            formatter.style_date(&format_timestamp(info.latest_record)),
        ),
        ("History interval", format!("{history_hours} hour(s)")),
    ];

    for (key, value) in rows {
        let styled_key = formatter.style_key(&format!("{key}:"));
        formatter.println(&format!("{styled_key:<32} {value}"));
    }
}

fn print_settings(formatter: &Formatter, settings: &BucketSettings) {
    let rows = [
        (
            "Quota type",
            settings.quota_type.unwrap_or_default().to_string(),
        ),
        ("Quota size", optional_size(settings.quota_size)),
        ("Max block size", optional_size(settings.max_block_size)),
        (
            "Max block records",
            settings
                .max_block_records
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ];

    for (key, value) in rows {
        let styled_key = formatter.style_key(&format!("{key}:"));
        formatter.println(&format!("{styled_key:<32} {value}"));
    }
}

fn optional_size(size: Option<u64>) -> String {
    size.map(format_size).unwrap_or_else(|| "-".to_string())
}

fn bucket_table(buckets: &[BucketInfo]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Name",
            "Entry Count",
            "Size",
            "Oldest Record (UTC)",
            "Latest Record (UTC)",
        ]);

    for bucket in buckets {
        table.add_row(vec![
            bucket.name.clone(),
            bucket.entry_count.to_string(),
            format_size(bucket.size),
            format_timestamp(bucket.oldest_record),
            format_timestamp(bucket.latest_record),
        ]);
    }

    if !buckets.is_empty() {
        let total_size: u64 = buckets.iter().map(|b| b.size).sum();
        let oldest = buckets.iter().map(|b| b.oldest_record).min();
        let latest = buckets.iter().map(|b| b.latest_record).max();
        table.add_row(vec![
            format!("Total for {} buckets", buckets.len()),
            String::new(),
            format_size(total_size),
            oldest.map(format_timestamp).unwrap_or_default(),
            latest.map(format_timestamp).unwrap_or_default(),
        ]);
    }

    table
}

fn entry_table(entries: &[EntryInfo]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Name",
            "Records",
            "Blocks",
            "Size",
            "Oldest Record (UTC)",
            "Latest Record (UTC)",
        ]);

    for entry in entries {
        table.add_row(vec![
            entry.name.clone(),
            entry.record_count.to_string(),
            entry.block_count.to_string(),
            format_size(entry.size),
            format_timestamp(entry.oldest_record),
            format_timestamp(entry.latest_record),
        ]);
    }

    table
}
