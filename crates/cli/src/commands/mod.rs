//! Command implementations
//!
//! Each command module exposes an `execute` entry point returning an
//! `ExitCode`. The happy path lives in a `Result`-returning helper; any
//! error ends the command through `Formatter::abort`, which prints the
//! uniform `[<ErrorKind>] <message>` / `Aborted!` failure output.

pub mod alias;
pub mod bucket;
pub mod export;
pub mod mirror;

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use rstore_client::HttpClient;
use rstore_core::{
    Alias, AliasManager, Interval, Result, TransferOutcome, format_size, parse_timestamp,
};

/// Everything a command needs besides its own arguments, resolved once from
/// the global flags.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub output: OutputConfig,
    pub timeout: Duration,
    pub config_dir: Option<PathBuf>,
}

impl CliContext {
    pub fn alias_manager(&self) -> Result<AliasManager> {
        match &self.config_dir {
            Some(dir) => Ok(AliasManager::with_config_dir(dir)),
            None => AliasManager::new(),
        }
    }

    pub fn alias(&self, name: &str) -> Result<Alias> {
        self.alias_manager()?.get(name)
    }

    pub fn client(&self, alias_name: &str) -> Result<HttpClient> {
        let alias = self.alias(alias_name)?;
        HttpClient::new(&alias, self.timeout)
    }
}

/// Build an `Interval` from the `--start`/`--stop` flag values.
///
/// Parsing happens before any network call, so a malformed bound never
/// touches either side of a transfer.
pub(crate) fn parse_interval(start: Option<&str>, stop: Option<&str>) -> Result<Interval> {
    Ok(Interval {
        start: start.map(parse_timestamp).transpose()?,
        stop: stop.map(parse_timestamp).transpose()?,
    })
}

#[derive(Serialize)]
struct EntryOutcomeOutput {
    entry: String,
    records: u64,
    bytes: u64,
}

#[derive(Serialize)]
struct FailedEntryOutput {
    entry: String,
    kind: &'static str,
    detail: String,
}

/// JSON output for export/mirror
#[derive(Serialize)]
struct TransferOutput {
    entries: Vec<EntryOutcomeOutput>,
    failed: Vec<FailedEntryOutput>,
    total_records: u64,
    total_bytes: u64,
}

/// Render a settled transfer outcome and decide the exit code.
///
/// Per-entry failures were already collected by the engine after all
/// pipelines finished; any failure turns the whole command into a failure.
pub(crate) fn report_outcome(formatter: &Formatter, outcome: &TransferOutcome) -> ExitCode {
    if formatter.is_json() {
        let output = TransferOutput {
            entries: outcome
                .completed
                .iter()
                .map(|stats| EntryOutcomeOutput {
                    entry: stats.entry.clone(),
                    records: stats.records_copied,
                    bytes: stats.bytes_copied,
                })
                .collect(),
            failed: outcome
                .failed
                .iter()
                .map(|(entry, error)| FailedEntryOutput {
                    entry: entry.clone(),
                    kind: error.kind(),
                    detail: error.to_string(),
                })
                .collect(),
            total_records: outcome.total_records(),
            total_bytes: outcome.total_bytes(),
        };
        formatter.json(&output);
        return if outcome.is_success() {
            ExitCode::Success
        } else {
            ExitCode::Failure
        };
    }

    if !outcome.is_success() {
        for (_, error) in &outcome.failed {
            formatter.failure(error);
        }
        println!("Aborted!");
        return ExitCode::Failure;
    }

    formatter.success(&format!(
        "Copied {} records ({})",
        outcome.total_records(),
        format_size(outcome.total_bytes())
    ));
    ExitCode::Success
}
