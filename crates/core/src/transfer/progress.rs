//! Progress reporting seam for the transfer engine
//!
//! The engine reports through this trait; the CLI renders progress bars,
//! tests and library callers can plug in `NoProgress`. Implementations must
//! tolerate interleaved calls from concurrently running entry pipelines.

use crate::types::EntryStats;

pub trait TransferProgress: Send + Sync {
    /// An entry pipeline was launched. `total_bytes` is the entry's size
    /// snapshot, an upper bound when an interval restricts the transfer.
    fn entry_started(&self, entry: &str, total_bytes: u64);

    /// One record was copied to the sink.
    fn record_copied(&self, entry: &str, bytes: u64);

    /// An entry pipeline finished successfully.
    fn entry_finished(&self, entry: &str, stats: &EntryStats);

    /// An entry pipeline aborted. Renderers must release whatever state
    /// `entry_started` allocated for the entry.
    fn entry_failed(&self, entry: &str);
}

/// No-op implementation for callers that do not care about progress.
pub struct NoProgress;

impl TransferProgress for NoProgress {
    fn entry_started(&self, _entry: &str, _total_bytes: u64) {}
    fn record_copied(&self, _entry: &str, _bytes: u64) {}
    fn entry_finished(&self, _entry: &str, _stats: &EntryStats) {}
    fn entry_failed(&self, _entry: &str) {}
}
