//! Progress bar rendering for transfers
//!
//! One indicatif bar per entry under a shared `MultiProgress`. The transfer
//! engine reports from concurrently running entry pipelines, so all per-entry
//! state sits behind a mutex.

use std::collections::HashMap;
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use rstore_core::{EntryStats, TransferProgress, format_size};

pub struct ProgressRenderer {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:32} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .expect("Valid template")
            .progress_chars("#>-")
    }
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferProgress for ProgressRenderer {
    fn entry_started(&self, entry: &str, total_bytes: u64) {
        let bar = self.multi.add(ProgressBar::new(total_bytes));
        bar.set_style(Self::bar_style());
        bar.set_message(format!("Entry '{entry}'"));

        let Ok(mut bars) = self.bars.lock() else {
            return;
        };
        bars.insert(entry.to_string(), bar);
    }

    fn record_copied(&self, entry: &str, bytes: u64) {
        let Ok(bars) = self.bars.lock() else {
            return;
        };
        if let Some(bar) = bars.get(entry) {
            bar.inc(bytes);
        }
    }

    fn entry_finished(&self, entry: &str, stats: &EntryStats) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };
        if let Some(bar) = bars.remove(entry) {
            bar.finish_with_message(format!(
                "Entry '{entry}' (copied {} records ({}))",
                stats.records_copied,
                format_size(stats.bytes_copied)
            ));
        }
    }

    fn entry_failed(&self, entry: &str) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };
        if let Some(bar) = bars.remove(entry) {
            bar.abandon_with_message(format!("Entry '{entry}' failed"));
        }
    }
}
