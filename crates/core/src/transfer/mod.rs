//! The bucket transfer engine behind `export` and `mirror`
//!
//! One entry pipeline per selected entry, all running concurrently as
//! cooperatively scheduled tasks on the current thread. Pipelines are
//! isolated: a failing entry does not cancel its siblings, and errors are
//! collected and surfaced only after every pipeline has settled.

mod progress;
mod reader;
mod sink;

pub use progress::{NoProgress, TransferProgress};
pub use sink::{BucketSink, FolderSink, RecordSink};

use futures::StreamExt;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::traits::RecordStore;
use crate::types::{EntryInfo, EntryStats, Interval};

/// What to transfer: the time interval and an optional subset of entry
/// names. An empty `entries` list means all entries. Unknown names are
/// silently skipped.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    pub interval: Interval,
    pub entries: Vec<String>,
}

/// Aggregated result of a bucket transfer.
#[derive(Debug, Default)]
pub struct TransferOutcome {
    /// Stats of entries copied to completion, in entry-name order.
    pub completed: Vec<EntryStats>,
    /// Entries whose pipeline aborted, with the error that stopped them.
    pub failed: Vec<(String, Error)>,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_records(&self) -> u64 {
        self.completed.iter().map(|s| s.records_copied).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.completed.iter().map(|s| s.bytes_copied).sum()
    }
}

/// Transfer records of one bucket into a sink.
///
/// Resolves the entry set, ensures the destination exists, then runs one
/// entry pipeline per entry concurrently. Errors raised while resolving the
/// source or preparing the destination are fatal and returned as `Err`;
/// per-entry errors are collected in the outcome instead.
pub async fn run_transfer(
    store: &dyn RecordStore,
    bucket: &str,
    sink: &dyn RecordSink,
    options: &TransferOptions,
    progress: &dyn TransferProgress,
) -> Result<TransferOutcome> {
    let mut entries = store.get_entry_list(bucket).await?;

    if !options.entries.is_empty() {
        entries.retain(|entry| options.entries.iter().any(|name| *name == entry.name));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(bucket, entry_count = entries.len(), "Starting bucket transfer");

    // The destination is only touched once the source has resolved
    sink.prepare().await?;

    let pipelines = entries
        .iter()
        .map(|entry| copy_entry(store, bucket, entry, sink, &options.interval, progress));
    let results = futures::future::join_all(pipelines).await;

    let mut outcome = TransferOutcome::default();
    for (entry, result) in entries.iter().zip(results) {
        match result {
            Ok(stats) => outcome.completed.push(stats),
            Err(e) => {
                warn!(entry = %entry.name, error = %e, "Entry pipeline failed");
                progress.entry_failed(&entry.name);
                outcome.failed.push((entry.name.clone(), e));
            }
        }
    }

    Ok(outcome)
}

/// The pipeline for one entry: pull from the record stream reader, push
/// into the sink, account every record.
async fn copy_entry(
    store: &dyn RecordStore,
    bucket: &str,
    entry: &EntryInfo,
    sink: &dyn RecordSink,
    interval: &Interval,
    progress: &dyn TransferProgress,
) -> Result<EntryStats> {
    progress.entry_started(&entry.name, entry.size);
    sink.begin_entry(&entry.name).await?;

    let mut records = reader::read_records(store, bucket, entry, interval)
        .await
        .map_err(|e| e.for_entry(&entry.name))?;

    let mut stats = EntryStats {
        entry: entry.name.clone(),
        ..Default::default()
    };

    while let Some(record) = records.next().await {
        let record = record.map_err(|e| e.for_entry(&entry.name))?;
        let size = record.size;

        sink.accept(&entry.name, record)
            .await
            .map_err(|e| e.for_entry(&entry.name))?;

        stats.records_copied += 1;
        stats.bytes_copied += size;
        progress.record_copied(&entry.name, size);
    }

    progress.entry_finished(&entry.name, &stats);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockRecordStore, RecordStream};
    use crate::types::{BucketInfo, BucketSettings, QuotaType, Record};

    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn entry_info(name: &str, oldest: i64, latest: i64) -> EntryInfo {
        EntryInfo {
            name: name.to_string(),
            record_count: 2,
            block_count: 1,
            size: 6,
            oldest_record: oldest,
            latest_record: latest,
        }
    }

    fn record(timestamp: i64, data: &'static [u8], content_type: Option<&str>) -> Record {
        Record {
            timestamp,
            size: data.len() as u64,
            content_type: content_type.map(|ct| ct.to_string()),
            data: stream::iter([Ok(Bytes::from_static(data))]).boxed(),
        }
    }

    /// A record fully read back out of a sink or store.
    #[derive(Debug, PartialEq)]
    struct Written {
        entry: String,
        timestamp: i64,
        size: u64,
        body: Vec<u8>,
    }

    /// In-memory store: serves canned entries/records on the source side
    /// and collects writes on the destination side.
    #[derive(Default)]
    struct FakeStore {
        entries: Vec<EntryInfo>,
        records: HashMap<String, Vec<(i64, &'static [u8], Option<&'static str>)>>,
        settings: BucketSettings,
        fail_entry_list: bool,
        failing_entry: Option<String>,
        queried: Mutex<Vec<(String, i64, i64)>>,
        created: Mutex<Vec<(String, BucketSettings, bool)>>,
        written: Mutex<Vec<Written>>,
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
            unimplemented!("not used by the transfer engine")
        }

        async fn get_bucket(&self, _name: &str) -> Result<BucketInfo> {
            unimplemented!("not used by the transfer engine")
        }

        async fn get_settings(&self, _bucket: &str) -> Result<BucketSettings> {
            Ok(self.settings.clone())
        }

        async fn create_bucket(
            &self,
            bucket: &str,
            settings: &BucketSettings,
            exist_ok: bool,
        ) -> Result<()> {
            self.created.lock().unwrap().push((
                bucket.to_string(),
                settings.clone(),
                exist_ok,
            ));
            Ok(())
        }

        async fn remove_bucket(&self, _bucket: &str) -> Result<()> {
            Ok(())
        }

        async fn get_entry_list(&self, _bucket: &str) -> Result<Vec<EntryInfo>> {
            if self.fail_entry_list {
                return Err(Error::Remote("Oops".to_string()));
            }
            Ok(self.entries.clone())
        }

        async fn query(
            &self,
            _bucket: &str,
            entry: &str,
            start: i64,
            stop: i64,
        ) -> Result<RecordStream> {
            self.queried
                .lock()
                .unwrap()
                .push((entry.to_string(), start, stop));

            if self.failing_entry.as_deref() == Some(entry) {
                return Err(Error::Remote("query failed".to_string()));
            }

            // Half-open bounds, as the service applies them
            let records: Vec<Result<Record>> = self
                .records
                .get(entry)
                .into_iter()
                .flatten()
                .filter(|(ts, _, _)| *ts >= start && *ts < stop)
                .map(|(ts, data, ct)| Ok(record(*ts, *data, *ct)))
                .collect();
            Ok(stream::iter(records).boxed())
        }

        async fn write_record(&self, _bucket: &str, entry: &str, record: Record) -> Result<()> {
            let mut body = Vec::new();
            let mut data = record.data;
            while let Some(chunk) = data.next().await {
                body.extend_from_slice(&chunk?);
            }
            self.written.lock().unwrap().push(Written {
                entry: entry.to_string(),
                timestamp: record.timestamp,
                size: record.size,
                body,
            });
            Ok(())
        }
    }

    fn two_record_source() -> FakeStore {
        FakeStore {
            entries: vec![entry_info("entry-1", 1_000_000_000, 5_000_000_000)],
            records: HashMap::from([(
                "entry-1".to_string(),
                vec![
                    (1_000_000_000, b"Hey" as &[u8], None),
                    (5_000_000_000, b"Bye" as &[u8], None),
                ],
            )]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mirror_copies_all_records() {
        let source = two_record_source();
        let dest = Arc::new(FakeStore::default());
        let sink = BucketSink::new(
            dest.clone(),
            "dest_bucket",
            BucketSettings {
                quota_type: Some(QuotaType::Fifo),
                ..Default::default()
            },
        );

        let outcome = run_transfer(
            &source,
            "src_bucket",
            &sink,
            &TransferOptions::default(),
            &NoProgress,
        )
        .await
        .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.total_records(), 2);
        assert_eq!(outcome.total_bytes(), 6);

        // Destination bucket created with source settings, exist_ok
        let created = dest.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, "dest_bucket");
        assert_eq!(created[0].1.quota_type, Some(QuotaType::Fifo));
        assert!(created[0].2);
        drop(created);

        // Records written with matching timestamps and byte content
        let written = dest.written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].entry, "entry-1");
        assert_eq!(written[0].timestamp, 1_000_000_000);
        assert_eq!(written[0].size, 3);
        assert_eq!(written[0].body, b"Hey");
        assert_eq!(written[1].timestamp, 5_000_000_000);
        assert_eq!(written[1].body, b"Bye");
    }

    #[tokio::test]
    async fn test_unbounded_interval_uses_entry_extremes() {
        let source = FakeStore {
            entries: vec![
                entry_info("entry-1", 1_000_000_000, 5_000_000_000),
                entry_info("entry-2", 7_000_000_000, 9_000_000_000),
            ],
            ..Default::default()
        };
        let dir = tempfile::TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path(), None);

        run_transfer(
            &source,
            "src_bucket",
            &sink,
            &TransferOptions::default(),
            &NoProgress,
        )
        .await
        .unwrap();

        // Substitution happens per entry, not once globally; the exclusive
        // stop lands one past each entry's latest record
        let queried = source.queried.lock().unwrap();
        assert_eq!(
            *queried,
            vec![
                ("entry-1".to_string(), 1_000_000_000, 5_000_000_001),
                ("entry-2".to_string(), 7_000_000_000, 9_000_000_001),
            ]
        );
    }

    #[tokio::test]
    async fn test_default_interval_includes_latest_record() {
        // The store filters with half-open bounds, so this only passes if
        // the default stop is widened past the newest record's timestamp
        let source = two_record_source();
        let dir = tempfile::TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path(), None);

        let outcome = run_transfer(
            &source,
            "src_bucket",
            &sink,
            &TransferOptions::default(),
            &NoProgress,
        )
        .await
        .unwrap();

        assert_eq!(outcome.total_records(), 2);
        let latest = dir.path().join("entry-1").join("5000000000.bin");
        assert_eq!(std::fs::read(latest).unwrap(), b"Bye");
    }

    #[tokio::test]
    async fn test_explicit_interval_passed_through() {
        let source = two_record_source();
        let dir = tempfile::TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path(), None);
        let options = TransferOptions {
            interval: Interval {
                start: Some(1_641_074_401_100_300),
                stop: Some(1_643_666_400_000_000),
            },
            ..Default::default()
        };

        run_transfer(&source, "src_bucket", &sink, &options, &NoProgress)
            .await
            .unwrap();

        let queried = source.queried.lock().unwrap();
        assert_eq!(
            queried[0],
            (
                "entry-1".to_string(),
                1_641_074_401_100_300,
                1_643_666_400_000_000
            )
        );
    }

    #[tokio::test]
    async fn test_entry_subset_only_queries_selected() {
        let mut store = MockRecordStore::new();
        store.expect_get_entry_list().returning(|_| {
            Ok(vec![
                entry_info("entry-1", 0, 10),
                entry_info("entry-2", 0, 10),
            ])
        });
        // Only entry-2 may be queried
        store
            .expect_query()
            .withf(|_, entry, _, _| entry == "entry-2")
            .times(1)
            .returning(|_, _, _, _| Ok(stream::empty().boxed()));

        let dir = tempfile::TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path(), None);
        let options = TransferOptions {
            entries: vec!["entry-2".to_string()],
            ..Default::default()
        };

        let outcome = run_transfer(&store, "src_bucket", &sink, &options, &NoProgress)
            .await
            .unwrap();
        assert_eq!(outcome.completed.len(), 1);
        assert_eq!(outcome.completed[0].entry, "entry-2");
    }

    #[tokio::test]
    async fn test_unknown_entry_names_silently_skipped() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_entry_list()
            .returning(|_| Ok(vec![entry_info("entry-1", 0, 10)]));
        store.expect_query().never();

        let dir = tempfile::TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path(), None);
        let options = TransferOptions {
            entries: vec!["no-such-entry".to_string()],
            ..Default::default()
        };

        // Documented quirk: not an error, just nothing to do
        let outcome = run_transfer(&store, "src_bucket", &sink, &options, &NoProgress)
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert!(outcome.completed.is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_leaves_destination_untouched() {
        let source = FakeStore {
            fail_entry_list: true,
            ..Default::default()
        };
        let dest = Arc::new(FakeStore::default());
        let sink = BucketSink::new(dest.clone(), "dest_bucket", BucketSettings::default());

        let err = run_transfer(
            &source,
            "src_bucket",
            &sink,
            &TransferOptions::default(),
            &NoProgress,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Oops");
        assert_eq!(err.kind(), "RemoteError");
        assert!(dest.created.lock().unwrap().is_empty());
        assert!(dest.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entry_failure_does_not_kill_siblings() {
        let source = FakeStore {
            entries: vec![
                entry_info("entry-1", 1_000_000_000, 5_000_000_000),
                entry_info("entry-2", 1_000_000_000, 5_000_000_000),
            ],
            records: HashMap::from([(
                "entry-2".to_string(),
                vec![(1_000_000_000, b"Hey" as &[u8], None)],
            )]),
            failing_entry: Some("entry-1".to_string()),
            ..Default::default()
        };
        let dir = tempfile::TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path(), None);

        let outcome = run_transfer(
            &source,
            "src_bucket",
            &sink,
            &TransferOptions::default(),
            &NoProgress,
        )
        .await
        .unwrap();

        assert!(!outcome.is_success());
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "entry-1");
        assert!(outcome.failed[0].1.to_string().contains("entry-1"));
        assert_eq!(outcome.completed.len(), 1);
        assert_eq!(outcome.completed[0].entry, "entry-2");
        assert_eq!(outcome.completed[0].records_copied, 1);
    }

    #[derive(Default)]
    struct Counting {
        started: Mutex<Vec<String>>,
        copied: Mutex<u64>,
        finished: Mutex<Vec<EntryStats>>,
        failed: Mutex<Vec<String>>,
    }

    impl TransferProgress for Counting {
        fn entry_started(&self, entry: &str, _total_bytes: u64) {
            self.started.lock().unwrap().push(entry.to_string());
        }
        fn record_copied(&self, _entry: &str, bytes: u64) {
            *self.copied.lock().unwrap() += bytes;
        }
        fn entry_finished(&self, _entry: &str, stats: &EntryStats) {
            self.finished.lock().unwrap().push(stats.clone());
        }
        fn entry_failed(&self, entry: &str) {
            self.failed.lock().unwrap().push(entry.to_string());
        }
    }

    #[tokio::test]
    async fn test_progress_sees_every_record() {
        let source = two_record_source();
        let dir = tempfile::TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path(), None);
        let progress = Counting::default();

        run_transfer(
            &source,
            "src_bucket",
            &sink,
            &TransferOptions::default(),
            &progress,
        )
        .await
        .unwrap();

        assert_eq!(*progress.started.lock().unwrap(), vec!["entry-1"]);
        assert_eq!(*progress.copied.lock().unwrap(), 6);
        let finished = progress.finished.lock().unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].records_copied, 2);
        assert!(progress.failed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_progress_reports_failed_entry() {
        let source = FakeStore {
            entries: vec![entry_info("entry-1", 1_000_000_000, 5_000_000_000)],
            failing_entry: Some("entry-1".to_string()),
            ..Default::default()
        };
        let dir = tempfile::TempDir::new().unwrap();
        let sink = FolderSink::new(dir.path(), None);
        let progress = Counting::default();

        let outcome = run_transfer(
            &source,
            "src_bucket",
            &sink,
            &TransferOptions::default(),
            &progress,
        )
        .await
        .unwrap();

        assert!(!outcome.is_success());
        // Every started entry ends in exactly one of finished/failed
        assert_eq!(*progress.started.lock().unwrap(), vec!["entry-1"]);
        assert!(progress.finished.lock().unwrap().is_empty());
        assert_eq!(*progress.failed.lock().unwrap(), vec!["entry-1"]);
    }
}
