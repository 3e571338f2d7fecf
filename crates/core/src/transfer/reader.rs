//! Record stream reader
//!
//! Wraps the remote query capability to produce, per entry, the lazy record
//! sequence bounded by a half-open interval. Unbounded sides of the
//! interval are substituted from the entry's own oldest/latest record
//! timestamps (the exclusive stop one past `latest_record`), so entries
//! with different timestamp ranges get different effective bounds.

use tracing::debug;

use crate::error::Result;
use crate::traits::{RecordStore, RecordStream};
use crate::types::{EntryInfo, Interval};

pub async fn read_records(
    store: &dyn RecordStore,
    bucket: &str,
    entry: &EntryInfo,
    interval: &Interval,
) -> Result<RecordStream> {
    let (start, stop) = interval.resolve(entry);
    debug!(bucket, entry = %entry.name, start, stop, "Querying records");
    store.query(bucket, &entry.name, start, stop).await
}
