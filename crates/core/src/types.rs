//! Data model shared between the transfer engine, the HTTP adapter and the
//! CLI commands.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A lazy sequence of byte chunks, consumed exactly once.
pub type ByteStream = BoxStream<'static, Result<Bytes, Error>>;

/// Retention policy of a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuotaType {
    /// Keep everything until the bucket is full, then reject writes.
    #[default]
    None,
    /// Evict the oldest records once the quota size is reached.
    Fifo,
}

impl std::fmt::Display for QuotaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaType::None => write!(f, "NONE"),
            QuotaType::Fifo => write!(f, "FIFO"),
        }
    }
}

impl std::str::FromStr for QuotaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(QuotaType::None),
            "FIFO" => Ok(QuotaType::Fifo),
            _ => Err(format!("Invalid quota type: {s}")),
        }
    }
}

/// Bucket settings as stored by the service.
///
/// `None` fields mean "service default"; when mirroring, the source bucket's
/// settings are applied verbatim to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BucketSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_type: Option<QuotaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_block_size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_block_records: Option<u64>,
}

/// Metadata snapshot of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    pub entry_count: u64,
    pub size: u64,
    /// UTC microseconds of the oldest record in the bucket.
    pub oldest_record: i64,
    /// UTC microseconds of the latest record in the bucket.
    pub latest_record: i64,
}

/// Metadata snapshot of one entry, fetched fresh per transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub name: String,
    pub record_count: u64,
    pub block_count: u64,
    pub size: u64,
    pub oldest_record: i64,
    pub latest_record: i64,
}

/// Half-open time range `[start, stop)` in UTC microseconds.
///
/// `None` on either bound means unbounded in that direction; the effective
/// bound is substituted per entry from its oldest/latest record timestamps.
/// An inverted interval is not an error, it simply selects no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    pub start: Option<i64>,
    pub stop: Option<i64>,
}

impl Interval {
    /// Resolve the effective bounds for one entry.
    ///
    /// The stop bound is exclusive, so an unbounded stop substitutes one
    /// microsecond past `latest_record`; the newest record stays inside the
    /// range.
    pub fn resolve(&self, entry: &EntryInfo) -> (i64, i64) {
        (
            self.start.unwrap_or(entry.oldest_record),
            self.stop
                .unwrap_or_else(|| entry.latest_record.saturating_add(1)),
        )
    }
}

/// One unit of transfer: a timestamped binary blob with a lazy byte stream.
pub struct Record {
    /// UTC microseconds since the epoch.
    pub timestamp: i64,
    /// Declared content length in bytes.
    pub size: u64,
    pub content_type: Option<String>,
    pub data: ByteStream,
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("timestamp", &self.timestamp)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Per-entry transfer counters, mutated only by the pipeline owning the
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryStats {
    pub entry: String,
    pub records_copied: u64,
    pub bytes_copied: u64,
}
