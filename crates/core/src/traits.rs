//! The `RecordStore` trait describing the remote storage capability
//!
//! The transfer engine and the CLI commands are written against this trait
//! rather than a concrete transport, so the whole pipeline can be exercised
//! with mocks and alternative backends can be added later.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::types::{BucketInfo, BucketSettings, EntryInfo, Record};

/// A lazy, finite, non-restartable sequence of records ordered by ascending
/// timestamp, as yielded by the service.
pub type RecordStream = BoxStream<'static, Result<Record>>;

/// The capability surface of a record storage service.
///
/// Failures propagate unchanged to the caller; no retry happens at this
/// level.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List all buckets visible to the token.
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>>;

    /// Fetch one bucket's metadata. Fails if the bucket does not exist.
    async fn get_bucket(&self, name: &str) -> Result<BucketInfo>;

    /// Fetch one bucket's settings.
    async fn get_settings(&self, bucket: &str) -> Result<BucketSettings>;

    /// Create a bucket with the given settings.
    ///
    /// With `exist_ok` an already existing bucket is not an error and its
    /// settings are left untouched ("create or reuse", not "create or
    /// fail").
    async fn create_bucket(
        &self,
        bucket: &str,
        settings: &BucketSettings,
        exist_ok: bool,
    ) -> Result<()>;

    /// Remove a bucket and all its entries.
    async fn remove_bucket(&self, bucket: &str) -> Result<()>;

    /// List all entries of a bucket.
    async fn get_entry_list(&self, bucket: &str) -> Result<Vec<EntryInfo>>;

    /// Query records of one entry within the half-open interval
    /// `[start, stop)`, both in UTC microseconds.
    async fn query(&self, bucket: &str, entry: &str, start: i64, stop: i64)
    -> Result<RecordStream>;

    /// Write one record into an entry, declaring the content length up
    /// front. The record's byte stream is consumed by this call.
    async fn write_record(&self, bucket: &str, entry: &str, record: Record) -> Result<()>;
}
