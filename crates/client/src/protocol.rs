//! Wire types of the record storage HTTP API
//!
//! All endpoints live under `/api/v1`. Bucket and entry metadata travel as
//! JSON; record payloads travel as raw byte streams with the timestamp in
//! the query string and the declared length in `Content-Length`.

use serde::{Deserialize, Serialize};

use rstore_core::{BucketInfo, BucketSettings, EntryInfo};

/// Path prefix of the API, relative to the alias URL.
pub const API_PREFIX: &str = "api/v1";

/// `GET api/v1/b`
#[derive(Debug, Serialize, Deserialize)]
pub struct BucketListResponse {
    pub buckets: Vec<BucketInfo>,
}

/// `GET api/v1/b/{bucket}`
#[derive(Debug, Serialize, Deserialize)]
pub struct BucketResponse {
    pub info: BucketInfo,
    pub settings: BucketSettings,
}

/// `GET api/v1/b/{bucket}/entries`
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryListResponse {
    pub entries: Vec<EntryInfo>,
}

/// One record's metadata within a query result. The content is fetched
/// separately, as a byte stream, when the record is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMeta {
    /// UTC microseconds since the epoch.
    pub ts: i64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// `GET api/v1/b/{bucket}/{entry}/q?start=..&stop=..`
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub records: Vec<RecordMeta>,
}

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
