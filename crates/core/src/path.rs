//! Bucket path parsing
//!
//! Remote buckets are addressed as `alias/bucket`, where the alias must
//! resolve against the persisted alias store.

use crate::error::{Error, Result};

/// A parsed `alias/bucket` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPath {
    pub alias: String,
    pub bucket: String,
}

/// Parse an `alias/bucket` path string.
///
/// A trailing slash after the bucket name is tolerated. Anything without
/// exactly an alias and a bucket component fails with `ParseError`.
pub fn parse_bucket_path(path: &str) -> Result<BucketPath> {
    let mut parts = path.splitn(2, '/');
    let alias = parts.next().unwrap_or_default();
    let bucket = parts.next().unwrap_or_default().trim_end_matches('/');

    if alias.is_empty() || bucket.is_empty() || bucket.contains('/') {
        return Err(Error::Parse(path.to_string()));
    }

    Ok(BucketPath {
        alias: alias.to_string(),
        bucket: bucket.to_string(),
    })
}
