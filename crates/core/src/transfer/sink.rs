//! Transfer sinks
//!
//! A sink accepts labeled byte streams with a declared length and
//! timestamp. Two variants exist: a local folder (export) and a remote
//! bucket (mirror). The entry pipeline is polymorphic over this trait so it
//! is written only once.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::RecordStore;
use crate::types::{BucketSettings, Record};

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Ensure the destination container exists. Called once, before any
    /// pipeline is launched; a failure here is fatal for the whole
    /// transfer.
    async fn prepare(&self) -> Result<()>;

    /// Called once per entry before its first record.
    async fn begin_entry(&self, entry: &str) -> Result<()>;

    /// Consume one record. The record's byte stream is read to completion.
    async fn accept(&self, entry: &str, record: Record) -> Result<()>;
}

/// Writes each record to `<root>/<entry>/<timestamp>.<ext>`.
pub struct FolderSink {
    root: PathBuf,
    ext_override: Option<String>,
}

impl FolderSink {
    /// `ext_override` may be given with or without a leading dot.
    pub fn new(root: impl Into<PathBuf>, ext_override: Option<&str>) -> Self {
        Self {
            root: root.into(),
            ext_override: ext_override.map(|e| e.trim_start_matches('.').to_string()),
        }
    }

    fn extension(&self, content_type: Option<&str>) -> String {
        if let Some(ext) = &self.ext_override {
            return ext.clone();
        }
        content_type
            .and_then(extension_for_content_type)
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Map a declared content type to a file extension, if it is a recognized
/// type.
fn extension_for_content_type(content_type: &str) -> Option<String> {
    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
}

#[async_trait]
impl RecordSink for FolderSink {
    async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::LocalIo {
                path: self.root.clone(),
                source: e,
            })
    }

    async fn begin_entry(&self, entry: &str) -> Result<()> {
        let dir = self.root.join(entry);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::LocalIo {
                path: dir.clone(),
                source: e,
            })
    }

    async fn accept(&self, entry: &str, record: Record) -> Result<()> {
        let ext = self.extension(record.content_type.as_deref());
        let path = self
            .root
            .join(entry)
            .join(format!("{}.{ext}", record.timestamp));

        let io_err = |e: std::io::Error| Error::LocalIo {
            path: path.clone(),
            source: e,
        };

        let mut file = tokio::fs::File::create(&path).await.map_err(io_err)?;
        let mut data = record.data;
        while let Some(chunk) = data.next().await {
            file.write_all(&chunk?).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)?;

        debug!(path = %path.display(), size = record.size, "Wrote record to file");
        Ok(())
    }
}

/// Re-streams records into a destination bucket, preserving entry names and
/// timestamps.
pub struct BucketSink {
    store: Arc<dyn RecordStore>,
    bucket: String,
    settings: BucketSettings,
}

impl BucketSink {
    /// `settings` are the source bucket's settings, applied when the
    /// destination bucket has to be created.
    pub fn new(store: Arc<dyn RecordStore>, bucket: &str, settings: BucketSettings) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            settings,
        }
    }
}

#[async_trait]
impl RecordSink for BucketSink {
    async fn prepare(&self) -> Result<()> {
        self.store
            .create_bucket(&self.bucket, &self.settings, true)
            .await
    }

    async fn begin_entry(&self, _entry: &str) -> Result<()> {
        Ok(())
    }

    async fn accept(&self, entry: &str, record: Record) -> Result<()> {
        self.store.write_record(&self.bucket, entry, record).await
    }
}
