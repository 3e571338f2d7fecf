//! rstore-core: Core library for the rstore CLI
//!
//! This crate provides the core functionality for the rstore CLI, including:
//! - Alias management (named endpoints with tokens)
//! - Path parsing and resolution
//! - Timestamp and size parsing
//! - The `RecordStore` trait describing the remote storage capability
//! - The transfer engine used by the `export` and `mirror` commands
//!
//! This crate is designed to be independent of any specific transport,
//! allowing for easy testing and potential future support for other backends.

pub mod alias;
pub mod error;
pub mod parse;
pub mod path;
pub mod traits;
pub mod transfer;
pub mod types;

pub use alias::{Alias, AliasManager};
pub use error::{Error, Result};
pub use parse::{format_size, format_timestamp, parse_size, parse_timestamp};
pub use path::{BucketPath, parse_bucket_path};
pub use traits::{RecordStore, RecordStream};
pub use transfer::{
    BucketSink, FolderSink, NoProgress, RecordSink, TransferOptions, TransferOutcome,
    TransferProgress, run_transfer,
};
pub use types::{
    BucketInfo, BucketSettings, ByteStream, EntryInfo, EntryStats, Interval, QuotaType, Record,
};
