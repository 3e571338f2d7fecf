//! Error types shared by all rstore crates
//!
//! Every failure the CLI can surface maps to one of these variants. The
//! `kind()` string is what the user sees in the `[<ErrorKind>] <message>`
//! failure line, so it is part of the CLI's output contract.

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed user input (timestamp, size, bucket path). Reported before
    /// any transfer starts.
    #[error("Failed to parse {0}")]
    Parse(String),

    /// Any failure surfaced by the remote storage service: network, auth,
    /// not-found, conflict. Propagated unchanged, no local retry.
    #[error("{0}")]
    Remote(String),

    /// Filesystem create/write failure during a folder export.
    #[error("{}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Alias '{0}' doesn't exist")]
    AliasNotFound(String),

    #[error("Alias '{0}' already exists")]
    AliasExists(String),

    /// Config file could not be read, written or parsed.
    #[error("{0}")]
    Config(String),
}

impl Error {
    /// The user-visible error class name printed in the failure line.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse(_) => "ParseError",
            Error::Remote(_) => "RemoteError",
            Error::LocalIo { .. } => "LocalIOError",
            Error::AliasNotFound(_) | Error::AliasExists(_) => "AliasError",
            Error::Config(_) => "ConfigError",
        }
    }

    /// Attach an entry name to an error raised inside an entry pipeline.
    pub fn for_entry(self, entry: &str) -> Error {
        match self {
            Error::Remote(msg) => Error::Remote(format!("Entry '{entry}': {msg}")),
            other => other,
        }
    }
}
