//! Per-check log streams and their archival.
//!
//! Each check appends newline-delimited JSON records to its own stream.
//! The archiver periodically compresses a stream's accumulated content into a
//! uniquely named archive and truncates the live stream, never the other way
//! around.

pub mod archiver;
pub mod file;

pub use archiver::LogArchiver;
pub use file::FileLogStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("log stream `{0}` not found")]
    StreamNotFound(String),
    #[error("archive `{0}` already exists")]
    ArchiveExists(String),
    #[error("log i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Append-only log streams plus write-once archives.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append one line to a stream, creating the stream if needed.
    async fn append(&self, stream: &str, line: &str) -> Result<(), LogStoreError>;

    /// List live stream names, optionally including archive names.
    async fn list(&self, include_archived: bool) -> Result<Vec<String>, LogStoreError>;

    /// Read a live stream's full current content.
    async fn read_all(&self, stream: &str) -> Result<Vec<u8>, LogStoreError>;

    /// Write an archive; fails if one with the same name already exists.
    async fn create_archive(&self, name: &str, bytes: &[u8]) -> Result<(), LogStoreError>;

    /// Read an archive's raw (compressed) bytes back.
    async fn read_archive(&self, name: &str) -> Result<Vec<u8>, LogStoreError>;

    /// Clear a live stream's content, keeping the stream itself.
    async fn truncate(&self, stream: &str) -> Result<(), LogStoreError>;
}
