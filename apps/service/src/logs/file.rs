use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{LogStore, LogStoreError};

const STREAM_EXT: &str = ".log";
const ARCHIVE_EXT: &str = ".gz";

/// File-backed log store: live streams at `{base}/{stream}.log`, archives at
/// `{base}/{name}.gz`.
pub struct FileLogStore {
    base_dir: PathBuf,
}

impl FileLogStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn stream_path(&self, stream: &str) -> PathBuf {
        self.base_dir.join(format!("{stream}{STREAM_EXT}"))
    }

    fn archive_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}{ARCHIVE_EXT}"))
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn append(&self, stream: &str, line: &str) -> Result<(), LogStoreError> {
        fs::create_dir_all(&self.base_dir).await?;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.stream_path(stream))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }

    async fn list(&self, include_archived: bool) -> Result<Vec<String>, LogStoreError> {
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if let Some(stream) = file_name.strip_suffix(STREAM_EXT) {
                names.push(stream.to_string());
            } else if include_archived {
                if let Some(archive) = file_name.strip_suffix(ARCHIVE_EXT) {
                    names.push(archive.to_string());
                }
            }
        }
        Ok(names)
    }

    async fn read_all(&self, stream: &str) -> Result<Vec<u8>, LogStoreError> {
        match fs::read(self.stream_path(stream)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(LogStoreError::StreamNotFound(stream.into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn create_archive(&self, name: &str, bytes: &[u8]) -> Result<(), LogStoreError> {
        fs::create_dir_all(&self.base_dir).await?;
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.archive_path(name))
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(LogStoreError::ArchiveExists(name.into()));
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_archive(&self, name: &str) -> Result<Vec<u8>, LogStoreError> {
        match fs::read(self.archive_path(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(LogStoreError::StreamNotFound(name.into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn truncate(&self, stream: &str) -> Result<(), LogStoreError> {
        // Truncate in place so the stream file keeps its identity for future
        // appends.
        match fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.stream_path(stream))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(LogStoreError::StreamNotFound(stream.into()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
