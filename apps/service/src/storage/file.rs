use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{Store, StoreError};

/// Flat-file store: one JSON file per record at `{base}/{collection}/{id}.json`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn record_path(&self, collection: &str, id: &str) -> PathBuf {
        self.base_dir.join(collection).join(format!("{id}.json"))
    }

    fn not_found(collection: &str, id: &str) -> StoreError {
        StoreError::NotFound { collection: collection.into(), id: id.into() }
    }

    /// Write a record atomically: write to a sibling temp file, then rename
    /// over the target.
    async fn write_record(path: &Path, record: &Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for FileStore {
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path).await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists {
                    collection: collection.into(),
                    id: id.into(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let bytes = serde_json::to_vec(record)?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let path = self.record_path(collection, id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Self::not_found(collection, id));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        match fs::metadata(&path).await {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Self::not_found(collection, id));
            }
            Err(err) => return Err(err.into()),
        }
        Self::write_record(&path, record).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.record_path(collection, id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(Self::not_found(collection, id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.base_dir.join(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // A collection nobody has written to yet is simply empty.
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(id) = name.to_string_lossy().strip_suffix(".json") {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }
}
