//! Persistence facade: durable JSON records keyed by (collection, id).

pub mod file;

pub use file::FileStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record `{collection}/{id}` already exists")]
    AlreadyExists { collection: String, id: String },
    #[error("record `{collection}/{id}` not found")]
    NotFound { collection: String, id: String },
    #[error("storage i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Store trait for abstracting record persistence.
///
/// Implementations are atomic per record; there are no cross-record
/// transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a record; fails if it already exists.
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError>;

    /// Read a record by id.
    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError>;

    /// Replace an existing record; fails if it does not exist.
    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError>;

    /// Delete a record by id.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// List all record ids in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError>;
}
