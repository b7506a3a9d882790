//! In-memory fakes for the external collaborators, shared across unit tests.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::logs::{LogStore, LogStoreError};
use crate::notify::{Notifier, NotifyError};
use crate::storage::{Store, StoreError};

/// In-memory persistence facade.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn with_record(self, collection: &str, id: &str, record: Value) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.to_string()), record);
        self
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.records
            .lock()
            .unwrap()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let key = (collection.to_string(), id.to_string());
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                collection: collection.into(),
                id: id.into(),
            });
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        self.get(collection, id)
            .ok_or_else(|| StoreError::NotFound { collection: collection.into(), id: id.into() })
    }

    async fn update(&self, collection: &str, id: &str, record: &Value) -> Result<(), StoreError> {
        let key = (collection.to_string(), id.to_string());
        let mut records = self.records.lock().unwrap();
        if !records.contains_key(&key) {
            return Err(StoreError::NotFound { collection: collection.into(), id: id.into() });
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let key = (collection.to_string(), id.to_string());
        self.records
            .lock()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound { collection: collection.into(), id: id.into() })
    }

    async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, id)| id.clone())
            .collect())
    }
}

/// In-memory log store with injectable archive failures.
#[derive(Default)]
pub struct MemoryLogStore {
    streams: Mutex<BTreeMap<String, Vec<u8>>>,
    archives: Mutex<BTreeMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryLogStore {
    /// Make every archive write for this stream fail with an i/o error.
    pub fn fail_archives_for(&self, stream: &str) {
        self.failing.lock().unwrap().insert(stream.to_string());
    }

    pub fn lines(&self, stream: &str) -> Vec<String> {
        let streams = self.streams.lock().unwrap();
        let content = streams.get(stream).cloned().unwrap_or_default();
        String::from_utf8(content)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn append(&self, stream: &str, line: &str) -> Result<(), LogStoreError> {
        let mut streams = self.streams.lock().unwrap();
        let content = streams.entry(stream.to_string()).or_default();
        content.extend_from_slice(line.as_bytes());
        content.push(b'\n');
        Ok(())
    }

    async fn list(&self, include_archived: bool) -> Result<Vec<String>, LogStoreError> {
        let mut names: Vec<String> = self.streams.lock().unwrap().keys().cloned().collect();
        if include_archived {
            names.extend(self.archives.lock().unwrap().keys().cloned());
        }
        Ok(names)
    }

    async fn read_all(&self, stream: &str) -> Result<Vec<u8>, LogStoreError> {
        self.streams
            .lock()
            .unwrap()
            .get(stream)
            .cloned()
            .ok_or_else(|| LogStoreError::StreamNotFound(stream.into()))
    }

    async fn create_archive(&self, name: &str, bytes: &[u8]) -> Result<(), LogStoreError> {
        let failing = self.failing.lock().unwrap();
        if failing.iter().any(|stream| name.starts_with(&format!("{stream}-"))) {
            return Err(LogStoreError::Io(io::Error::other("injected archive failure")));
        }
        drop(failing);

        let mut archives = self.archives.lock().unwrap();
        if archives.contains_key(name) {
            return Err(LogStoreError::ArchiveExists(name.into()));
        }
        archives.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read_archive(&self, name: &str) -> Result<Vec<u8>, LogStoreError> {
        self.archives
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| LogStoreError::StreamNotFound(name.into()))
    }

    async fn truncate(&self, stream: &str) -> Result<(), LogStoreError> {
        let mut streams = self.streams.lock().unwrap();
        match streams.get_mut(stream) {
            Some(content) => {
                content.clear();
                Ok(())
            }
            None => Err(LogStoreError::StreamNotFound(stream.into())),
        }
    }
}

/// Notifier that records every send, optionally failing them all.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::GatewayStatus(500));
        }
        self.sent.lock().unwrap().push((phone.to_string(), message.to_string()));
        Ok(())
    }
}
