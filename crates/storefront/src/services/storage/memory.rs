//! In-memory object store for tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{ObjectStore, StorageError};

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    broken: Mutex<HashSet<String>>,
    undeletable: Mutex<HashSet<String>>,
    presign_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make presigning `key` fail from now on.
    pub fn fail_presign_for(&self, key: &str) {
        self.broken.lock().unwrap().insert(key.to_string());
    }

    /// Make deleting `key` fail until [`Self::allow_delete_for`].
    pub fn fail_delete_for(&self, key: &str) {
        self.undeletable.lock().unwrap().insert(key.to_string());
    }

    pub fn allow_delete_for(&self, key: &str) {
        self.undeletable.lock().unwrap().remove(key);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn presign_calls(&self) -> usize {
        self.presign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, _content_type: &str, body: Vec<u8>) -> Result<(), StorageError> {
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.undeletable.lock().unwrap().contains(key) {
            return Err(StorageError::Backend(format!("delete of {key} refused")));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        self.presign_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.lock().unwrap().contains(key) {
            return Err(StorageError::Presign {
                key: key.to_string(),
                reason: "signing refused".to_string(),
            });
        }
        Ok(format!(
            "https://images.test/{key}?expires={}",
            expires_in.as_secs()
        ))
    }
}
