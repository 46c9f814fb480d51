//! Failure-injecting store for session and app tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::store::{MemoryStore, ObjectBody, ObjectStore, RemoteConfig};

fn injected(what: &str) -> StoreError {
    StoreError::Status {
        status: 500,
        body: format!("injected failure: {what}"),
    }
}

/// Wraps a [`MemoryStore`] and fails selected calls.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_list: Mutex<bool>,
    pub fail_config: bool,
    pub fail_update: Mutex<bool>,
    pub fail_downloads: HashSet<String>,
    pub fail_deletes: HashSet<String>,
    pub fail_uploads: HashSet<String>,
    pub list_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn set_fail_list(&self, fail: bool) {
        *self.fail_list.lock().unwrap() = fail;
    }

    pub fn set_fail_update(&self, fail: bool) {
        *self.fail_update.lock().unwrap() = fail;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

impl ObjectStore for FlakyStore {
    async fn config(&self) -> Result<RemoteConfig, StoreError> {
        if self.fail_config {
            return Err(injected("config"));
        }
        self.inner.config().await
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list.lock().unwrap() {
            return Err(injected("list"));
        }
        self.inner.list().await
    }

    async fn download(&self, key: &str) -> Result<ObjectBody, StoreError> {
        if self.fail_downloads.contains(key) {
            return Err(injected(key));
        }
        self.inner.download(key).await
    }

    async fn upload(&self, key: &str, file_name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        if self.fail_uploads.contains(key) {
            return Err(injected(key));
        }
        self.inner.upload(key, file_name, bytes).await
    }

    async fn update(&self, key: &str, body: String) -> Result<(), StoreError> {
        if *self.fail_update.lock().unwrap() {
            return Err(injected(key));
        }
        self.inner.update(key, body).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.contains(key) {
            return Err(injected(key));
        }
        self.inner.delete(key).await
    }
}
