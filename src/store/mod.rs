//! The object-store collaborator: the only component that performs I/O
//! against the bucket.
//!
//! Two implementations exist: [`HttpStore`] talks to the bucket service over
//! HTTP, [`MemoryStore`] keeps objects in memory for `--demo` and tests.

pub mod http;
pub mod keys;
pub mod memory;
#[cfg(test)]
pub mod testing;

use std::future::Future;

use serde::Deserialize;

use crate::error::StoreError;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// Raw object bytes as returned by a download, with the server's content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Server-side settings fetched once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteConfig {
    pub read_only_mode: bool,
    pub demo_mode: bool,
    pub bucket_host: String,
    pub bucket_name: String,
}

impl RemoteConfig {
    /// Header label, e.g. `demo-bucket @ demo-host.example.com`.
    pub fn label(&self) -> String {
        match (self.bucket_name.is_empty(), self.bucket_host.is_empty()) {
            (true, true) => "bucket".to_string(),
            (false, true) => self.bucket_name.clone(),
            (true, false) => self.bucket_host.clone(),
            (false, false) => format!("{} @ {}", self.bucket_name, self.bucket_host),
        }
    }
}

/// Interface to the bucket service.
///
/// Every method is a single request; no method retries.
pub trait ObjectStore {
    /// `GET /config`
    fn config(&self) -> impl Future<Output = Result<RemoteConfig, StoreError>> + Send;

    /// `GET /bucket/list`: the complete flat key set.
    fn list(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// `GET /bucket/download/{key}`
    fn download(&self, key: &str) -> impl Future<Output = Result<ObjectBody, StoreError>> + Send;

    /// `POST /bucket/upload` (multipart `file` + `key`).
    fn upload(
        &self,
        key: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// `PUT /bucket/update/{key}` with a raw text body.
    fn update(&self, key: &str, body: String) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// `DELETE /bucket/delete/{key}`
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_config_parses_camel_case() {
        let json = r#"{"readOnlyMode":true,"demoMode":false,"bucketHost":"h","bucketName":"b"}"#;
        let cfg: RemoteConfig = serde_json::from_str(json).unwrap();
        assert!(cfg.read_only_mode);
        assert!(!cfg.demo_mode);
        assert_eq!(cfg.label(), "b @ h");
    }

    #[test]
    fn remote_config_defaults_missing_fields() {
        let cfg: RemoteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RemoteConfig::default());
        assert!(!cfg.read_only_mode);
        assert_eq!(cfg.label(), "bucket");
    }
}
