//! Moving objects between the bucket and the local filesystem.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DownloadError, StoreError, UploadError};
use crate::session::batch::UploadItem;
use crate::store::keys::file_name;
use crate::store::ObjectStore;

/// Key an upload lands under: `custom_key` (trimmed) or the local file name,
/// prefixed by the current folder when not at the root.
pub fn upload_key(current_path: &str, custom_key: &str, local_name: &str) -> String {
    let custom = custom_key.trim();
    let name = if custom.is_empty() { local_name } else { custom };
    if current_path.is_empty() {
        name.to_string()
    } else {
        format!("{current_path}/{name}")
    }
}

/// File name component of a local path, if it has one.
pub fn local_file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Read a local file into an upload destined for `key`.
pub async fn read_upload(path: &Path, key: String) -> Result<UploadItem, UploadError> {
    let name = local_file_name(path).ok_or_else(|| UploadError {
        key: key.clone(),
        source: StoreError::LocalIo(format!("{} is not a file", path.display())),
    })?;
    let bytes = tokio::fs::read(path).await.map_err(|e| UploadError {
        key: key.clone(),
        source: e.into(),
    })?;
    Ok(UploadItem {
        key,
        file_name: name,
        bytes,
    })
}

/// Read `path` and upload it under `key`.
pub async fn upload_file<S: ObjectStore>(
    store: &S,
    path: &Path,
    key: String,
) -> Result<String, UploadError> {
    let item = read_upload(path, key).await?;
    store
        .upload(&item.key, &item.file_name, item.bytes)
        .await
        .map_err(|source| UploadError {
            key: item.key.clone(),
            source,
        })?;
    info!(key = %item.key, "uploaded");
    Ok(item.key)
}

/// Fetch `key` and write it into `dir` under its last path segment.
pub async fn download_to<S: ObjectStore>(
    store: &S,
    key: &str,
    dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let fail = |source: StoreError| DownloadError {
        key: key.to_string(),
        source,
    };
    let name = file_name(key);
    if name.is_empty() {
        return Err(fail(StoreError::LocalIo(format!("{key} has no file name"))));
    }
    let body = store.download(key).await.map_err(fail)?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| fail(e.into()))?;
    let target = dir.join(name);
    tokio::fs::write(&target, &body.bytes)
        .await
        .map_err(|e| fail(e.into()))?;
    info!(key, path = %target.display(), bytes = body.bytes.len(), "downloaded");
    Ok(target)
}
