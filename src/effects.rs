//! Side effects requested by the state machine, and their results.
//!
//! `App` never awaits: it returns [`Effect`]s, the main loop runs each one
//! with [`run`], and the resulting [`Completion`] goes back into `App::apply`.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{DownloadError, StoreError, UploadError};
use crate::session::batch::{delete_many, BatchReport};
use crate::session::preview::SaveRequest;
use crate::session::transfer::{download_to, upload_file};
use crate::store::{ObjectBody, ObjectStore, RemoteConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchConfig,
    Refresh { token: u64 },
    Load { token: u64, key: String },
    Save(SaveRequest),
    Delete { keys: Vec<String> },
    Upload { path: PathBuf, key: String },
    Download { key: String, dir: PathBuf },
}

#[derive(Debug)]
pub enum Completion {
    Config(Result<RemoteConfig, StoreError>),
    Listing {
        token: u64,
        result: Result<Vec<String>, StoreError>,
    },
    Loaded {
        token: u64,
        result: Result<ObjectBody, StoreError>,
    },
    Saved {
        request: SaveRequest,
        result: Result<(), StoreError>,
    },
    Deleted(BatchReport),
    Uploaded(Result<String, UploadError>),
    Downloaded(Result<PathBuf, DownloadError>),
}

/// Perform one effect against the store.
pub async fn run<S: ObjectStore>(store: &S, effect: Effect) -> Completion {
    debug!(?effect, "running effect");
    match effect {
        Effect::FetchConfig => Completion::Config(store.config().await),
        Effect::Refresh { token } => Completion::Listing {
            token,
            result: store.list().await,
        },
        Effect::Load { token, key } => Completion::Loaded {
            token,
            result: store.download(&key).await,
        },
        Effect::Save(request) => {
            let result = store.update(&request.key, request.body.clone()).await;
            Completion::Saved { request, result }
        }
        Effect::Delete { keys } => Completion::Deleted(delete_many(store, &keys).await),
        Effect::Upload { path, key } => Completion::Uploaded(upload_file(store, &path, key).await),
        Effect::Download { key, dir } => {
            Completion::Downloaded(download_to(store, &key, &dir).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn refresh_carries_its_token() {
        let store = MemoryStore::with_objects([("a", "1")]);
        match run(&store, Effect::Refresh { token: 7 }).await {
            Completion::Listing { token, result } => {
                assert_eq!(token, 7);
                assert_eq!(result.unwrap(), vec!["a".to_string()]);
            }
            other => panic!("unexpected completion {other:?}"),
        }
    }

    #[tokio::test]
    async fn save_returns_the_request() {
        let store = MemoryStore::with_objects([("n.txt", "old")]);
        let request = SaveRequest {
            token: 3,
            key: "n.txt".into(),
            body: "new".into(),
        };
        match run(&store, Effect::Save(request.clone())).await {
            Completion::Saved { request: r, result } => {
                assert_eq!(r, request);
                assert!(result.is_ok());
            }
            other => panic!("unexpected completion {other:?}"),
        }
        assert_eq!(store.get("n.txt").unwrap(), b"new");
    }
}
