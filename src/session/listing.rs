use tracing::{debug, error, info};

use crate::error::{ListingError, StoreError};
use crate::store::ObjectStore;
use crate::vfs::path::{materialize, Node};

/// Where the most recent refresh cycle stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListingStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last refresh failed; the view offers a retry instead of nodes.
    Failed(ListingError),
}

/// Holds the flat key set and the level materialized from it.
///
/// Nodes are never patched: every successful refresh replaces the key set and
/// rebuilds the node list wholesale.
#[derive(Debug, Default)]
pub struct ListingSession {
    keys: Vec<String>,
    nodes: Vec<Node>,
    status: ListingStatus,
    token: u64,
}

impl ListingSession {
    pub fn status(&self) -> &ListingStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListingStatus::Loading
    }

    pub fn error(&self) -> Option<&ListingError> {
        match &self.status {
            ListingStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Nodes of the current level, unfiltered.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The flat key set from the last successful refresh.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Start a refresh cycle. Only the completion carrying the returned token
    /// is applied; earlier in-flight refreshes become stale.
    pub fn begin_refresh(&mut self) -> u64 {
        self.token += 1;
        self.status = ListingStatus::Loading;
        debug!(token = self.token, "listing refresh started");
        self.token
    }

    /// Apply a listing response for `current_path`. Returns `false` when the
    /// response belongs to a superseded refresh and was dropped.
    pub fn finish_refresh(
        &mut self,
        token: u64,
        result: Result<Vec<String>, StoreError>,
        current_path: &str,
    ) -> bool {
        if token != self.token {
            debug!(token, current = self.token, "discarding stale listing");
            return false;
        }
        match result {
            Ok(keys) => {
                self.keys = keys;
                self.nodes = materialize(current_path, &self.keys);
                self.status = ListingStatus::Ready;
                info!(
                    keys = self.keys.len(),
                    nodes = self.nodes.len(),
                    path = current_path,
                    "listing refreshed"
                );
            }
            Err(err) => {
                error!(error = %err, "listing refresh failed");
                self.status = ListingStatus::Failed(ListingError(err));
            }
        }
        true
    }

    /// Rebuild the level for a new path from the keys already held.
    pub fn rematerialize(&mut self, current_path: &str) {
        self.nodes = materialize(current_path, &self.keys);
    }

    /// One complete refresh cycle against `store`.
    pub async fn refresh<S: ObjectStore>(
        &mut self,
        store: &S,
        current_path: &str,
    ) -> Result<&[Node], ListingError> {
        let token = self.begin_refresh();
        let result = store.list().await;
        self.finish_refresh(token, result, current_path);
        match &self.status {
            ListingStatus::Failed(err) => Err(err.clone()),
            _ => Ok(&self.nodes),
        }
    }
}
