use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{DeleteError, UploadError};
use crate::session::listing::ListingSession;
use crate::store::ObjectStore;

/// Outcome of a delete batch: counts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    pub fn into_result(self) -> Result<usize, DeleteError> {
        if self.failed == 0 {
            Ok(self.succeeded())
        } else {
            Err(DeleteError {
                failed: self.failed,
                total: self.total,
            })
        }
    }
}

/// One local file headed for the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub key: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Outcome of an upload batch; failures keep their key.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub total: usize,
    pub failures: Vec<UploadError>,
}

/// Issue one delete per key, all in flight at once, and wait for every one
/// to settle. A failure never cancels the others.
pub async fn delete_many<S: ObjectStore>(store: &S, keys: &[String]) -> BatchReport {
    debug!(count = keys.len(), "deleting batch");
    let results = join_all(keys.iter().map(|key| async move {
        let result = store.delete(key).await;
        (key, result)
    }))
    .await;

    let mut failed = 0;
    for (key, result) in results {
        if let Err(err) = result {
            warn!(key = %key, error = %err, "delete failed");
            failed += 1;
        }
    }
    let report = BatchReport {
        total: keys.len(),
        failed,
    };
    if failed > 0 {
        warn!("{failed} out of {} deletions failed", report.total);
    } else {
        info!(count = report.total, "batch deleted");
    }
    report
}

/// Upload every item concurrently; like deletes, failures do not abort.
pub async fn upload_many<S: ObjectStore>(store: &S, items: Vec<UploadItem>) -> UploadReport {
    let total = items.len();
    let results = join_all(items.into_iter().map(|item| async move {
        let result = store.upload(&item.key, &item.file_name, item.bytes).await;
        (item.key, result)
    }))
    .await;

    let failures: Vec<UploadError> = results
        .into_iter()
        .filter_map(|(key, result)| {
            result.err().map(|source| {
                warn!(key = %key, error = %source, "upload failed");
                UploadError { key, source }
            })
        })
        .collect();
    info!(total, failed = failures.len(), "upload batch settled");
    UploadReport { total, failures }
}

/// Tracks in-flight mutation batches. Every settled batch asks for exactly
/// one listing refresh, whatever its failure count.
#[derive(Debug, Default)]
pub struct BatchMutationCoordinator {
    in_flight: usize,
}

impl BatchMutationCoordinator {
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn begin(&mut self) {
        self.in_flight += 1;
    }

    /// Settle a delete batch. The caller refreshes the listing afterwards.
    pub fn finish_delete(&mut self, report: BatchReport) -> Result<usize, DeleteError> {
        self.in_flight = self.in_flight.saturating_sub(1);
        report.into_result()
    }

    /// Settle an upload batch. The caller refreshes the listing afterwards.
    pub fn finish_upload(&mut self, report: UploadReport) -> Result<usize, Vec<UploadError>> {
        self.in_flight = self.in_flight.saturating_sub(1);
        if report.failures.is_empty() {
            Ok(report.total)
        } else {
            Err(report.failures)
        }
    }

    /// Delete `keys`, then run one refresh of `listing` for `current_path`.
    pub async fn delete_and_refresh<S: ObjectStore>(
        &mut self,
        store: &S,
        keys: &[String],
        listing: &mut ListingSession,
        current_path: &str,
    ) -> Result<usize, DeleteError> {
        self.begin();
        let report = delete_many(store, keys).await;
        let outcome = self.finish_delete(report);
        // The refresh outcome is reflected in the listing status.
        let _ = listing.refresh(store, current_path).await;
        outcome
    }
}
