//! Mock transfer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::session::SessionLog;
use crate::transfer::{Transfer, TransferError, TransferJob, TransferResult};

/// Mock implementation of the Transfer trait.
///
/// Records jobs and succeeds unless an error has been queued.
#[derive(Debug)]
pub struct MockTransfer {
    jobs: Arc<RwLock<Vec<TransferJob>>>,
    /// If set, the next transfer will fail with this error.
    next_error: Arc<RwLock<Option<TransferError>>>,
}

impl Default for MockTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransfer {
    /// Create a new mock transfer.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded jobs.
    pub async fn recorded_jobs(&self) -> Vec<TransferJob> {
        self.jobs.read().await.clone()
    }

    /// Configure the next transfer to fail with the given error.
    pub async fn set_next_error(&self, error: TransferError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Transfer for MockTransfer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transfer(
        &self,
        job: &TransferJob,
        _log: &dyn SessionLog,
    ) -> Result<TransferResult, TransferError> {
        self.jobs.write().await.push(job.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(TransferResult {
            destination: job.destination(),
            duration_ms: 0,
        })
    }
}
