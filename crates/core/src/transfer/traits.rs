//! Trait definitions for the transfer module.

use async_trait::async_trait;

use super::error::TransferError;
use super::types::{TransferJob, TransferResult};
use crate::session::SessionLog;

/// Sends a session directory to the remote archive.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Returns the name of this transfer implementation.
    fn name(&self) -> &str;

    async fn transfer(
        &self,
        job: &TransferJob,
        log: &dyn SessionLog,
    ) -> Result<TransferResult, TransferError>;
}
