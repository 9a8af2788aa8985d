//! Trait definitions for the status ledger.

use async_trait::async_trait;

use super::types::{LedgerOutcome, LedgerUpdate};
use crate::session::SessionLog;

/// A remote store of per-date, per-column pipeline progress.
#[async_trait]
pub trait StatusLedger: Send + Sync {
    /// Returns the name of this ledger implementation.
    fn name(&self) -> &str;

    /// Sends one write. Implementations log failures themselves and must
    /// not panic or block the pipeline beyond their own timeout.
    async fn update(&self, update: &LedgerUpdate, log: &dyn SessionLog) -> LedgerOutcome;
}
