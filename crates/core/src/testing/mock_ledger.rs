//! Mock status ledger for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ledger::{LedgerColumn, LedgerOutcome, LedgerUpdate, StatusLedger};
use crate::session::{ObservingDate, SessionLog};

/// Mock implementation of the StatusLedger trait.
///
/// Applies last-write-wins per (date, column) like the real endpoint and
/// keeps every write in order for assertions.
#[derive(Debug)]
pub struct MockLedger {
    history: Arc<RwLock<Vec<LedgerUpdate>>>,
    values: Arc<RwLock<HashMap<(ObservingDate, LedgerColumn), String>>>,
    /// If set, every write is rejected with this reason.
    failure: Arc<RwLock<Option<String>>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Create a new mock ledger.
    pub fn new() -> Self {
        Self {
            history: Arc::new(RwLock::new(Vec::new())),
            values: Arc::new(RwLock::new(HashMap::new())),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Every write received, in order.
    pub async fn history(&self) -> Vec<LedgerUpdate> {
        self.history.read().await.clone()
    }

    /// Number of writes received.
    pub async fn update_count(&self) -> usize {
        self.history.read().await.len()
    }

    /// Current value of a column.
    pub async fn value(&self, date: ObservingDate, column: LedgerColumn) -> Option<String> {
        self.values.read().await.get(&(date, column)).cloned()
    }

    /// Writes received for one column, in order.
    pub async fn writes_for(&self, column: LedgerColumn) -> Vec<String> {
        self.history
            .read()
            .await
            .iter()
            .filter(|u| u.column == column)
            .map(|u| u.value.clone())
            .collect()
    }

    /// Reject all further writes.
    pub async fn set_failing(&self, reason: &str) {
        *self.failure.write().await = Some(reason.to_string());
    }
}

#[async_trait]
impl StatusLedger for MockLedger {
    fn name(&self) -> &str {
        "mock"
    }

    async fn update(&self, update: &LedgerUpdate, _log: &dyn SessionLog) -> LedgerOutcome {
        self.history.write().await.push(update.clone());

        if let Some(reason) = self.failure.read().await.clone() {
            return LedgerOutcome::Failed { reason };
        }

        self.values
            .write()
            .await
            .insert((update.date, update.column), update.value.clone());
        LedgerOutcome::Recorded {
            status: 200,
            body: "{}".to_string(),
        }
    }
}
