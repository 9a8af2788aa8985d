//! Remote status ledger.
//!
//! Every stage reports progress as `(date, column, value)` writes against a
//! remote HTTP key-value store. Writes are best-effort: a failed write is
//! logged and never interrupts the pipeline. The remote side applies
//! last-write-wins per (date, column), so repeating a write is harmless.

mod http;
mod traits;
mod types;

pub use http::{integrity_token, HttpLedger};
pub use traits::StatusLedger;
pub use types::{ledger_timestamp, LedgerColumn, LedgerOutcome, LedgerUpdate, SENTINEL_ERROR};

use thiserror::Error;

/// Errors constructing a ledger client.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
