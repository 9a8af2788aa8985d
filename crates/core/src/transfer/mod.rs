//! One-way mirror of a finished session directory.

mod error;
mod rsync;
mod traits;
mod types;

pub use error::TransferError;
pub use rsync::RsyncTransfer;
pub use traits::Transfer;
pub use types::{TransferJob, TransferResult};
