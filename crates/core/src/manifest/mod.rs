//! Content manifest for a finished session directory.
//!
//! One line per regular file, `<hex digest>  ./<relative path>`, in the
//! order the directory walk visits them. The manifest never lists itself.

mod builder;
mod error;
mod types;

pub use builder::{compute_checksum, ManifestBuilder};
pub use error::ManifestError;
pub use types::{ChecksumType, ManifestEntry, ManifestSummary, SkippedEntry};
