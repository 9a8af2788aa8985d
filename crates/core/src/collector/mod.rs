//! Instrument telemetry collector.
//!
//! Copies each instrument's nightly telemetry tree into the session
//! directory and expands compressed files in place.

mod decompress;
mod error;
mod nightly;

pub use decompress::{CompressionFormat, Decompressor};
pub use error::CollectorError;
pub use nightly::{CopiedTree, NightlyCollector, INSTRUMENTS};
