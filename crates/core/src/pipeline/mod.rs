//! Nightly archive pipeline.
//!
//! A fixed sequence of stages run for one observing date. Only date
//! validation, directory preparation and the session lock can abort a
//! session; every later failure is logged, counted and recorded in the
//! ledger while the remaining stages still run.

mod runner;
mod stage;
mod types;

pub use runner::ArchivePipeline;
pub use stage::{ArtifactStatus, SourceArtifact, StageFailure, StageOutcome, StageReport};
pub use types::{PipelineError, PipelineState, RunRequest, RunSummary};
