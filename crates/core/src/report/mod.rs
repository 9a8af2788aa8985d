//! Report pages for a session directory.

mod template;

pub use template::{TemplateRenderer, DEFAULT_TEMPLATE};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::session::StageContext;

/// Errors that can occur while rendering reports.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read template {path}")]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rendering failed: {0}")]
    Failed(String),
}

/// Produces the browsable pages (and any plots) for a session.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Returns the name of this renderer implementation.
    fn name(&self) -> &str;

    /// Renders into `ctx.session_dir`; returns the files written.
    async fn render(&self, ctx: &StageContext<'_>) -> Result<Vec<PathBuf>, RenderError>;
}
