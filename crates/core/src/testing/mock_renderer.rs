//! Mock report renderer for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::report::{RenderError, ReportRenderer};
use crate::session::{layout, StageContext};

/// Mock implementation of the ReportRenderer trait.
///
/// Writes a one-line `index.html` so the session layout stays complete.
#[derive(Debug)]
pub struct MockRenderer {
    rendered: Arc<RwLock<Vec<PathBuf>>>,
    /// If set, the next render will fail with this message.
    next_error: Arc<RwLock<Option<String>>>,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    /// Create a new mock renderer.
    pub fn new() -> Self {
        Self {
            rendered: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Session directories rendered so far.
    pub async fn rendered_dirs(&self) -> Vec<PathBuf> {
        self.rendered.read().await.clone()
    }

    /// Configure the next render to fail.
    pub async fn set_next_error(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }
}

#[async_trait]
impl ReportRenderer for MockRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render(&self, ctx: &StageContext<'_>) -> Result<Vec<PathBuf>, RenderError> {
        self.rendered.write().await.push(ctx.session_dir.to_path_buf());

        if let Some(message) = self.next_error.write().await.take() {
            return Err(RenderError::Failed(message));
        }

        let path = ctx.session_dir.join(layout::INDEX_FILE);
        tokio::fs::write(&path, format!("<h1>{}</h1>\n", ctx.date))
            .await
            .map_err(|e| RenderError::WriteFailed {
                path: path.clone(),
                source: e,
            })?;
        Ok(vec![path])
    }
}
