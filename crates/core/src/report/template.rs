//! Index page from a date-substituted template.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ReportConfig;
use crate::session::{layout, StageContext};

use super::{RenderError, ReportRenderer};

/// Built-in index page. `YYYY-MM-DD` and `YYYYMMDD` are replaced with the
/// observing date.
pub const DEFAULT_TEMPLATE: &str = r#"<html>
<head>
<title>Weather and seeing for YYYY-MM-DD</title>
</head>
<body>
<h1>Weather and seeing for YYYY-MM-DD</h1>
<h2>Telemetry</h2>
<ul>
<li><a href="./k1_weather.json">Keck I weather</a></li>
<li><a href="./k1_fwhm.json">Keck I FWHM</a></li>
<li><a href="./k2_weather.json">Keck II weather</a></li>
<li><a href="./k2_fwhm.json">Keck II FWHM</a></li>
</ul>
<h2>Nightly data</h2>
<ul>
<li><a href="./nightly1/">nightly1</a></li>
<li><a href="./nightly2/">nightly2</a></li>
</ul>
<h2>Seeing</h2>
<ul>
<li><a href="./massdimm/massdimm.html">MASS/DIMM</a></li>
<li><a href="./skyprobe/skyprobe.html">CFHT SkyProbe</a></li>
</ul>
<p><a href="./weatherYYYYMMDD.md5sum">Checksums</a></p>
</body>
</html>
"#;

/// Writes `index.html` from the configured or built-in template.
pub struct TemplateRenderer {
    template_path: Option<PathBuf>,
}

impl TemplateRenderer {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            template_path: config.template_path.clone(),
        }
    }

    async fn template(&self) -> Result<String, RenderError> {
        match &self.template_path {
            Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                RenderError::TemplateUnreadable {
                    path: path.clone(),
                    source: e,
                }
            }),
            None => Ok(DEFAULT_TEMPLATE.to_string()),
        }
    }
}

#[async_trait]
impl ReportRenderer for TemplateRenderer {
    fn name(&self) -> &str {
        "template"
    }

    async fn render(&self, ctx: &StageContext<'_>) -> Result<Vec<PathBuf>, RenderError> {
        let page = self
            .template()
            .await?
            .replace("YYYY-MM-DD", &ctx.date.canonical())
            .replace("YYYYMMDD", &ctx.date.compact());

        let path = ctx.session_dir.join(layout::INDEX_FILE);
        ctx.log.info(&format!("creating {}", path.display()));
        tokio::fs::write(&path, page)
            .await
            .map_err(|e| RenderError::WriteFailed {
                path: path.clone(),
                source: e,
            })?;

        Ok(vec![path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{NoopSessionLog, ObservingDate};
    use tempfile::TempDir;

    fn ctx(dir: &std::path::Path) -> StageContext<'_> {
        StageContext {
            date: ObservingDate::parse("2024-03-15").unwrap(),
            session_dir: dir,
            log: &NoopSessionLog,
        }
    }

    #[tokio::test]
    async fn test_default_template_substitutes_both_forms() {
        let temp = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new(&ReportConfig::default());

        let written = renderer.render(&ctx(temp.path())).await.unwrap();
        assert_eq!(written, vec![temp.path().join("index.html")]);

        let page = std::fs::read_to_string(temp.path().join("index.html")).unwrap();
        assert!(page.contains("Weather and seeing for 2024-03-15"));
        assert!(page.contains("weather20240315.md5sum"));
        assert!(!page.contains("YYYY"));
    }

    #[tokio::test]
    async fn test_custom_template() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("template.html");
        std::fs::write(&template, "<h1>YYYY-MM-DD</h1><img src=\"YYYYMMDD.png\">").unwrap();
        let session = temp.path().join("20240315");
        std::fs::create_dir_all(&session).unwrap();

        let renderer = TemplateRenderer::new(&ReportConfig {
            template_path: Some(template),
        });
        renderer.render(&ctx(&session)).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(session.join("index.html")).unwrap(),
            "<h1>2024-03-15</h1><img src=\"20240315.png\">"
        );
    }

    #[tokio::test]
    async fn test_missing_template_fails() {
        let temp = TempDir::new().unwrap();
        let renderer = TemplateRenderer::new(&ReportConfig {
            template_path: Some(temp.path().join("absent.html")),
        });
        let result = renderer.render(&ctx(temp.path())).await;
        assert!(matches!(result, Err(RenderError::TemplateUnreadable { .. })));
    }
}
