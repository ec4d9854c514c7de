//! HTML proofs of synthesis output, written under the export directory and
//! served by the API at `/exports`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tokio::fs;
use tracing::info;
use trudy_core::{escape_html, markdown_to_html};
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};

/// URL prefix the export directory is mounted under.
pub const EXPORT_URL_PREFIX: &str = "/exports";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofFile {
    /// Path relative to the export directory, `/`-separated.
    pub proof_path: String,
    pub proof_url: String,
}

#[derive(Debug, Clone)]
pub struct ProofExporter {
    base_dir: PathBuf,
}

impl ProofExporter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub async fn write_synthesis(
        &self,
        campaign_id: Uuid,
        title: &str,
        markdown: &str,
    ) -> Result<ProofFile> {
        let dir = self.base_dir.join(campaign_id.to_string());
        fs::create_dir_all(&dir).await.map_err(|e| {
            OrchestratorError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create export directory {}: {}", dir.display(), e),
            ))
        })?;

        let file_name = format!("synthesis-{}.html", Utc::now().timestamp_millis());
        let path = dir.join(&file_name);
        let temp_path = path.with_extension("html.tmp");

        fs::write(&temp_path, render_page(title, markdown)).await?;
        fs::rename(&temp_path, &path).await?;

        let proof_path = format!("{campaign_id}/{file_name}");
        info!(%campaign_id, path = %path.display(), "Synthesis proof written");

        Ok(ProofFile {
            proof_url: format!("{EXPORT_URL_PREFIX}/{proof_path}"),
            proof_path,
        })
    }
}

fn render_page(title: &str, markdown: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8" />
<title>{title}</title>
<style>body{{font-family:system-ui,sans-serif;max-width:48rem;margin:2rem auto;line-height:1.5}}</style>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        body = markdown_to_html(markdown)
    )
}
