use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use super::{DocumentRenderer, RunFailure, check_output_file, failure_message, run_command};
use crate::config::RendererConfig;
use crate::error::{Error, Result};

/// Renders DOCX to PDF with a headless LibreOffice
#[derive(Debug, Clone)]
pub struct LibreOfficeRenderer {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl LibreOfficeRenderer {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        Self::new(
            config.program.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// `profile` is a private user installation so concurrent renders do not
    /// fight over the default LibreOffice profile lock.
    fn arguments(docx: &Path, out_dir: &Path, profile: &Path) -> Vec<OsString> {
        vec![
            format!("-env:UserInstallation=file://{}", profile.display()).into(),
            "--headless".into(),
            "--convert-to".into(),
            "pdf".into(),
            "--outdir".into(),
            out_dir.as_os_str().to_owned(),
            docx.as_os_str().to_owned(),
        ]
    }
}

impl Default for LibreOfficeRenderer {
    fn default() -> Self {
        Self::from_config(&RendererConfig::default())
    }
}

#[async_trait]
impl DocumentRenderer for LibreOfficeRenderer {
    async fn render(&self, docx: &Path, pdf: &Path) -> Result<()> {
        let out_dir = tempfile::tempdir()?;
        let profile = tempfile::tempdir()?;
        let args = Self::arguments(docx, out_dir.path(), profile.path());
        info!("Rendering {} to PDF", docx.display());

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);

        let output = run_command(cmd, self.timeout)
            .await
            .map_err(|failure| match failure {
                RunFailure::Spawn(e) => Error::RendererUnavailable {
                    program: self.program.display().to_string(),
                    reason: e.to_string(),
                },
                RunFailure::Timeout => Error::RenderTimeout(self.timeout.as_secs()),
            })?;

        if !output.status.success() {
            return Err(Error::Render(failure_message(&output)));
        }

        let stem = docx
            .file_stem()
            .ok_or_else(|| Error::Render(format!("{} has no file name", docx.display())))?;
        let mut file_name = stem.to_os_string();
        file_name.push(".pdf");
        let produced = out_dir.path().join(file_name);
        if !check_output_file(&produced).await? {
            return Err(Error::Render(format!(
                "renderer produced no output for {}",
                docx.display()
            )));
        }

        // the temp dir may be on another file system
        tokio::fs::copy(&produced, pdf).await?;
        debug!("Rendered PDF written to {}", pdf.display());
        Ok(())
    }
}
