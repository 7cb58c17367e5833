//! External document converters: PDF to DOCX and DOCX to PDF.

mod libreoffice;
mod pdf2docx;

pub use libreoffice::LibreOfficeRenderer;
pub use pdf2docx::Pdf2DocxCommand;

use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::error::Result;
use crate::page_range::ZeroBasedRange;

/// Turns a PDF into an editable Word document
#[async_trait]
pub trait PdfConverter: Send + Sync {
    /// Convert `pdf` into `docx`, limited to `pages` (0-based).
    async fn convert(
        &self,
        pdf: &Path,
        docx: &Path,
        pages: ZeroBasedRange,
        multi_processing: bool,
    ) -> Result<()>;
}

/// Lays a Word document out as PDF
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, docx: &Path, pdf: &Path) -> Result<()>;
}

/// Why a child process produced no usable output
#[derive(Debug)]
enum RunFailure {
    Spawn(std::io::Error),
    Timeout,
}

/// Run a command to completion, capturing its output.
///
/// The child is killed if the deadline passes.
async fn run_command(mut cmd: Command, timeout: Duration) -> std::result::Result<Output, RunFailure> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(RunFailure::Spawn(e)),
        Err(_) => Err(RunFailure::Timeout),
    }
}

/// Last lines of a process's stderr (falling back to stdout) for error messages.
fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if stderr.trim().is_empty() { stdout } else { stderr };

    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let tail = lines[lines.len().saturating_sub(5)..].join("\n");
    if tail.is_empty() {
        format!("exited with {}", output.status)
    } else {
        format!("exited with {}: {}", output.status, tail)
    }
}

/// Require `path` to exist and be non-empty.
async fn check_output_file(path: &Path) -> std::io::Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.len() > 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
