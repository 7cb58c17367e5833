use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use super::{PdfConverter, RunFailure, check_output_file, failure_message, run_command};
use crate::config::ConverterConfig;
use crate::error::{Error, Result};
use crate::page_range::ZeroBasedRange;

/// Runs the `pdf2docx` command line tool
#[derive(Debug, Clone)]
pub struct Pdf2DocxCommand {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Pdf2DocxCommand {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(
            config.program.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn arguments(
        pdf: &Path,
        docx: &Path,
        pages: ZeroBasedRange,
        multi_processing: bool,
    ) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("convert"),
            pdf.as_os_str().to_owned(),
            docx.as_os_str().to_owned(),
        ];
        if let Some(start) = pages.start {
            args.push(format!("--start={start}").into());
        }
        if let Some(end) = pages.end {
            args.push(format!("--end={end}").into());
        }
        if multi_processing {
            args.push("--multi_processing=True".into());
        }
        args
    }
}

impl Default for Pdf2DocxCommand {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

#[async_trait]
impl PdfConverter for Pdf2DocxCommand {
    async fn convert(
        &self,
        pdf: &Path,
        docx: &Path,
        pages: ZeroBasedRange,
        multi_processing: bool,
    ) -> Result<()> {
        let args = Self::arguments(pdf, docx, pages, multi_processing);
        info!(
            "Converting {} to DOCX (start={:?}, end={:?}, multi_processing={})",
            pdf.display(),
            pages.start,
            pages.end,
            multi_processing
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);

        let output = run_command(cmd, self.timeout)
            .await
            .map_err(|failure| match failure {
                RunFailure::Spawn(e) => Error::ConverterUnavailable {
                    program: self.program.display().to_string(),
                    reason: e.to_string(),
                },
                RunFailure::Timeout => Error::ConversionTimeout(self.timeout.as_secs()),
            })?;

        if !output.status.success() {
            return Err(Error::Conversion(failure_message(&output)));
        }
        if !check_output_file(docx).await? {
            return Err(Error::Conversion(format!(
                "converter produced no output at {}",
                docx.display()
            )));
        }

        debug!("pdf2docx finished: {}", docx.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pages: ZeroBasedRange, multi: bool) -> Vec<String> {
        Pdf2DocxCommand::arguments(Path::new("in.pdf"), Path::new("out.docx"), pages, multi)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_arguments_whole_document() {
        assert_eq!(args(ZeroBasedRange::default(), false), ["convert", "in.pdf", "out.docx"]);
    }

    #[test]
    fn test_arguments_with_range_and_multiprocessing() {
        let pages = ZeroBasedRange {
            start: Some(2),
            end: Some(4),
        };
        assert_eq!(
            args(pages, true),
            [
                "convert",
                "in.pdf",
                "out.docx",
                "--start=2",
                "--end=4",
                "--multi_processing=True"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_program() {
        let converter = Pdf2DocxCommand::new("/nonexistent/pdf2docx", Duration::from_secs(5));
        let err = converter
            .convert(Path::new("a.pdf"), Path::new("a.docx"), ZeroBasedRange::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConverterUnavailable { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program() {
        let converter = Pdf2DocxCommand::new("false", Duration::from_secs(5));
        let err = converter
            .convert(Path::new("a.pdf"), Path::new("a.docx"), ZeroBasedRange::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }
}
