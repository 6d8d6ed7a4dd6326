//! Intake pipeline orchestration.
//!
//! One upload flows through here: format dispatch, extraction, masking,
//! the two model calls, findings normalization. Everything runs
//! sequentially within the request; the only parallelism in the system
//! is between requests.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::extract::{extractor_for, FileKind};
use crate::findings;
use crate::llm::{LlmError, Summarizer};
use crate::redact::DOCUMENT_RULES;
use crate::utils::file_extension;

/// Framing for masked spreadsheet content ahead of the description call.
const SPREADSHEET_PREAMBLE: &str = "Analyze the following cleansed spreadsheet data (Excel file). Generate a descriptive title and a file caption of about 30 words summarizing the data's content, focusing on the security/IT context (e.g. firewall rules, user access logs, token issuance).\n\nCleansed spreadsheet content:\n---\n";

/// Framing for masked presentation content.
const SLIDES_PREAMBLE: &str = "Analyze the following cleansed presentation content (PPT/PPTX file). Generate a descriptive title and a file caption of about 30 words summarizing the presentation's content, focusing on the security/IT context.\n\nCleansed presentation content:\n---\n";

/// Framing for masked PDF content.
const PDF_PREAMBLE: &str = "Analyze the following extracted PDF text. Generate a descriptive title and a file caption of about 30 words summarizing the document's content, focusing on the security/IT context.\n\nExtracted PDF content:\n---\n";

/// Errors surfaced by the intake pipeline.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("file type not allowed: {0}")]
    UnsupportedType(String),

    #[error("failed to process file: no text could be extracted")]
    ExtractionFailed,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntakeError {
    /// Whether the error is the caller's fault rather than ours.
    pub fn is_input_error(&self) -> bool {
        matches!(self, IntakeError::UnsupportedType(_))
    }
}

/// The structured unit returned for one processed upload.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub filename: String,
    pub file_type: &'static str,
    pub file_description: String,
    pub key_findings: Vec<String>,
}

/// Orchestrates one upload end to end.
pub struct IntakeService {
    summarizer: Arc<dyn Summarizer>,
}

impl IntakeService {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    /// Process a staged upload.
    ///
    /// Dispatch is by extension; an unsupported extension is rejected
    /// here, before any extraction or model call.
    pub async fn process(&self, path: &Path, filename: &str) -> Result<ProcessedFile, IntakeError> {
        let ext = file_extension(filename)
            .ok_or_else(|| IntakeError::UnsupportedType(filename.to_string()))?;
        let kind = FileKind::from_extension(&ext)
            .ok_or_else(|| IntakeError::UnsupportedType(format!(".{}", ext)))?;

        tracing::info!("processing {} as {}", filename, kind.display_name());

        let description = if kind == FileKind::Image {
            let bytes = std::fs::read(path)?;
            self.summarizer.describe_image(&bytes).await?
        } else {
            let text = self.extract_text(kind, path)?;
            if text.trim().is_empty() {
                return Err(IntakeError::ExtractionFailed);
            }

            // Spreadsheet and slide extractors mask during extraction;
            // the PDF blob is masked here, in one pass over the combined
            // structural and OCR text.
            let masked = match kind {
                FileKind::Pdf => DOCUMENT_RULES.mask(&text),
                _ => text,
            };

            self.summarizer.describe(&frame_content(kind, &masked)).await?
        };

        let file_description = if description.trim().is_empty() {
            findings::NO_DESCRIPTION.to_string()
        } else {
            description.trim().to_string()
        };

        let raw_findings = self.summarizer.summarize_findings(&file_description).await?;
        let key_findings = findings::normalize(&raw_findings);

        Ok(ProcessedFile {
            filename: filename.to_string(),
            file_type: kind.display_name(),
            file_description,
            key_findings,
        })
    }

    fn extract_text(&self, kind: FileKind, path: &Path) -> Result<String, IntakeError> {
        let Some(extractor) = extractor_for(kind) else {
            return Err(IntakeError::ExtractionFailed);
        };
        match extractor.extract(path) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::error!("extraction failed for {}: {}", path.display(), e);
                Err(IntakeError::ExtractionFailed)
            }
        }
    }
}

fn frame_content(kind: FileKind, masked: &str) -> String {
    let preamble = match kind {
        FileKind::Spreadsheet => SPREADSHEET_PREAMBLE,
        FileKind::Slides => SLIDES_PREAMBLE,
        _ => PDF_PREAMBLE,
    };
    format!("{}{}", preamble, masked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CannedSummarizer;

    fn canned(description: &str, findings: &str) -> IntakeService {
        IntakeService::new(Arc::new(CannedSummarizer {
            description: description.to_string(),
            findings: findings.to_string(),
        }))
    }

    #[tokio::test]
    async fn unsupported_extension_rejected_before_extraction() {
        let service = canned("unused", "unused");
        // The path does not exist: reaching extraction or the model
        // would fail differently than UnsupportedType.
        let err = service
            .process(Path::new("/nonexistent/notes.docx"), "notes.docx")
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn missing_extension_rejected() {
        let service = canned("unused", "unused");
        let err = service
            .process(Path::new("/nonexistent/noext"), "noext")
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn image_path_returns_description_and_findings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("badge.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nstub").unwrap();

        let service = canned(
            "Access Card Reader\n\nA reader mounted beside a door.",
            "- Digital access control\n- Depends on card validity\n",
        );
        let result = service.process(&path, "badge.png").await.unwrap();

        assert_eq!(result.filename, "badge.png");
        assert_eq!(result.file_type, "Image");
        assert!(result.file_description.starts_with("Access Card Reader"));
        assert_eq!(
            result.key_findings,
            vec!["- Digital access control", "- Depends on card validity"]
        );
    }

    #[tokio::test]
    async fn empty_model_output_gets_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.jpg");
        std::fs::write(&path, b"\xff\xd8\xff\xe0stub").unwrap();

        let service = canned("", "");
        let result = service.process(&path, "blank.jpg").await.unwrap();

        assert_eq!(result.file_description, findings::NO_DESCRIPTION);
        assert_eq!(
            result.key_findings,
            vec![format!("- {}", findings::NO_FINDINGS)]
        );
    }

    #[test]
    fn preambles_match_format() {
        assert!(frame_content(FileKind::Spreadsheet, "x").contains("spreadsheet"));
        assert!(frame_content(FileKind::Slides, "x").contains("presentation"));
        assert!(frame_content(FileKind::Pdf, "x").contains("PDF"));
        assert!(frame_content(FileKind::Pdf, "x").ends_with('x'));
    }
}
