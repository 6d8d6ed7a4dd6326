//! Format extractors.
//!
//! Each supported document format gets one extractor implementing
//! [`DocumentExtractor`]; the orchestrator picks one through
//! [`extractor_for`] rather than branching on format inline. Extractors
//! run a structural pass first and an OCR pass second; the passes are
//! additive and either may fail alone. A failed stage is logged and
//! contributes no text — only an entirely empty result is reported as a
//! failure, by the caller.

mod pdf;
mod slides;
mod spreadsheet;

pub use pdf::PdfExtractor;
pub use slides::SlideDeckExtractor;
pub use spreadsheet::SpreadsheetExtractor;

use std::path::Path;

use thiserror::Error;

/// Errors from a single extraction stage.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Tool(#[from] crate::ocr::ToolError),

    #[error("{0}")]
    StageFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document format, derived from the upload's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Spreadsheet,
    Slides,
    Pdf,
    Image,
}

impl FileKind {
    /// Extensions the intake accepts.
    pub const ALLOWED_EXTENSIONS: &'static [&'static str] =
        &["pdf", "ppt", "pptx", "xls", "xlsx", "jpg", "png"];

    /// Map a lowercase file extension to its format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "ppt" | "pptx" => Some(Self::Slides),
            "xls" | "xlsx" => Some(Self::Spreadsheet),
            "jpg" | "png" => Some(Self::Image),
            _ => None,
        }
    }

    /// Display name reported in intake results.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "Excel",
            Self::Slides => "PPT",
            Self::Pdf => "PDF",
            Self::Image => "Image",
        }
    }
}

/// One format's extraction capability: file in, flat text blob out.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Dispatch from format to extractor.
///
/// Images have no extractor; their bytes go to the vision model
/// directly.
pub fn extractor_for(kind: FileKind) -> Option<Box<dyn DocumentExtractor>> {
    match kind {
        FileKind::Spreadsheet => Some(Box::new(SpreadsheetExtractor::new())),
        FileKind::Slides => Some(Box::new(SlideDeckExtractor::new())),
        FileKind::Pdf => Some(Box::new(PdfExtractor::new())),
        FileKind::Image => None,
    }
}
