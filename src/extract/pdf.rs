//! PDF extraction.
//!
//! The structural pass reads the selectable text layer with pdftotext;
//! the OCR pass rasterizes every page and runs Tesseract over each. Both
//! results are concatenated unmasked, structural text first — the
//! document rule set is applied once to the combined blob downstream,
//! where line context is still intact.

use std::path::Path;

use tempfile::TempDir;

use super::{DocumentExtractor, ExtractError};
use crate::ocr;

pub struct PdfExtractor {
    ocr_lang: String,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            ocr_lang: "eng".to_string(),
        }
    }

    fn extract_ocr(&self, path: &Path) -> Result<String, ExtractError> {
        let image_dir = TempDir::new()?;
        let images = ocr::rasterize_pdf(path, image_dir.path())?;
        Ok(ocr::ocr_images(&images, &self.ocr_lang))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let mut content = String::new();

        match ocr::pdf_text_layer(path) {
            Ok(text) if !text.trim().is_empty() => {
                content.push_str(text.trim_end());
                content.push('\n');
            }
            Ok(_) => tracing::debug!("no text layer in {}", path.display()),
            Err(e) => tracing::warn!("pdftotext failed: {}", e),
        }

        match self.extract_ocr(path) {
            Ok(text) if !text.trim().is_empty() => {
                if !content.is_empty() {
                    content.push('\n');
                }
                content.push_str(text.trim_end());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("PDF OCR pass failed: {}", e),
        }

        Ok(content.trim().to_string())
    }
}
