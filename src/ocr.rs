//! External tool layer for OCR and rasterization.
//!
//! The extractors drive command-line tools rather than in-process
//! libraries: `pdftotext` and `pdftoppm` from poppler, `tesseract` for
//! OCR, and `soffice` (LibreOffice) for rendering slide decks to PDF.
//! Every wrapper distinguishes "tool missing" from "tool failed" so the
//! extractors can degrade instead of aborting.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from external extraction tools.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("external tool not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle command output, extracting stdout on success.
fn capture_stdout(
    result: std::io::Result<std::process::Output>,
    tool: &str,
) -> Result<String, ToolError> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ToolError::Failed(format!("{} failed: {}", tool, stderr.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ToolError::NotFound(tool.to_string()))
        }
        Err(e) => Err(ToolError::Io(e)),
    }
}

/// Check command status, mapping failure to the right error.
fn check_status(
    result: std::io::Result<std::process::ExitStatus>,
    tool: &str,
) -> Result<(), ToolError> {
    match result {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => Err(ToolError::Failed(format!("{} exited with failure", tool))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ToolError::NotFound(tool.to_string()))
        }
        Err(e) => Err(ToolError::Io(e)),
    }
}

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Extract the selectable text layer of a PDF.
pub fn pdf_text_layer(pdf: &Path) -> Result<String, ToolError> {
    let output = Command::new("pdftotext")
        .args(["-layout", "-enc", "UTF-8"])
        .arg(pdf)
        .arg("-") // stdout
        .output();

    capture_stdout(output, "pdftotext (install poppler-utils)")
}

/// Rasterize every page of a PDF to PNG images in `out_dir`.
///
/// Returns the generated image paths in page order.
pub fn rasterize_pdf(pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, ToolError> {
    let status = Command::new("pdftoppm")
        .args(["-png", "-r", "300"])
        .arg(pdf)
        .arg(out_dir.join("page"))
        .status();

    check_status(status, "pdftoppm (install poppler-utils)")?;

    let mut images: Vec<PathBuf> = std::fs::read_dir(out_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
        .collect();
    images.sort();

    if images.is_empty() {
        return Err(ToolError::Failed("no images generated from PDF".to_string()));
    }
    Ok(images)
}

/// Run Tesseract OCR on an image.
pub fn ocr_image(image: &Path, lang: &str) -> Result<String, ToolError> {
    let output = Command::new("tesseract")
        .arg(image)
        .arg("stdout")
        .args(["-l", lang])
        .output();

    capture_stdout(output, "tesseract (install tesseract-ocr)")
}

/// OCR every image in order, joining non-empty page text with newlines.
///
/// A page that fails to OCR contributes nothing; the rest still come
/// through.
pub fn ocr_images(images: &[PathBuf], lang: &str) -> String {
    let mut text = String::new();
    for (i, image) in images.iter().enumerate() {
        match ocr_image(image, lang) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(page_text.trim_end());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("OCR failed for page {}: {}", i + 1, e),
        }
    }
    text
}

/// Render an office document to PDF via LibreOffice.
///
/// Returns the path of the generated PDF inside `out_dir`. LibreOffice
/// is an optional dependency: callers treat [`ToolError::NotFound`] as
/// "no OCR pass available", not as a request failure.
pub fn render_to_pdf(input: &Path, out_dir: &Path) -> Result<PathBuf, ToolError> {
    let output = Command::new("soffice")
        .args(["--headless", "--convert-to", "pdf", "--outdir"])
        .arg(out_dir)
        .arg(input)
        .output();

    capture_stdout(output, "soffice (install libreoffice)")?;

    // soffice reports success even when conversion produced nothing.
    let Some(stem) = input.file_stem() else {
        return Err(ToolError::Failed("input has no file stem".to_string()));
    };
    let pdf = out_dir.join(Path::new(stem).with_extension("pdf"));
    if pdf.exists() {
        Ok(pdf)
    } else {
        Err(ToolError::Failed("soffice produced no PDF output".to_string()))
    }
}

/// Report availability of every external tool the extractors use.
pub fn check_tools() -> Vec<(&'static str, bool)> {
    ["pdftotext", "pdftoppm", "tesseract", "soffice"]
        .into_iter()
        .map(|tool| (tool, check_binary(tool)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_tools_reports_every_tool() {
        let tools = check_tools();
        let names: Vec<&str> = tools.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["pdftotext", "pdftoppm", "tesseract", "soffice"]);
    }

    #[test]
    fn missing_binary_is_reported_as_not_found() {
        let err = ocr_image(Path::new("/nonexistent.png"), "eng");
        // Either tesseract is absent (NotFound) or it runs and fails on
        // the missing input; both are stage failures, never a panic.
        assert!(err.is_err());
    }
}
