//! Slide-deck extraction.
//!
//! The structural pass walks the slide XML inside the pptx zip
//! container in slide order: text runs come out as masked lines, table
//! rows as tab-joined masked cells. The OCR pass renders the deck to
//! PDF with LibreOffice, rasterizes the pages, and OCRs each one; it
//! always runs when a renderer is available, because slides routinely
//! carry diagrams the XML pass cannot see, and its output is appended
//! after the structural text. Legacy .ppt files have no zip container,
//! so the OCR pass carries them alone.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use tempfile::TempDir;

use super::{DocumentExtractor, ExtractError};
use crate::ocr;
use crate::redact::mask_slide_text;

pub struct SlideDeckExtractor {
    ocr_lang: String,
}

impl SlideDeckExtractor {
    pub fn new() -> Self {
        Self {
            ocr_lang: "eng".to_string(),
        }
    }

    /// Structural pass: slide XML, in slide order.
    fn extract_structural(&self, path: &Path) -> Result<String, ExtractError> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ExtractError::StageFailed(format!("not a slide archive: {}", e)))?;

        let mut slide_names: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .map(|s| s.to_string())
            .collect();
        slide_names.sort_by_key(|name| {
            name.trim_start_matches("ppt/slides/slide")
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(0)
        });

        let mut text = String::new();
        for name in slide_names {
            let mut xml = String::new();
            match archive.by_name(&name) {
                Ok(mut entry) => {
                    if entry.read_to_string(&mut xml).is_err() {
                        continue;
                    }
                }
                Err(_) => continue,
            }

            let slide_text = slide_xml_to_text(&xml);
            if !slide_text.is_empty() {
                text.push_str(&slide_text);
                text.push('\n');
            }
        }
        Ok(text)
    }

    /// OCR pass: render the deck to PDF, rasterize, OCR each slide.
    fn extract_ocr(&self, path: &Path) -> Result<String, ExtractError> {
        let render_dir = TempDir::new()?;
        let pdf = ocr::render_to_pdf(path, render_dir.path())?;

        let image_dir = TempDir::new()?;
        let images = ocr::rasterize_pdf(&pdf, image_dir.path())?;
        Ok(ocr::ocr_images(&images, &self.ocr_lang))
    }
}

impl Default for SlideDeckExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for SlideDeckExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let mut content = String::new();

        match self.extract_structural(path) {
            Ok(text) if !text.trim().is_empty() => content.push_str(&text),
            Ok(_) => tracing::debug!("no structural text in {}", path.display()),
            Err(e) => tracing::warn!("structural slide extraction failed: {}", e),
        }

        match self.extract_ocr(path) {
            Ok(text) if !text.trim().is_empty() => {
                if !content.is_empty() {
                    content.push('\n');
                }
                content.push_str(&mask_slide_text(&text));
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("slide OCR pass unavailable: {}", e),
        }

        Ok(content.trim().to_string())
    }
}

/// Convert one slide's XML into masked text.
///
/// Paragraphs (`<a:p>`) become masked lines; table cells (`<a:tc>`) are
/// masked individually and emitted as tab-joined rows, so a name split
/// across cells is never mistaken for a capitalized run.
fn slide_xml_to_text(xml: &str) -> String {
    let mut reader = XmlReader::from_str(xml);

    let mut out = String::new();
    let mut paragraph = String::new();
    let mut cell = String::new();
    let mut row: Vec<String> = Vec::new();
    let mut in_text = false;
    let mut in_cell = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tc" => {
                    in_cell = true;
                    cell.clear();
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    if let Ok(text) = e.unescape() {
                        if in_cell {
                            cell.push_str(&text);
                        } else {
                            paragraph.push_str(&text);
                        }
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if in_cell {
                        cell.push(' ');
                    } else {
                        let line = paragraph.trim();
                        if !line.is_empty() {
                            out.push_str(&mask_slide_text(line));
                            out.push('\n');
                        }
                        paragraph.clear();
                    }
                }
                b"tc" => {
                    row.push(mask_slide_text(cell.trim()));
                    in_cell = false;
                }
                b"tr" => {
                    if !row.is_empty() {
                        out.push_str(&row.join("\t"));
                        out.push('\n');
                        row.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    out.trim_end().to_string()
}
