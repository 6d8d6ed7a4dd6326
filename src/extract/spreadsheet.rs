//! Spreadsheet extraction.
//!
//! Every cell is read as text and masked with the tabular rules before
//! serialization, so no raw field value survives into the blob. Cells
//! are tab-joined within a row, rows newline-joined, and the header row
//! stays in place. `calamine` handles both the zip-based and the legacy
//! binary workbook formats, so there is no OCR stage here.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::{DocumentExtractor, ExtractError};
use crate::redact::TABULAR_RULES;

pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpreadsheetExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        other => other.to_string(),
    }
}

/// Serialize masked rows: cells tab-joined, rows newline-joined.
fn render_rows(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl DocumentExtractor for SpreadsheetExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| ExtractError::StageFailed(format!("failed to open workbook: {}", e)))?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names().to_vec() {
            let range = match workbook.worksheet_range(&sheet_name) {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!("skipping sheet {}: {}", sheet_name, e);
                    continue;
                }
            };

            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|cell| TABULAR_RULES.mask(&cell_text(cell)))
                        .collect::<Vec<String>>()
                })
                .filter(|cells| cells.iter().any(|c| !c.is_empty()))
                .collect();

            if !rows.is_empty() {
                sheets.push(format!("Sheet: {}\n{}", sheet_name, render_rows(&rows)));
            }
        }

        Ok(sheets.join("\n\n"))
    }
}
