//! Excel (XLSX) extraction: one sheet per worksheet, first row as header.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use super::ExtractError;
use crate::documents::content::{ExtractedContent, Sheet};

pub fn extract_xlsx(bytes: &[u8]) -> Result<ExtractedContent, ExtractError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let mut rows = range.rows().map(row_text).filter(|row| !row.is_empty());
        let header = rows.next().unwrap_or_default();
        let sheet = Sheet::new(Some(name), header, rows.collect());
        tracing::debug!(
            sheet = sheet.name.as_deref().unwrap_or("-"),
            rows = sheet.data_row_count(),
            "Read worksheet"
        );
        sheets.push(sheet);
    }

    Ok(ExtractedContent::workbook(sheets))
}

/// Cells as text with trailing empty cells dropped; empty when the row is blank
fn row_text(row: &[Data]) -> Vec<String> {
    let mut cells: Vec<String> = row.iter().map(cell_text).collect();
    while cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        other => other.to_string(),
    }
}
