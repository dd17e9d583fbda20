//! Delimited text (CSV, TSV): one unnamed sheet, first record as header.

use super::ExtractError;
use crate::documents::content::ExtractedContent;

pub fn extract_delimited(bytes: &[u8], delimiter: u8) -> Result<ExtractedContent, ExtractError> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut records = Vec::new();
    for (row_num, result) in reader.byte_records().enumerate() {
        let record = result.map_err(|e| {
            tracing::warn!(row = row_num + 1, error = %e, "Failed to read delimited record");
            ExtractError::Csv(e)
        })?;
        let cells: Vec<String> = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).trim().to_string())
            .collect();
        if cells.iter().any(|c| !c.is_empty()) {
            records.push(cells);
        }
    }

    let mut records = records.into_iter();
    let header = records.next().unwrap_or_default();
    Ok(ExtractedContent::delimited(header, records.collect()))
}
