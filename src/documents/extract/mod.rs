//! Structural Extractors
//!
//! Turn raw upload bytes into `ExtractedContent`. One extractor per format
//! family, dispatched once by `DocumentFormat`.

pub mod delimited;
pub mod docx;
pub mod pdf;
pub mod xlsx;

use serde::Serialize;
use thiserror::Error;

use super::content::ExtractedContent;
use super::format::DocumentFormat;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing document part: {0}")]
    MissingPart(String),
    #[error("Malformed document: {0}")]
    Malformed(String),
}

impl Serialize for ExtractError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Extract the full content of a document. Never returns partial content.
pub fn extract(format: DocumentFormat, bytes: &[u8]) -> Result<ExtractedContent, ExtractError> {
    let content = match format {
        DocumentFormat::Pdf => pdf::extract_pdf(bytes)?,
        DocumentFormat::Docx => docx::extract_docx(bytes)?,
        DocumentFormat::Xlsx => xlsx::extract_xlsx(bytes)?,
        DocumentFormat::Csv => delimited::extract_delimited(bytes, b',')?,
        DocumentFormat::Tsv => delimited::extract_delimited(bytes, b'\t')?,
        DocumentFormat::Text => extract_text(bytes),
    };

    tracing::debug!(
        format = ?format,
        units = content.unit_count(),
        "Extracted document"
    );
    Ok(content)
}

/// Plain text and markdown: one flat unit, invalid UTF-8 replaced
fn extract_text(bytes: &[u8]) -> ExtractedContent {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    ExtractedContent::flat(text.replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::content::DocumentShape;

    #[test]
    fn test_plain_text_is_one_flat_unit() {
        let content = extract(DocumentFormat::Text, b"\xef\xbb\xbfline one\r\nline two").unwrap();
        assert_eq!(content.shape(), DocumentShape::Flat);
        assert_eq!(content.unit_count(), 1);
        assert_eq!(content.render(), "line one\nline two");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let content = extract(DocumentFormat::Text, b"ok \xff done").unwrap();
        assert_eq!(content.render(), "ok \u{fffd} done");
    }

    #[test]
    fn test_dispatch_by_format() {
        let content = extract(DocumentFormat::Tsv, b"a\tb\n1\t2\n").unwrap();
        assert_eq!(content.shape(), DocumentShape::Delimited);
        assert_eq!(content.render(), "a,b\n1,2");
    }

    #[test]
    fn test_corrupt_archive_fails() {
        let result = extract(DocumentFormat::Docx, b"not a zip file");
        assert!(matches!(result, Err(ExtractError::Archive(_))));
    }
}
