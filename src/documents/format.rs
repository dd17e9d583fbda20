//! Upload format detection
//!
//! Maps an uploaded file to one of the supported formats, and each format to
//! the structural shape its extractor produces.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::content::DocumentShape;

/// Leading bytes of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Xlsx,
    Csv,
    Tsv,
    Text,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "xlsx" | "xlsm" => Some(DocumentFormat::Xlsx),
            "csv" => Some(DocumentFormat::Csv),
            "tsv" | "tab" => Some(DocumentFormat::Tsv),
            "txt" | "text" | "md" | "markdown" | "log" => Some(DocumentFormat::Text),
            _ => None,
        }
    }

    /// Detect from the file name, falling back to magic bytes
    pub fn detect(filename: &str, bytes: &[u8]) -> Option<Self> {
        let by_extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension);

        by_extension.or_else(|| {
            if bytes.starts_with(PDF_MAGIC) {
                Some(DocumentFormat::Pdf)
            } else {
                None
            }
        })
    }

    pub fn shape(&self) -> DocumentShape {
        match self {
            DocumentFormat::Pdf => DocumentShape::Paginated,
            DocumentFormat::Docx | DocumentFormat::Text => DocumentShape::Flat,
            DocumentFormat::Xlsx => DocumentShape::Tabular,
            DocumentFormat::Csv | DocumentFormat::Tsv => DocumentShape::Delimited,
        }
    }

    /// Name shown to the model in the composed prompt
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "Word",
            DocumentFormat::Xlsx => "Excel",
            DocumentFormat::Csv => "CSV",
            DocumentFormat::Tsv => "TSV",
            DocumentFormat::Text => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(DocumentFormat::detect("report.PDF", b""), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::detect("q1.xlsx", b""), Some(DocumentFormat::Xlsx));
        assert_eq!(DocumentFormat::detect("notes.md", b""), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::detect("data.tsv", b""), Some(DocumentFormat::Tsv));
    }

    #[test]
    fn test_detect_pdf_by_magic() {
        assert_eq!(DocumentFormat::detect("upload", b"%PDF-1.7\n..."), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::detect("upload.bin", b"\x00\x01"), None);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(DocumentFormat::Pdf.shape(), DocumentShape::Paginated);
        assert_eq!(DocumentFormat::Docx.shape(), DocumentShape::Flat);
        assert_eq!(DocumentFormat::Xlsx.shape(), DocumentShape::Tabular);
        assert_eq!(DocumentFormat::Csv.shape(), DocumentShape::Delimited);
    }
}
