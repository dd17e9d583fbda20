//! PDF extraction: one unit per page with text.

use std::io::Write;
use std::path::Path;

use pdf_oxide::PdfDocument;

use super::ExtractError;
use crate::documents::content::ExtractedContent;

/// `pdf_oxide` opens from a path, so the bytes go through a temp file.
#[tracing::instrument(skip(bytes), fields(bytes = bytes.len()))]
pub fn extract_pdf(bytes: &[u8]) -> Result<ExtractedContent, ExtractError> {
    let mut temp_file = tempfile::NamedTempFile::new()?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;

    let pages = extract_pages(temp_file.path())?;
    tracing::info!(page_count = pages.len(), "PDF text extraction complete");

    Ok(ExtractedContent::paginated(pages))
}

/// Blank pages are skipped, so page ordinals stay contiguous. An unreadable
/// page fails the whole document.
fn extract_pages(path: &Path) -> Result<Vec<String>, ExtractError> {
    let mut doc = PdfDocument::open(path)
        .map_err(|e| ExtractError::Pdf(format!("failed to parse PDF: {e}")))?;

    let page_count = doc
        .page_count()
        .map_err(|e| ExtractError::Pdf(format!("failed to read page count: {e}")))?;

    let mut pages = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        let text = doc
            .extract_text(page_index)
            .map_err(|e| ExtractError::Pdf(format!("page {}: {e}", page_index + 1)))?;
        if text.trim().is_empty() {
            tracing::debug!(page_index, "Skipping blank PDF page");
            continue;
        }
        pages.push(normalize_page(&text));
    }

    Ok(pages)
}

/// Trim trailing whitespace per line and collapse runs of blank lines
fn normalize_page(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::content::{DocumentShape, Unit};

    /// Single-font PDF with one content stream per page
    fn minimal_pdf(pages: &[&str]) -> Vec<u8> {
        let n = pages.len();
        let font_id = 3 + 2 * n;
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                (0..n).map(|i| format!("{} 0 R", 3 + i)).collect::<Vec<_>>().join(" "),
                n
            ),
        ];
        for i in 0..n {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
                font_id,
                3 + n + i
            ));
        }
        for text in pages {
            let stream = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text)
            };
            objects.push(format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        out
    }

    fn page_units(content: &ExtractedContent) -> &[Unit] {
        match content {
            ExtractedContent::Linear { units, .. } => units,
            _ => panic!("Expected paginated content"),
        }
    }

    #[test]
    fn test_extract_pages_in_order() {
        let bytes = minimal_pdf(&["Alpha page", "Bravo page", "Charlie page"]);
        let content = extract_pdf(&bytes).unwrap();
        assert_eq!(content.shape(), DocumentShape::Paginated);
        assert_eq!(content.unit_count(), 3);

        let units = page_units(&content);
        assert!(units[0].text.contains("Alpha"));
        assert!(units[1].text.contains("Bravo"));
        assert!(units[2].text.contains("Charlie"));
        assert_eq!(units.iter().map(|u| u.ordinal).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_blank_page_keeps_ordinals_contiguous() {
        let bytes = minimal_pdf(&["Alpha page", "", "Charlie page"]);
        let content = extract_pdf(&bytes).unwrap();
        let units = page_units(&content);
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].ordinal, 2);
        assert!(units[1].text.contains("Charlie"));
    }

    #[test]
    fn test_not_a_pdf() {
        let result = extract_pdf(b"plain text, not a PDF");
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }

    #[test]
    fn test_normalize_page() {
        let text = "Title   \n\n\n\nBody line\t\n\n";
        assert_eq!(normalize_page(text), "Title\n\nBody line");
    }
}
