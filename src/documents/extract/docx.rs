//! Word (DOCX) extraction: the body text of `word/document.xml` as one flat unit.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;
use crate::documents::content::ExtractedContent;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_docx(bytes: &[u8]) -> Result<ExtractedContent, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| ExtractError::MissingPart(DOCUMENT_PART.to_string()))?;

    let paragraphs = paragraphs(&xml)?;
    tracing::debug!(paragraphs = paragraphs.len(), "DOCX text extraction complete");
    Ok(ExtractedContent::flat(paragraphs.join("\n\n")))
}

/// Read an archive member as UTF-8, `None` when absent
fn read_part(archive: &mut zip::ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Option<String>, ExtractError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| ExtractError::Malformed(format!("{name}: {e}")))?;
    Ok(Some(xml))
}

fn malformed(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::Malformed(format!("{DOCUMENT_PART}: {e}"))
}

/// Non-empty paragraphs in document order. Tabs and line breaks inside a
/// paragraph are kept.
fn paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => in_run = true,
                b"t" => in_text = true,
                // Tab stops in paragraph properties are not text
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => current.push_str(&e.unescape().map_err(malformed)?),
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => {
                    let paragraph = current.trim_end();
                    if !paragraph.trim().is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        paragraphs.push(current.trim_end().to_string());
    }
    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx_with(document_xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            zip.start_file(DOCUMENT_PART, options).unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_extract_paragraphs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Quarterly </w:t></w:r><w:r><w:t xml:space="preserve">report &amp; notes</w:t></w:r></w:p>
            <w:p></w:p>
            <w:p><w:r><w:t>Col A</w:t><w:tab/><w:t>Col B</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let content = extract_docx(&docx_with(xml)).unwrap();
        assert_eq!(content.render(), "Quarterly report & notes\n\nCol A\tCol B");
        assert_eq!(content.unit_count(), 1);
    }

    #[test]
    fn test_missing_document_part() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            zip.start_file("other.xml", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        let result = extract_docx(&buffer.into_inner());
        assert!(matches!(result, Err(ExtractError::MissingPart(_))));
    }

    #[test]
    fn test_line_breaks_and_entities() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
            <w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>a &lt; b</w:t><w:br/><w:t>c</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(paragraphs(xml).unwrap(), vec!["a < b\nc"]);
    }

    #[test]
    fn test_mismatched_tags_are_malformed() {
        let result = extract_docx(&docx_with("<w:document><w:body><w:p></w:body>"));
        assert!(matches!(result, Err(ExtractError::Malformed(_))));
    }
}
