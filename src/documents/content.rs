//! Extracted document content
//!
//! What a Structural Extractor hands to the sampler: ordered text units for
//! paginated and flat documents, or sheets of rows for tabular ones.

use serde::{Deserialize, Serialize};

/// Separator between linear units (pages)
pub const UNIT_SEPARATOR: &str = "\n\n";
/// Separator between cells in a rendered row
pub const CELL_SEPARATOR: &str = ",";
/// Separator between rendered rows
pub const ROW_SEPARATOR: &str = "\n";
/// Separator between rendered sheets
pub const SHEET_SEPARATOR: &str = "\n\n";

/// Structural shape of a document, one per extractor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentShape {
    /// Pages with natural boundaries (PDF)
    Paginated,
    /// One continuous body of text (word processor, plain text)
    Flat,
    /// Workbooks with one or more sheets
    Tabular,
    /// Delimited text, a single implicit sheet
    Delimited,
}

impl DocumentShape {
    /// Name of the unit counted in summaries
    pub fn unit_name(&self) -> &'static str {
        match self {
            DocumentShape::Paginated => "pages",
            DocumentShape::Flat => "characters",
            DocumentShape::Tabular | DocumentShape::Delimited => "rows",
        }
    }
}

/// One page, or the whole body of a flat document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    /// 1-based ordinal
    pub ordinal: u32,
    pub text: String,
}

/// One table: a header and its data rows, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    /// Worksheet name, absent for delimited text
    pub name: Option<String>,
    /// Field names; may be empty
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: Option<String>, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { name, header, rows }
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len()
    }

    /// Heading line emitted before the header of a named sheet
    pub fn heading(&self) -> Option<String> {
        self.name.as_ref().map(|n| format!("Sheet: {}", n))
    }

    pub fn header_line(&self) -> Option<String> {
        if self.header.is_empty() {
            None
        } else {
            Some(render_row(&self.header))
        }
    }

    /// Heading and header lines, the part of a sheet that is never sampled away
    pub fn preamble(&self) -> Vec<String> {
        self.heading().into_iter().chain(self.header_line()).collect()
    }

    /// Full rendering: heading, header, every data row
    pub fn render(&self) -> String {
        let mut lines = self.preamble();
        lines.extend(self.rows.iter().map(|r| render_row(r)));
        lines.join(ROW_SEPARATOR)
    }
}

/// Cells joined into one line
pub fn render_row(cells: &[String]) -> String {
    cells.join(CELL_SEPARATOR)
}

/// Length in characters, the unit every budget is measured in
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Output of a Structural Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ExtractedContent {
    Linear { shape: DocumentShape, units: Vec<Unit> },
    Tabular { shape: DocumentShape, sheets: Vec<Sheet> },
}

impl ExtractedContent {
    /// Paginated content from page texts, numbered from 1
    pub fn paginated<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let units = pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| Unit {
                ordinal: (i + 1) as u32,
                text: text.into(),
            })
            .collect();
        ExtractedContent::Linear {
            shape: DocumentShape::Paginated,
            units,
        }
    }

    /// Flat content: the whole document as a single unit
    pub fn flat(text: impl Into<String>) -> Self {
        ExtractedContent::Linear {
            shape: DocumentShape::Flat,
            units: vec![Unit {
                ordinal: 1,
                text: text.into(),
            }],
        }
    }

    pub fn workbook(sheets: Vec<Sheet>) -> Self {
        ExtractedContent::Tabular {
            shape: DocumentShape::Tabular,
            sheets,
        }
    }

    /// Delimited text: one unnamed sheet
    pub fn delimited(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        ExtractedContent::Tabular {
            shape: DocumentShape::Delimited,
            sheets: vec![Sheet::new(None, header, rows)],
        }
    }

    pub fn shape(&self) -> DocumentShape {
        match self {
            ExtractedContent::Linear { shape, .. } | ExtractedContent::Tabular { shape, .. } => *shape,
        }
    }

    /// Pages, flat bodies or data rows
    pub fn unit_count(&self) -> usize {
        match self {
            ExtractedContent::Linear { units, .. } => units.len(),
            ExtractedContent::Tabular { sheets, .. } => sheets.iter().map(|s| s.data_row_count()).sum(),
        }
    }

    /// Untruncated rendering: what the model would see with no budget
    pub fn render(&self) -> String {
        match self {
            ExtractedContent::Linear { units, .. } => units
                .iter()
                .map(|u| u.text.as_str())
                .collect::<Vec<_>>()
                .join(UNIT_SEPARATOR),
            ExtractedContent::Tabular { sheets, .. } => sheets
                .iter()
                .map(|s| s.render())
                .collect::<Vec<_>>()
                .join(SHEET_SEPARATOR),
        }
    }

    /// True when there is no text at all to show
    pub fn is_empty(&self) -> bool {
        match self {
            ExtractedContent::Linear { units, .. } => units.iter().all(|u| u.text.trim().is_empty()),
            ExtractedContent::Tabular { sheets, .. } => sheets
                .iter()
                .all(|s| s.header.is_empty() && s.rows.is_empty()),
        }
    }
}
