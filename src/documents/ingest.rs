//! Ingestion Orchestrator
//!
//! One uploaded file in, one composed prompt out: detect the format, run
//! its extractor, sample to the token budget, disclose any sampling and
//! wrap the result with the user's question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use ulid::Ulid;

use super::annotator::{detect_truncation, disclosure};
use super::content::DocumentShape;
use super::extract::{extract, ExtractError};
use super::format::DocumentFormat;
use super::sampler::{sample, SampleError, SampledResult};
use crate::config::Settings;
use crate::context::count_tokens;

/// Sent after the document when the user asked nothing
pub const DEFAULT_PROMPT: &str = "Please analyze this document and summarize its key contents.";

/// Document content when extraction found no text at all
pub const EMPTY_DOCUMENT_FALLBACK: &str = "[This document contains no extractable text.]";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(#[from] ExtractError),
    #[error("File too large: {0} bytes (max {1} bytes)")]
    FileTooLarge(u64, u64),
    #[error("Sampling failed: {0}")]
    Sampling(#[from] SampleError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Serialize for IngestError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl IngestError {
    /// Names the file's extension, or the whole name when it has none
    pub fn unsupported_format(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string());
        IngestError::UnsupportedFormat(extension)
    }

    /// Text safe to show the person who uploaded the file
    pub fn user_message(&self) -> String {
        match self {
            IngestError::UnsupportedFormat(_) => {
                "This file type is not supported. Upload a PDF, Word, Excel, CSV, TSV or text file.".to_string()
            }
            IngestError::FileTooLarge(_, max) => {
                format!("This file is too large. The limit is {} MB.", max / (1024 * 1024))
            }
            IngestError::ExtractionFailed(_) | IngestError::Io(_) => {
                "Could not process this file. It may be corrupt or password protected.".to_string()
            }
            IngestError::Sampling(_) => "Could not process this file.".to_string(),
        }
    }
}

/// Everything produced for one upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedDocument {
    pub upload_id: String,
    pub filename: String,
    pub format: DocumentFormat,
    pub shape: DocumentShape,
    pub sampled: SampledResult,
    /// Whether the sampling disclosure was added to the prompt
    pub sampling_disclosed: bool,
    /// The only text sent on to the model
    pub prompt: String,
    pub prompt_tokens: u32,
    pub processed_at: DateTime<Utc>,
}

pub struct Ingestor {
    settings: Settings,
}

impl Ingestor {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read and ingest a file from disk
    pub fn ingest_path(&self, path: &Path, question: Option<&str>) -> Result<IngestedDocument, IngestError> {
        let file_size = fs::metadata(path)?.len();
        self.check_size(file_size)?;

        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        self.ingest_bytes(&filename, &bytes, question)
    }

    /// Ingest an upload already in memory. All or nothing: on error no
    /// partial document is returned.
    #[tracing::instrument(skip(self, bytes, question), fields(size = bytes.len()))]
    pub fn ingest_bytes(
        &self,
        filename: &str,
        bytes: &[u8],
        question: Option<&str>,
    ) -> Result<IngestedDocument, IngestError> {
        self.check_size(bytes.len() as u64)?;

        let format = DocumentFormat::detect(filename, bytes)
            .ok_or_else(|| IngestError::unsupported_format(filename))?;

        let content = extract(format, bytes).map_err(|e| {
            tracing::warn!(filename, error = %e, "Extraction failed");
            IngestError::from(e)
        })?;

        let sampled = if content.is_empty() {
            tracing::info!(filename, "No extractable text, using fallback");
            SampledResult::full(EMPTY_DOCUMENT_FALLBACK.to_string(), 0)
        } else {
            sample(&content, self.settings.token_budget)?
        };

        // Text that fit whole is never disclosed, whatever brackets it carries
        let sampling_disclosed =
            sampled.was_truncated || (sampled.tier.is_sampled() && detect_truncation(&sampled.text));
        let question = question
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(self.settings.default_prompt.as_str());
        let prompt = compose_prompt(format, filename, &sampled.text, sampling_disclosed, question);
        let prompt_tokens = count_tokens(&prompt);

        let document = IngestedDocument {
            upload_id: Ulid::new().to_string(),
            filename: filename.to_string(),
            format,
            shape: content.shape(),
            sampled,
            sampling_disclosed,
            prompt,
            prompt_tokens,
            processed_at: Utc::now(),
        };

        tracing::info!(
            upload_id = %document.upload_id,
            filename,
            format = format.label(),
            tier = document.sampled.tier.display_name(),
            total_units = document.sampled.total_units,
            included_units = document.sampled.included_units,
            prompt_tokens,
            "Ingested document"
        );

        Ok(document)
    }

    fn check_size(&self, size: u64) -> Result<(), IngestError> {
        let max = self.settings.max_file_size_bytes;
        if size > max {
            return Err(IngestError::FileTooLarge(size, max));
        }
        Ok(())
    }
}

/// The single string handed to the language model
pub fn compose_prompt(
    format: DocumentFormat,
    filename: &str,
    text: &str,
    disclose_sampling: bool,
    question: &str,
) -> String {
    let mut prompt = format!("I've uploaded a {} file ({}).\n", format.label(), filename);
    if let Some(note) = disclosure(disclose_sampling) {
        prompt.push_str(note);
        prompt.push('\n');
    }
    prompt.push_str("\nDocument content:\n");
    prompt.push_str(text);
    prompt.push_str("\n\n");
    prompt.push_str(question);
    prompt
}
