//! Uploaded Document Handling
//!
//! Extraction, budgeted sampling and prompt composition for uploaded files.

pub mod annotator;
pub mod content;
pub mod extract;
pub mod format;
pub mod ingest;
pub mod sampler;

// Re-export key public types
pub use annotator::{detect_truncation, SAMPLING_DISCLOSURE};
pub use content::{DocumentShape, ExtractedContent, Sheet, Unit};
pub use extract::{extract, ExtractError};
pub use format::DocumentFormat;
pub use ingest::{
    compose_prompt, IngestError, IngestedDocument, Ingestor, DEFAULT_PROMPT, EMPTY_DOCUMENT_FALLBACK,
};
pub use sampler::{sample, sample_with_budget, SampleError, SampledResult};
