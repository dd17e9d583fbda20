// Excerpt Library
// Exports core modules for use by the CLI binary and embedding services

pub mod config;
pub mod context;
pub mod documents;

// Re-export commonly used types for CLI
pub use config::{load_settings, save_settings, settings_path, ConfigError, Settings, TOKEN_BUDGET_ENV};
pub use context::{
    count_tokens, estimate_tokens_quick, to_char_budget, CharacterBudget, CompressionTier, TierPolicy,
    CHARS_PER_TOKEN, DEFAULT_TOKEN_BUDGET,
};
pub use documents::{
    extract, sample, DocumentFormat, DocumentShape, ExtractedContent, IngestError, IngestedDocument,
    Ingestor, SampleError, SampledResult,
};
