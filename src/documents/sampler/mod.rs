//! Adaptive Sampler
//!
//! Fits extracted content into a character budget. Content that fits is
//! returned verbatim; anything larger is sampled by tier (light, moderate,
//! heavy) with omission markers where content was dropped and a summary of
//! what was kept.

pub mod linear;
pub mod markers;
pub mod tabular;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{CharacterBudget, CompressionTier};
use super::content::{char_len, ExtractedContent};

#[derive(Error, Debug)]
pub enum SampleError {
    #[error("Token budget must be positive")]
    ZeroBudget,
    #[error("Sampled output is {actual} characters, budget is {budget}")]
    BudgetViolation { actual: usize, budget: usize },
}

impl Serialize for SampleError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Bounded text plus bookkeeping on what was kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledResult {
    pub text: String,
    pub was_truncated: bool,
    /// Pages, flat bodies or data rows in the source
    pub total_units: usize,
    /// Pages, flat bodies or data rows that made it into `text`
    pub included_units: usize,
    /// Most severe tier applied
    pub tier: CompressionTier,
}

impl SampledResult {
    /// Result for content that fit untouched
    pub fn full(text: String, units: usize) -> Self {
        Self {
            text,
            was_truncated: false,
            total_units: units,
            included_units: units,
            tier: CompressionTier::Full,
        }
    }
}

/// Sample `content` to fit a token budget.
pub fn sample(content: &ExtractedContent, token_budget: u32) -> Result<SampledResult, SampleError> {
    let budget = CharacterBudget::from_tokens(token_budget)?;
    sample_with_budget(content, budget)
}

/// Sample `content` to fit a character budget.
pub fn sample_with_budget(
    content: &ExtractedContent,
    budget: CharacterBudget,
) -> Result<SampledResult, SampleError> {
    let result = match content {
        ExtractedContent::Linear { shape, units } => linear::sample_linear(*shape, units, budget),
        ExtractedContent::Tabular { sheets, .. } => tabular::sample_tabular(sheets, budget),
    };

    let actual = char_len(&result.text);
    if actual > budget.chars() {
        tracing::error!(actual, budget = budget.chars(), "Sampler exceeded its budget");
        return Err(SampleError::BudgetViolation {
            actual,
            budget: budget.chars(),
        });
    }

    tracing::debug!(
        shape = ?content.shape(),
        tier = result.tier.display_name(),
        total_units = result.total_units,
        included_units = result.included_units,
        chars = actual,
        "Sampled document"
    );

    Ok(result)
}

/// Apply the safety net and report whether it fired
pub(crate) fn finish(text: String, limit: usize) -> (String, bool) {
    if char_len(&text) <= limit {
        (text, false)
    } else {
        (markers::enforce_budget(text, limit), true)
    }
}
