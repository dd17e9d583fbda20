//! Character Budget Model
//!
//! Converts the token target handed to the model service into the character
//! budget the sampler works against.

use serde::{Deserialize, Serialize};

use crate::documents::sampler::SampleError;

/// Average characters per token used for every budget conversion
pub const CHARS_PER_TOKEN: usize = 4;
/// Token target for one attached document. Leaves room in the context
/// window for conversation history and system instructions.
pub const DEFAULT_TOKEN_BUDGET: u32 = 4_000;
/// Character budget for the default token target
pub const DEFAULT_CHAR_BUDGET: usize = DEFAULT_TOKEN_BUDGET as usize * CHARS_PER_TOKEN; // 16,000

/// Convert a token target into a character budget.
pub fn to_char_budget(token_target: u32) -> usize {
    token_target as usize * CHARS_PER_TOKEN
}

/// Character budget for one sampling call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterBudget {
    chars: usize,
}

impl Default for CharacterBudget {
    fn default() -> Self {
        Self { chars: DEFAULT_CHAR_BUDGET }
    }
}

impl CharacterBudget {
    /// Budget for a token target. Zero tokens is rejected.
    pub fn from_tokens(token_target: u32) -> Result<Self, SampleError> {
        if token_target == 0 {
            return Err(SampleError::ZeroBudget);
        }
        Ok(Self {
            chars: to_char_budget(token_target),
        })
    }

    /// Budget measured directly in characters
    pub fn from_chars(chars: usize) -> Result<Self, SampleError> {
        if chars == 0 {
            return Err(SampleError::ZeroBudget);
        }
        Ok(Self { chars })
    }

    pub fn chars(&self) -> usize {
        self.chars
    }

    /// Ratio of budget to content length. Empty content always fits.
    pub fn compression_ratio(&self, total_len: usize) -> f64 {
        if total_len == 0 {
            return f64::INFINITY;
        }
        self.chars as f64 / total_len as f64
    }

    /// True when `len` characters fit without sampling
    pub fn fits(&self, len: usize) -> bool {
        len <= self.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_constants() {
        assert_eq!(CHARS_PER_TOKEN, 4);
        assert_eq!(DEFAULT_CHAR_BUDGET, 16_000);
        assert_eq!(CharacterBudget::default().chars(), DEFAULT_CHAR_BUDGET);
    }

    #[test]
    fn test_to_char_budget() {
        assert_eq!(to_char_budget(1), 4);
        assert_eq!(to_char_budget(2_000), 8_000);
        assert_eq!(to_char_budget(DEFAULT_TOKEN_BUDGET), 16_000);
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(matches!(CharacterBudget::from_tokens(0), Err(SampleError::ZeroBudget)));
        assert!(matches!(CharacterBudget::from_chars(0), Err(SampleError::ZeroBudget)));
    }

    #[test]
    fn test_compression_ratio() {
        let budget = CharacterBudget::from_chars(200).unwrap();
        assert!((budget.compression_ratio(400) - 0.5).abs() < f64::EPSILON);
        assert!(budget.compression_ratio(0).is_infinite());
        assert!(budget.fits(200));
        assert!(!budget.fits(201));
    }
}
