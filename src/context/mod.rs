//! Context Budget Module
//!
//! Turns a token target into a character budget and decides how hard a
//! document has to be sampled to fit it.

pub mod budget;
pub mod tiers;
pub mod tokens;

pub use budget::{
    to_char_budget, CharacterBudget, CHARS_PER_TOKEN, DEFAULT_CHAR_BUDGET, DEFAULT_TOKEN_BUDGET,
};
pub use tiers::{
    CompressionTier, RegionSplit, TierPolicy, FLAT_POLICY, PAGINATED_POLICY, TABULAR_POLICY,
};
pub use tokens::{count_tokens, estimate_tokens_quick};
