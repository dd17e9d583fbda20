//! Token counting for composed prompts using tiktoken-rs.
//!
//! Sampling itself runs on the fixed 4-chars-per-token estimate; the exact
//! count here is only reported back to the caller.

use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tiktoken_rs::cl100k_base;

use super::budget::CHARS_PER_TOKEN;

/// Entries kept before the cache is halved
const CACHE_CAPACITY: usize = 1_024;

/// Counts keyed by content hash; prompts are often recounted by the CLI
static TOKEN_CACHE: RwLock<Option<HashMap<u64, u32>>> = RwLock::new(None);

fn hash_content(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Count tokens in text using cl100k_base encoding.
///
/// Falls back to [`estimate_tokens_quick`] when the encoder cannot load.
pub fn count_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }

    let key = hash_content(text);
    if let Some(count) = TOKEN_CACHE.read().as_ref().and_then(|c| c.get(&key).copied()) {
        return count;
    }

    let count = match cl100k_base() {
        Ok(bpe) => bpe.encode_with_special_tokens(text).len() as u32,
        Err(e) => {
            tracing::warn!(error = %e, "cl100k_base unavailable, using character estimate");
            return estimate_tokens_quick(text);
        }
    };

    let mut cache = TOKEN_CACHE.write();
    let entries = cache.get_or_insert_with(|| HashMap::with_capacity(CACHE_CAPACITY));
    if entries.len() >= CACHE_CAPACITY {
        let evict: Vec<u64> = entries.keys().take(CACHE_CAPACITY / 2).copied().collect();
        for k in evict {
            entries.remove(&k);
        }
    }
    entries.insert(key, count);

    count
}

/// Estimate from character count, the same ratio the budget uses
pub fn estimate_tokens_quick(text: &str) -> u32 {
    let chars = text.chars().count();
    ((chars + CHARS_PER_TOKEN - 1) / CHARS_PER_TOKEN) as u32
}

#[cfg(test)]
fn cache_len() -> usize {
    TOKEN_CACHE.read().as_ref().map(|c| c.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_empty() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn test_count_tokens_simple() {
        let count = count_tokens("Hello, world!");
        assert!(count > 0);
        assert!(count < 10);
    }

    #[test]
    fn test_count_tokens_cached() {
        let text = "Quarterly revenue by region, sampled from a large sheet.";
        let first = count_tokens(text);
        let second = count_tokens(text);
        assert_eq!(first, second);
        assert!(cache_len() >= 1);
    }

    #[test]
    fn test_estimate_tokens_quick() {
        assert_eq!(estimate_tokens_quick(""), 0);
        assert_eq!(estimate_tokens_quick("abcd"), 1);
        assert_eq!(estimate_tokens_quick("abcde"), 2);
        // Characters, not bytes
        assert_eq!(estimate_tokens_quick("éééé"), 1);
    }
}
