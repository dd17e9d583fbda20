//! Truncation Annotator
//!
//! Recognizes the omission markers the sampler writes and discloses the
//! sampling to the model when any are present.

/// Prepended to the document text when content was omitted
pub const SAMPLING_DISCLOSURE: &str = "[Note: This is a large document that was sampled to fit the context window. \
The beginning, middle, and end sections were retained; some content in between was omitted.]";

/// Phrases that only occur inside sampler markers. A clipped page's ` [...]`
/// is not one: ordinary prose uses it, and a clipped page always comes with
/// a `[Document sampled: ...]` summary.
const MARKER_PHRASES: &[&str] = &["omitted", "truncated", "Document sampled:", "Rows included:"];

/// True when `text` contains any sampler marker. Only bracketed spans are
/// inspected, so body text that happens to say "omitted" does not count.
pub fn detect_truncation(text: &str) -> bool {
    bracketed(text).any(|span| MARKER_PHRASES.iter().any(|phrase| span.contains(phrase)))
}

/// Bracketed spans on a single line, brackets included
fn bracketed(text: &str) -> impl Iterator<Item = &str> {
    text.lines().flat_map(|line| {
        let mut spans = Vec::new();
        let mut rest = line;
        while let Some(open) = rest.find('[') {
            let Some(close) = rest[open..].find(']') else {
                break;
            };
            spans.push(&rest[open..open + close + 1]);
            rest = &rest[open + close + 1..];
        }
        spans
    })
}

/// Disclosure note for the composed prompt, if one is due
pub fn disclosure(was_truncated: bool) -> Option<&'static str> {
    if was_truncated {
        Some(SAMPLING_DISCLOSURE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_every_marker_family() {
        for marker in [
            "[12 rows omitted]",
            "[Pages 4 to 9 omitted]",
            "[Page 4 omitted]",
            "[... significant data omitted (3 rows) ...]",
            "[... middle section omitted (900 characters) ...]",
            "[... content truncated ...]",
            "[Content truncated to fit budget]",
            "[Document sampled: showing 8 of 20 pages]",
            "[Total rows in sheet: 50, Rows included: 28]",
        ] {
            let text = format!("before\n{}\nafter", marker);
            assert!(detect_truncation(&text), "missed {}", marker);
        }
    }

    #[test]
    fn test_plain_text_is_not_truncated() {
        assert!(!detect_truncation("id,value\n1,a\n2,b"));
        assert!(!detect_truncation("Details were omitted from the minutes."));
        assert!(!detect_truncation("[see appendix] and [1]"));
        assert!(!detect_truncation("He wrote: \"the results [...] were clear.\""));
    }

    #[test]
    fn test_unclosed_bracket() {
        assert!(!detect_truncation("[rows omitted"));
    }

    #[test]
    fn test_disclosure() {
        assert_eq!(disclosure(false), None);
        assert!(disclosure(true).is_some_and(|note| note.starts_with("[Note:")));
    }
}
