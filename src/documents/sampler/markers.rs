//! Omission markers, summary lines and char-safe cutting.

/// Appended by the safety net when the final text is cut to the budget
pub const SAFETY_NET_MARKER: &str = "[Content truncated to fit budget]";
/// Appended when a lone unit is cut to the budget
pub const UNIT_TRUNCATED_MARKER: &str = "[... content truncated ...]";
/// Appended to a page clipped to its share of the budget
pub const CLIP_SUFFIX: &str = " [...]";

pub fn pages_omitted(first: usize, last: usize) -> String {
    if first == last {
        format!("[Page {} omitted]", first)
    } else {
        format!("[Pages {} to {} omitted]", first, last)
    }
}

pub fn rows_omitted(count: usize) -> String {
    format!("[{} rows omitted]", count)
}

/// Heavy tabular marker. Carries the row count like every other marker.
pub fn significant_data_omitted(count: usize) -> String {
    format!("[... significant data omitted ({} rows) ...]", count)
}

pub fn middle_omitted(chars: usize) -> String {
    format!("[... middle section omitted ({} characters) ...]", chars)
}

pub fn tail_omitted(chars: usize) -> String {
    format!("[... remaining {} characters omitted ...]", chars)
}

pub fn document_summary(included: usize, total: usize, unit_name: &str) -> String {
    format!("[Document sampled: showing {} of {} {}]", included, total, unit_name)
}

pub fn sheet_summary(total_rows: usize, included_rows: usize) -> String {
    format!("[Total rows in sheet: {}, Rows included: {}]", total_rows, included_rows)
}

/// Leading `n` characters of `s`
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Trailing `n` characters of `s`
pub fn last_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Characters `start..end` of `s`
pub fn slice_chars(s: &str, start: usize, end: usize) -> &str {
    let rest = match s.char_indices().nth(start) {
        Some((idx, _)) => &s[idx..],
        None => return "",
    };
    take_chars(rest, end.saturating_sub(start))
}

/// Cut `text` so that `text + separator + marker` is at most `limit`
/// characters. When the limit cannot even hold the marker, the marker
/// itself is cut.
pub fn cut_with_marker(text: &str, limit: usize, separator: &str, marker: &str) -> String {
    let tail = format!("{}{}", separator, marker);
    let tail_len = tail.chars().count();
    if tail_len >= limit {
        return take_chars(marker, limit).to_string();
    }
    let mut out = take_chars(text, limit - tail_len).trim_end().to_string();
    out.push_str(&tail);
    out
}

/// Hard backstop: never let sampled text exceed the character budget
pub fn enforce_budget(text: String, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text;
    }
    tracing::debug!(limit, "Sampled text over budget, applying safety net");
    cut_with_marker(&text, limit, "\n", SAFETY_NET_MARKER)
}
