//! Sampling for linear content: paginated documents and flat text.
//!
//! Paginated documents are sampled by whole pages. Flat documents have no
//! boundaries to respect, so they are sampled by character offset.

use std::ops::Range;

use crate::context::tiers::{covered, floor_count};
use crate::context::{CharacterBudget, CompressionTier, TierPolicy};
use crate::documents::content::{char_len, DocumentShape, Unit, UNIT_SEPARATOR};

use super::markers::{
    cut_with_marker, document_summary, last_chars, middle_omitted, pages_omitted, slice_chars,
    tail_omitted, take_chars, CLIP_SUFFIX, UNIT_TRUNCATED_MARKER,
};
use super::{finish, SampledResult};

pub(crate) fn sample_linear(shape: DocumentShape, units: &[Unit], budget: CharacterBudget) -> SampledResult {
    let separators = units.len().saturating_sub(1) * char_len(UNIT_SEPARATOR);
    let total_len = units.iter().map(|u| char_len(&u.text)).sum::<usize>() + separators;

    if budget.fits(total_len) {
        let text = units.iter().map(|u| u.text.as_str()).collect::<Vec<_>>().join(UNIT_SEPARATOR);
        return SampledResult::full(text, units.len());
    }

    match shape {
        DocumentShape::Paginated if units.len() > 1 => sample_pages(units, total_len, budget),
        DocumentShape::Paginated => sample_single_unit(units, total_len, budget),
        _ => sample_flat(units, total_len, budget),
    }
}

/// A lone page cannot be sampled by page; cut it to the budget.
fn sample_single_unit(units: &[Unit], total_len: usize, budget: CharacterBudget) -> SampledResult {
    let policy = TierPolicy::for_shape(DocumentShape::Paginated);
    let tier = policy.classify(budget.compression_ratio(total_len));
    let text = units.first().map(|u| u.text.as_str()).unwrap_or_default();

    SampledResult {
        text: cut_with_marker(text, budget.chars(), UNIT_SEPARATOR, UNIT_TRUNCATED_MARKER),
        was_truncated: true,
        total_units: units.len(),
        included_units: units.len(),
        tier,
    }
}

fn sample_flat(units: &[Unit], total_len: usize, budget: CharacterBudget) -> SampledResult {
    let policy = TierPolicy::for_shape(DocumentShape::Flat);
    let body = units.iter().map(|u| u.text.as_str()).collect::<Vec<_>>().join(UNIT_SEPARATOR);
    let tier = policy.classify(budget.compression_ratio(total_len));

    // Worst-case summary and marker lengths, so the kept slices leave room
    let unit_name = DocumentShape::Flat.unit_name();
    let reserve = char_len(&document_summary(total_len, total_len, unit_name))
        + char_len(&middle_omitted(total_len)).max(char_len(&tail_omitted(total_len)))
        + 3 * char_len(UNIT_SEPARATOR);
    let keep = budget.chars().saturating_sub(reserve);

    let regions = policy.regions(tier, total_len, keep);
    let included = covered(&regions);

    let mut parts = vec![document_summary(included, total_len, unit_name)];
    let mut cursor = 0;
    for region in &regions {
        if region.start > cursor {
            parts.push(middle_omitted(region.start - cursor));
        }
        let slice = if region.start == 0 {
            take_chars(&body, region.end)
        } else if region.end == total_len {
            last_chars(&body, region.end - region.start)
        } else {
            slice_chars(&body, region.start, region.end)
        };
        parts.push(slice.to_string());
        cursor = region.end;
    }
    if cursor < total_len {
        parts.push(tail_omitted(total_len - cursor));
    }

    let (text, _) = finish(parts.join(UNIT_SEPARATOR), budget.chars());
    SampledResult {
        text,
        was_truncated: true,
        total_units: units.len(),
        included_units: if included > 0 { units.len() } else { 0 },
        tier,
    }
}

fn sample_pages(units: &[Unit], total_len: usize, budget: CharacterBudget) -> SampledResult {
    let policy = TierPolicy::for_shape(DocumentShape::Paginated);
    let ratio = budget.compression_ratio(total_len);
    let tier = policy.classify(ratio);
    let page_count = units.len();

    let mut regions = policy.regions(tier, page_count, floor_count(page_count, ratio));
    if regions.is_empty() {
        regions.push(0..1);
    }

    let lens: Vec<usize> = units.iter().map(|u| char_len(&u.text)).collect();
    let sep = char_len(UNIT_SEPARATOR);

    if tier == CompressionTier::Light {
        regions = fit_prefix(&lens, regions[0].end, page_count, budget.chars());
    }

    let included = covered(&regions);
    let summary = document_summary(included, page_count, DocumentShape::Paginated.unit_name());
    let gap_markers = gap_markers(units, &regions);

    // Everything that is not page text: summary, markers, separators
    let part_count = 1 + gap_markers.len() + included;
    let overhead = char_len(&summary)
        + gap_markers.iter().map(|(_, m)| char_len(m)).sum::<usize>()
        + part_count.saturating_sub(1) * sep;
    let available = budget.chars().saturating_sub(overhead);

    let selected: Vec<usize> = regions.iter().flat_map(|r| r.clone()).collect();
    let selected_lens: Vec<usize> = selected.iter().map(|&i| lens[i]).collect();
    let allowances = share_budget(&selected_lens, available);

    let mut parts = vec![summary];
    let mut markers = gap_markers.into_iter().peekable();
    for (&index, &allowance) in selected.iter().zip(allowances.iter()) {
        while let Some((_, marker)) = markers.next_if(|(before, _)| *before <= index) {
            parts.push(marker);
        }
        parts.push(clip_page(&units[index].text, lens[index], allowance));
    }
    parts.extend(markers.map(|(_, marker)| marker));

    let (text, _) = finish(parts.join(UNIT_SEPARATOR), budget.chars());
    SampledResult {
        text,
        was_truncated: true,
        total_units: page_count,
        included_units: included,
        tier,
    }
}

/// Shrink a leading run of pages until it fits alongside its summary and
/// marker. The first page always stays, clipped later if it must be.
fn fit_prefix(lens: &[usize], planned_end: usize, page_count: usize, limit: usize) -> Vec<Range<usize>> {
    let unit_name = DocumentShape::Paginated.unit_name();
    let sep = char_len(UNIT_SEPARATOR);
    let reserve = char_len(&document_summary(page_count, page_count, unit_name))
        + char_len(&pages_omitted(page_count, page_count + 1))
        + 2 * sep;
    let available = limit.saturating_sub(reserve);

    let mut used = 0;
    let mut end = 0;
    for (i, &len) in lens.iter().enumerate().take(planned_end) {
        let cost = if i == 0 { len } else { len + sep };
        if i > 0 && used + cost > available {
            break;
        }
        used += cost;
        end = i + 1;
    }
    vec![0..end.max(1)]
}

/// Omission markers keyed by the index of the page they precede
/// (`page_count` for a trailing marker).
fn gap_markers(units: &[Unit], regions: &[Range<usize>]) -> Vec<(usize, String)> {
    let mut markers = Vec::new();
    let mut cursor = 0;
    for region in regions {
        if region.start > cursor {
            markers.push((
                region.start,
                pages_omitted(units[cursor].ordinal as usize, units[region.start - 1].ordinal as usize),
            ));
        }
        cursor = region.end;
    }
    if cursor < units.len() {
        let last = units.len() - 1;
        markers.push((units.len(), pages_omitted(units[cursor].ordinal as usize, units[last].ordinal as usize)));
    }
    markers
}

/// Split `available` characters over pages: short pages keep everything,
/// the rest share what is left equally.
fn share_budget(lens: &[usize], available: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..lens.len()).collect();
    order.sort_by_key(|&i| lens[i]);

    let mut allowances = vec![0; lens.len()];
    let mut remaining = available;
    for (k, &i) in order.iter().enumerate() {
        let share = remaining / (lens.len() - k);
        let granted = lens[i].min(share);
        allowances[i] = granted;
        remaining -= granted;
    }
    allowances
}

fn clip_page(text: &str, len: usize, allowance: usize) -> String {
    if len <= allowance {
        return text.to_string();
    }
    let suffix_len = char_len(CLIP_SUFFIX);
    if allowance <= suffix_len {
        return take_chars(text, allowance).to_string();
    }
    format!("{}{}", take_chars(text, allowance - suffix_len).trim_end(), CLIP_SUFFIX)
}
