//! Sampling for spreadsheets and delimited text.
//!
//! Sheets share the budget in source order. Each sheet keeps its heading
//! and header no matter what, then as many rows as its share allows,
//! chosen from the beginning, middle and end of the sheet.

use std::ops::Range;

use crate::context::tiers::{covered, floor_count};
use crate::context::{CharacterBudget, CompressionTier, TierPolicy};
use crate::documents::content::{char_len, render_row, DocumentShape, Sheet, ROW_SEPARATOR, SHEET_SEPARATOR};

use super::markers::{rows_omitted, sheet_summary, significant_data_omitted};
use super::{finish, SampledResult};

/// Gaps a sampled sheet can have: before and after its middle region
const MAX_GAPS: usize = 2;

struct SheetSample {
    text: String,
    tier: CompressionTier,
    included_rows: usize,
}

pub(crate) fn sample_tabular(sheets: &[Sheet], budget: CharacterBudget) -> SampledResult {
    let total_rows: usize = sheets.iter().map(|s| s.data_row_count()).sum();
    let rendered: Vec<String> = sheets.iter().map(|s| s.render()).collect();
    let sep = char_len(SHEET_SEPARATOR);
    let full_len = rendered.iter().map(|r| char_len(r)).sum::<usize>()
        + rendered.len().saturating_sub(1) * sep;

    if budget.fits(full_len) {
        return SampledResult::full(rendered.join(SHEET_SEPARATOR), total_rows);
    }

    let mut remaining = budget.chars();
    let mut parts = Vec::with_capacity(sheets.len());
    let mut tier = CompressionTier::Full;
    let mut included_rows = 0;

    for (i, (sheet, full)) in sheets.iter().zip(rendered).enumerate() {
        if i > 0 {
            remaining = remaining.saturating_sub(sep);
        }
        let share = remaining / (sheets.len() - i);
        let len = char_len(&full);

        let sampled = if len <= share {
            SheetSample {
                text: full,
                tier: CompressionTier::Full,
                included_rows: sheet.data_row_count(),
            }
        } else {
            sample_sheet(sheet, len, share)
        };

        tracing::debug!(
            sheet = sheet.name.as_deref().unwrap_or("-"),
            share,
            tier = sampled.tier.display_name(),
            included_rows = sampled.included_rows,
            "Sampled sheet"
        );

        remaining = remaining.saturating_sub(char_len(&sampled.text));
        tier = tier.max(sampled.tier);
        included_rows += sampled.included_rows;
        parts.push(sampled.text);
    }

    let (text, cut) = finish(parts.join(SHEET_SEPARATOR), budget.chars());
    SampledResult {
        text,
        was_truncated: cut || tier.is_sampled(),
        total_units: total_rows,
        included_units: included_rows,
        tier,
    }
}

fn sample_sheet(sheet: &Sheet, full_len: usize, share: usize) -> SheetSample {
    let row_count = sheet.data_row_count();
    let preamble = sheet.preamble();
    if row_count == 0 {
        // Nothing to drop; the safety net handles an oversized header
        return SheetSample {
            text: preamble.join(ROW_SEPARATOR),
            tier: CompressionTier::Full,
            included_rows: 0,
        };
    }

    let policy = TierPolicy::for_shape(DocumentShape::Tabular);
    let ratio = share as f64 / full_len as f64;
    let tier = policy.classify(ratio);
    let heavy = tier == CompressionTier::Heavy;

    let rows: Vec<String> = sheet.rows.iter().map(|r| render_row(r)).collect();
    let line = char_len(ROW_SEPARATOR);
    let rows_len: usize = rows.iter().map(|r| char_len(r) + line).sum();

    // Room for heading, header, markers and summary comes off the top
    let marker_len = if heavy {
        char_len(&significant_data_omitted(row_count))
    } else {
        char_len(&rows_omitted(row_count))
    };
    let reserve = preamble.iter().map(|p| char_len(p)).sum::<usize>()
        + preamble.len().saturating_sub(1) * line
        + MAX_GAPS * (marker_len + line)
        + char_len(&sheet_summary(row_count, row_count))
        + line;
    let keep_ratio = share.saturating_sub(reserve) as f64 / rows_len.max(1) as f64;
    let target_rows = floor_count(row_count, keep_ratio);

    let mut regions = policy.regions(tier, row_count, target_rows);
    if tier == CompressionTier::Light {
        let fixed_len = reserve - MAX_GAPS * (marker_len + line);
        let end = regions.first().map(|r| r.end).unwrap_or(0);
        regions = fit_rows(&rows, end, share.saturating_sub(fixed_len + marker_len + line));
    }
    let included_rows = covered(&regions);

    let marker = |omitted: usize| {
        if heavy {
            significant_data_omitted(omitted)
        } else {
            rows_omitted(omitted)
        }
    };

    let mut lines = preamble;
    let mut cursor = 0;
    for region in &regions {
        if region.start > cursor {
            lines.push(marker(region.start - cursor));
        }
        lines.extend(rows[region.clone()].iter().cloned());
        cursor = region.end;
    }
    if cursor < row_count {
        lines.push(marker(row_count - cursor));
    }
    lines.push(sheet_summary(row_count, included_rows));

    SheetSample {
        text: lines.join(ROW_SEPARATOR),
        tier,
        included_rows,
    }
}

/// Leading rows, at most `planned_end`, whose lines fit in `available`
fn fit_rows(rows: &[String], planned_end: usize, available: usize) -> Vec<Range<usize>> {
    let line = char_len(ROW_SEPARATOR);
    let mut used = 0;
    let mut end = 0;
    for row in rows.iter().take(planned_end) {
        used += char_len(row) + line;
        if used > available {
            break;
        }
        end += 1;
    }
    if end == 0 {
        Vec::new()
    } else {
        vec![0..end]
    }
}
