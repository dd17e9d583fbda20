//! Compression Tiers
//!
//! Classifies how much of a document has to go to fit the budget and plans
//! which regions (pages, rows or characters) survive.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::documents::content::DocumentShape;

/// How aggressively a document was sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionTier {
    /// Everything fits, nothing dropped
    Full,
    /// Small tail dropped
    Light,
    /// Proportional beginning / middle / end sample
    Moderate,
    /// Small beginning / middle / end sample
    Heavy,
}

impl Default for CompressionTier {
    fn default() -> Self {
        CompressionTier::Full
    }
}

impl CompressionTier {
    /// True for every tier that drops content
    pub fn is_sampled(&self) -> bool {
        !matches!(self, CompressionTier::Full)
    }

    /// Convert to display string
    pub fn display_name(&self) -> &'static str {
        match self {
            CompressionTier::Full => "full",
            CompressionTier::Light => "light",
            CompressionTier::Moderate => "moderate",
            CompressionTier::Heavy => "heavy",
        }
    }
}

/// How a tier divides the kept items between beginning, middle and end
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum RegionSplit {
    /// Fractions of the kept item count
    Proportional { first: f64, middle: f64, last: f64 },
    /// Absolute item counts, independent of the ratio
    Fixed { first: usize, middle: usize, last: usize },
}

/// Tier breakpoints and region splits for one document shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPolicy {
    /// Ratio above which the light tier applies
    pub light_above: f64,
    /// Ratio above which the moderate tier applies; heavy below
    pub moderate_above: f64,
    /// Minimum share kept by the light tier
    pub light_floor: Option<f64>,
    pub moderate: RegionSplit,
    pub heavy: RegionSplit,
    /// Middle region only emitted when more than this many items sit
    /// outside the first and last regions
    pub middle_min_gap: Option<usize>,
}

pub const PAGINATED_POLICY: TierPolicy = TierPolicy {
    light_above: 0.7,
    moderate_above: 0.4,
    light_floor: Some(0.85),
    moderate: RegionSplit::Proportional { first: 0.5, middle: 0.2, last: 0.3 },
    heavy: RegionSplit::Fixed { first: 3, middle: 2, last: 3 },
    middle_min_gap: None,
};

pub const FLAT_POLICY: TierPolicy = TierPolicy {
    light_above: 0.85,
    moderate_above: 0.6,
    light_floor: None,
    moderate: RegionSplit::Proportional { first: 0.7, middle: 0.0, last: 0.3 },
    heavy: RegionSplit::Proportional { first: 0.5, middle: 0.0, last: 0.5 },
    middle_min_gap: None,
};

pub const TABULAR_POLICY: TierPolicy = TierPolicy {
    light_above: 0.85,
    moderate_above: 0.5,
    light_floor: Some(0.85),
    moderate: RegionSplit::Proportional { first: 0.5, middle: 0.2, last: 0.3 },
    heavy: RegionSplit::Proportional { first: 0.4, middle: 0.2, last: 0.4 },
    middle_min_gap: Some(20),
};

/// `floor(total * ratio)`, tolerant of float noise (20 * 0.4 is 8, not 7)
pub fn floor_count(total: usize, ratio: f64) -> usize {
    if !ratio.is_finite() {
        return total;
    }
    ((total as f64) * ratio.max(0.0) + 1e-9).floor() as usize
}

impl TierPolicy {
    pub fn for_shape(shape: DocumentShape) -> &'static TierPolicy {
        match shape {
            DocumentShape::Paginated => &PAGINATED_POLICY,
            DocumentShape::Flat => &FLAT_POLICY,
            DocumentShape::Tabular | DocumentShape::Delimited => &TABULAR_POLICY,
        }
    }

    /// Tier for a compression ratio (budget / total length)
    pub fn classify(&self, ratio: f64) -> CompressionTier {
        if ratio >= 1.0 {
            CompressionTier::Full
        } else if ratio > self.light_above {
            CompressionTier::Light
        } else if ratio > self.moderate_above {
            CompressionTier::Moderate
        } else {
            CompressionTier::Heavy
        }
    }

    /// Plan the retained item ranges for `total` items when `keep` of them
    /// fit. Ranges are sorted, disjoint and never adjacent.
    pub fn regions(&self, tier: CompressionTier, total: usize, keep: usize) -> Vec<Range<usize>> {
        if total == 0 {
            return Vec::new();
        }
        let keep = keep.min(total);

        match tier {
            CompressionTier::Full => vec![0..total],
            CompressionTier::Light => {
                let floor = self.light_floor.map(|f| floor_count(total, f)).unwrap_or(0);
                let count = keep.max(floor).min(total);
                if count == 0 {
                    Vec::new()
                } else {
                    vec![0..count]
                }
            }
            CompressionTier::Moderate => {
                let (first, middle, last) = self.split_counts(&self.moderate, total, keep);
                self.layout(total, first, middle, last)
            }
            CompressionTier::Heavy => {
                let (first, middle, last) = self.split_counts(&self.heavy, total, keep);
                self.layout(total, first, middle, last)
            }
        }
    }

    fn split_counts(&self, split: &RegionSplit, total: usize, keep: usize) -> (usize, usize, usize) {
        let (first, mut middle, last) = match *split {
            RegionSplit::Proportional { middle, last, .. } => {
                let middle_count = floor_count(keep, middle);
                let last_count = floor_count(keep, last);
                let first_count = keep.saturating_sub(middle_count + last_count);
                (first_count, middle_count, last_count)
            }
            RegionSplit::Fixed { first, middle, last } => {
                // Never keep more than the moderate tier would at its floor
                let cap = self.moderate_floor_count(total);
                shrink_to(first, middle, last, cap)
            }
        };

        if let Some(gap) = self.middle_min_gap {
            if total.saturating_sub(first + last) <= gap {
                middle = 0;
            }
        }

        (first, middle, last)
    }

    fn moderate_floor_count(&self, total: usize) -> usize {
        let keep = floor_count(total, self.moderate_above);
        match self.moderate {
            RegionSplit::Proportional { .. } => keep,
            RegionSplit::Fixed { first, middle, last } => (first + middle + last).min(keep),
        }
    }

    fn layout(&self, total: usize, first: usize, middle: usize, last: usize) -> Vec<Range<usize>> {
        let first_end = first.min(total);
        let last_start = total.saturating_sub(last).max(first_end);

        let mut planned = vec![0..first_end];
        if middle > 0 {
            let center_start = (total / 2).saturating_sub(middle / 2);
            let start = center_start.max(first_end);
            let end = (center_start + middle).min(last_start);
            if start < end {
                planned.push(start..end);
            }
        }
        planned.push(last_start..total);

        let mut regions: Vec<Range<usize>> = Vec::with_capacity(planned.len());
        for range in planned.into_iter().filter(|r| r.start < r.end) {
            match regions.last_mut() {
                Some(prev) if prev.end >= range.start => prev.end = prev.end.max(range.end),
                _ => regions.push(range),
            }
        }
        regions
    }
}

/// Shrink fixed counts to `cap`, middle first, then the larger end
fn shrink_to(mut first: usize, mut middle: usize, mut last: usize, cap: usize) -> (usize, usize, usize) {
    while first + middle + last > cap {
        if middle > 0 {
            middle -= 1;
        } else if last >= first {
            last -= 1;
        } else {
            first -= 1;
        }
    }
    (first, middle, last)
}

/// Number of items covered by a set of regions
pub fn covered(regions: &[Range<usize>]) -> usize {
    regions.iter().map(|r| r.end - r.start).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_per_shape() {
        let paginated = TierPolicy::for_shape(DocumentShape::Paginated);
        assert_eq!(paginated.classify(0.71), CompressionTier::Light);
        assert_eq!(paginated.classify(0.7), CompressionTier::Moderate);
        assert_eq!(paginated.classify(0.41), CompressionTier::Moderate);
        assert_eq!(paginated.classify(0.4), CompressionTier::Heavy);

        let flat = TierPolicy::for_shape(DocumentShape::Flat);
        assert_eq!(flat.classify(0.86), CompressionTier::Light);
        assert_eq!(flat.classify(0.85), CompressionTier::Moderate);
        assert_eq!(flat.classify(0.6), CompressionTier::Heavy);

        let tabular = TierPolicy::for_shape(DocumentShape::Delimited);
        assert_eq!(tabular.classify(1.0), CompressionTier::Full);
        assert_eq!(tabular.classify(0.85), CompressionTier::Moderate);
        assert_eq!(tabular.classify(0.51), CompressionTier::Moderate);
        assert_eq!(tabular.classify(0.5), CompressionTier::Heavy);
    }

    #[test]
    fn test_tier_order_is_severity() {
        assert!(CompressionTier::Full < CompressionTier::Light);
        assert!(CompressionTier::Light < CompressionTier::Moderate);
        assert!(CompressionTier::Moderate < CompressionTier::Heavy);
        assert!(!CompressionTier::Full.is_sampled());
        assert!(CompressionTier::Heavy.is_sampled());
    }

    #[test]
    fn test_floor_count_tolerates_float_noise() {
        assert_eq!(floor_count(20, 0.4), 8);
        assert_eq!(floor_count(10, 0.7), 7);
        assert_eq!(floor_count(10, f64::INFINITY), 10);
        assert_eq!(floor_count(10, -1.0), 0);
    }

    #[test]
    fn test_heavy_paginated_twenty_pages() {
        let regions = PAGINATED_POLICY.regions(CompressionTier::Heavy, 20, 6);
        assert_eq!(regions, vec![0..3, 9..11, 17..20]);
    }

    #[test]
    fn test_heavy_paginated_small_document_never_overlaps() {
        let regions = PAGINATED_POLICY.regions(CompressionTier::Heavy, 6, 1);
        assert!(covered(&regions) <= 6);
        for pair in regions.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
        // Capped at the moderate floor count for 6 pages
        assert_eq!(covered(&regions), 2);
    }

    #[test]
    fn test_moderate_paginated_split() {
        // 100 pages, keep 50 -> 25 / 10 / 15
        let regions = PAGINATED_POLICY.regions(CompressionTier::Moderate, 100, 50);
        assert_eq!(regions, vec![0..25, 45..55, 85..100]);
    }

    #[test]
    fn test_light_floor_applies() {
        let regions = PAGINATED_POLICY.regions(CompressionTier::Light, 20, 15);
        assert_eq!(regions, vec![0..17]);
        let regions = FLAT_POLICY.regions(CompressionTier::Light, 1000, 860);
        assert_eq!(regions, vec![0..860]);
    }

    #[test]
    fn test_tabular_middle_needs_gap() {
        // 50 rows, keep 40: first+last = 32, only 18 rows outside -> no middle
        let regions = TABULAR_POLICY.regions(CompressionTier::Moderate, 50, 40);
        assert_eq!(regions.len(), 2);
        assert_eq!(covered(&regions), 32);

        // 200 rows, keep 100: middle emitted
        let regions = TABULAR_POLICY.regions(CompressionTier::Moderate, 200, 100);
        assert_eq!(regions, vec![0..50, 90..110, 170..200]);
    }

    #[test]
    fn test_flat_regions_have_no_middle() {
        let regions = FLAT_POLICY.regions(CompressionTier::Moderate, 1000, 700);
        assert_eq!(regions, vec![0..490, 790..1000]);
        let regions = FLAT_POLICY.regions(CompressionTier::Heavy, 1000, 400);
        assert_eq!(regions, vec![0..200, 800..1000]);
    }

    #[test]
    fn test_adjacent_regions_merge() {
        let regions = TABULAR_POLICY.regions(CompressionTier::Heavy, 3, 3);
        assert_eq!(regions, vec![0..3]);
    }

    #[test]
    fn test_empty_total() {
        assert!(TABULAR_POLICY.regions(CompressionTier::Heavy, 0, 0).is_empty());
    }
}
