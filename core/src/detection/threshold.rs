use log::debug;

use super::contours::count_regions_above;
use crate::types::ProbabilityMask;

/// Fixed cutoffs always tried after the caller's default
pub const REFERENCE_THRESHOLDS: [f32; 3] = [0.3, 0.5, 0.7];

/// Cutoff used when no candidate list is supplied at all
pub const FALLBACK_THRESHOLD: f32 = 0.5;

/// Builds the ordered candidate list for [`select_threshold`]
///
/// Order: `default`, the [`REFERENCE_THRESHOLDS`], then the mean of the map.
/// Earlier entries win ties, so the default is favored.
pub fn candidate_thresholds(probabilities: &ProbabilityMask, default: f32) -> Vec<f32> {
    let mut candidates = Vec::with_capacity(REFERENCE_THRESHOLDS.len() + 2);
    candidates.push(default);
    candidates.extend_from_slice(&REFERENCE_THRESHOLDS);
    candidates.push(probabilities.mean());
    candidates
}

/// Picks the cutoff producing the most regions larger than `min_area`
///
/// Each candidate binarizes the map with `value > candidate`. The first
/// candidate reaching the strictly greatest count wins. When no candidate
/// yields a qualifying region the first candidate (the caller's default) is
/// returned, so downstream stages simply produce zero detections.
pub fn select_threshold(probabilities: &ProbabilityMask, candidates: &[f32], min_area: f64) -> f32 {
    let default = candidates.first().copied().unwrap_or(FALLBACK_THRESHOLD);

    let mut best = default;
    let mut best_count = 0usize;
    for &candidate in candidates {
        let count = count_regions_above(&probabilities.binarize(candidate), min_area);
        debug!("threshold {:.3}: {} regions above {}", candidate, count, min_area);
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }

    best
}
