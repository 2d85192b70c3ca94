//! Character-level position agreement between two span sets

use crate::span::{total_length, Span};

/// Continuous overlap quality between two span sets, in `[0, 1]`.
///
/// The intersection is summed over every (reference, candidate) pair, not
/// only over matched pairs, and divided by the smaller of the two total
/// labeled lengths. Both sides empty scores `1.0`; exactly one side empty
/// scores `0.0`. The result is rounded to four decimal places.
pub fn position_accuracy(reference: &[Span], candidate: &[Span]) -> f64 {
    match (reference.is_empty(), candidate.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let denominator = total_length(reference).min(total_length(candidate));
    if denominator == 0 {
        return 0.0;
    }

    let intersection: usize = reference
        .iter()
        .flat_map(|r| candidate.iter().map(move |c| r.overlap_len(c)))
        .sum();

    round4((intersection as f64 / denominator as f64).clamp(0.0, 1.0))
}

/// Round half away from zero to four decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
