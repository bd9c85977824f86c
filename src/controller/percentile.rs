/// Converts a 1-based rank into its 0–100 position within a population of `population` courses.
///
/// Rank 1 stays at the bottom: the upstream table ranks the hardest course first, and
/// that direction carries straight through to the percentile. Halves round to even, the
/// convention the published difficulty tables were built with.
#[must_use]
pub fn percentile(rank: Option<u32>, population: usize) -> Option<u32> {
    let rank = rank?;
    if population == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let scaled = f64::from(rank) / population as f64 * 100.0;
    to_whole(scaled)
}

/// Rounds a mean of percentiles the same way single percentiles are rounded.
#[must_use]
pub fn round_mean(values: &[u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().copied().map(f64::from).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = sum / values.len() as f64;
    to_whole(mean)
}

fn to_whole(value: f64) -> Option<u32> {
    let rounded = value.round_ties_even();
    if !rounded.is_finite() || rounded < 0.0 || rounded > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(rounded as u32)
}
