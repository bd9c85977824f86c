use crate::model::DifficultyTier;

/// Maps a number to a difficulty tier.
///
/// The two strategies are not interchangeable. Composite percentiles use fixed percentile
/// cutoffs; raw per-metric ranks use a band at each end of the ranking.
pub trait TierStrategy {
    fn name(&self) -> &'static str;

    /// `value` is whatever the strategy grades (a percentile or a rank); `population` is the
    /// number of ranked courses.
    fn tier(&self, value: u32, population: usize) -> DifficultyTier;

    fn tier_of(&self, value: Option<u32>, population: usize) -> Option<DifficultyTier> {
        value.map(|v| self.tier(v, population))
    }
}

/// Cutoffs for category composites: `hard` at or below 20, `easy` at or above 80.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeThresholds {
    pub hard_at_or_below: u32,
    pub easy_at_or_above: u32,
}

impl Default for CompositeThresholds {
    fn default() -> Self {
        Self {
            hard_at_or_below: 20,
            easy_at_or_above: 80,
        }
    }
}

impl TierStrategy for CompositeThresholds {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn tier(&self, percentile: u32, _population: usize) -> DifficultyTier {
        if percentile <= self.hard_at_or_below {
            DifficultyTier::Hard
        } else if percentile >= self.easy_at_or_above {
            DifficultyTier::Easy
        } else {
            DifficultyTier::Medium
        }
    }
}

/// Cutoffs for a single metric's rank: the top `band` ranks are `hard`, the bottom `band`
/// are `easy`. When the table is so small the bands overlap, `hard` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankCutoffThresholds {
    pub band: u32,
}

impl Default for RankCutoffThresholds {
    fn default() -> Self {
        Self { band: 5 }
    }
}

impl TierStrategy for RankCutoffThresholds {
    fn name(&self) -> &'static str {
        "rank_cutoff"
    }

    fn tier(&self, rank: u32, population: usize) -> DifficultyTier {
        let population = u32::try_from(population).unwrap_or(u32::MAX);
        if rank <= self.band {
            DifficultyTier::Hard
        } else if rank > population.saturating_sub(self.band) {
            DifficultyTier::Easy
        } else {
            DifficultyTier::Medium
        }
    }
}
