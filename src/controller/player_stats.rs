use crate::model::{PlayerStat, RankedPlayer};
use ahash::RandomState;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Birdie, bogey-avoidance and par-N scoring stats.
pub const DEFAULT_RELEVANT_STAT_IDS: &[&str] = &[
    "02414", "107", "115", "155", "156", "352", "142", "143", "144", "112", "113", "114",
];

/// The set of stat ids worth keeping from a player's profile.
#[derive(Clone, Debug)]
pub struct StatSelection {
    ids: HashSet<String, RandomState>,
}

impl Default for StatSelection {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANT_STAT_IDS.iter().copied())
    }
}

impl StatSelection {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = HashSet::with_hasher(RandomState::new());
        set.extend(ids.into_iter().map(Into::into));
        Self { ids: set }
    }

    #[must_use]
    pub fn contains(&self, stat_id: Option<&str>) -> bool {
        stat_id.is_some_and(|id| self.ids.contains(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Lowercased `"Last, First"` to ranking id.
#[must_use]
pub fn dg_id_index(ranked: &[RankedPlayer]) -> HashMap<String, i64, RandomState> {
    let mut index = HashMap::with_capacity_and_hasher(ranked.len(), RandomState::new());
    for player in ranked {
        index.insert(player.name.to_lowercase(), player.dg_id);
    }
    index
}

/// Keeps the selected stats and attaches each player's ranking id by full name.
#[must_use]
pub fn process_player_stats(
    raw: Vec<PlayerStat>,
    ranked: &[RankedPlayer],
    selection: &StatSelection,
) -> Vec<PlayerStat> {
    let index = dg_id_index(ranked);
    let total = raw.len();
    let kept: Vec<PlayerStat> = raw
        .into_iter()
        .filter(|stat| selection.contains(stat.stat_id.as_deref()))
        .map(|mut stat| {
            stat.dg_id = stat
                .player_full_name
                .as_deref()
                .and_then(|name| index.get(&name.to_lowercase()).copied());
            stat
        })
        .collect();
    info!("kept {}/{} player stats", kept.len(), total);
    kept
}
