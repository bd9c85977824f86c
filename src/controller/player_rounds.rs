use crate::controller::catalog::CourseNameNormalizer;
use crate::model::{PlayerRounds, RoundRecord};
use ahash::RandomState;
use std::collections::HashSet;
use tracing::info;

/// Course names from the rounds feed that duplicate another spelling or are not tour stops.
pub const DEFAULT_COURSE_BLACKLIST: &[&str] = &[
    "Colonial CC",
    "Conway Farms GC",
    "Eagle Point Golf Club",
    "Innisbrook Resort (Copperhead Course)",
    "Keene Trace Golf Club",
    "Keene Trace Golf Club (Champion Trace)",
    "Keene Trace Golf Club (Champions Course)",
    "Muirfield Village GC",
    "Olympia Fields CC (North)",
    "PGA National (Champion)",
    "RTJ Trail (Grand National)",
    "Riviera CC",
    "Sedgefield CC",
    "Silverado Resort & Spa (North)",
    "Silverado Resort (North Course)",
    "Silverado Resort and Spa North",
    "TPC Four Seasons Resort",
    "TPC San Antonio - AT&T Oaks",
    "TPC Sawgrass",
    "TPC Scottsdale",
    "The Dunes Golf and Beach Club",
    "The Los Angeles Country Club (North Course)",
    "The Summit Club",
    "Valhalla GC",
    "Valhalla Golf Club",
    "Waialae CC",
];

/// Groups rounds by player and course, dropping blacklisted courses.
pub struct RoundGrouper<'a> {
    blacklist: HashSet<String, RandomState>,
    normalizer: Option<&'a mut CourseNameNormalizer>,
    skipped: usize,
}

impl<'a> RoundGrouper<'a> {
    pub fn new<I, S>(blacklist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = HashSet::with_hasher(RandomState::new());
        set.extend(blacklist.into_iter().map(Into::into));
        Self {
            blacklist: set,
            normalizer: None,
            skipped: 0,
        }
    }

    /// Keys courses by catalog name instead of the feed's spelling.
    #[must_use]
    pub fn normalize_with(mut self, normalizer: &'a mut CourseNameNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// The blacklist is checked against the feed's spelling, before normalization.
    pub fn group<I>(&mut self, rounds: I) -> PlayerRounds
    where
        I: IntoIterator<Item = RoundRecord>,
    {
        let mut grouped = PlayerRounds::default();
        for round in rounds {
            if self.blacklist.contains(&round.course_name) {
                self.skipped += 1;
                continue;
            }
            let course = match self.normalizer.as_deref_mut() {
                Some(normalizer) => normalizer.normalize(&round.course_name).0,
                None => round.course_name.clone(),
            };
            grouped.push_under(course, round);
        }
        info!(
            "grouped {} rounds for {} players, {} blacklisted rounds skipped",
            grouped.round_count(),
            grouped.player_count(),
            self.skipped
        );
        grouped
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::catalog::{CollisionPolicy, CourseCatalog};

    fn round(player: &str, course: &str, n: u8) -> RoundRecord {
        RoundRecord {
            player_name: player.into(),
            course_name: course.into(),
            round: n,
            ..RoundRecord::default()
        }
    }

    #[test]
    fn blacklisted_courses_are_dropped() {
        let mut grouper = RoundGrouper::new(DEFAULT_COURSE_BLACKLIST.iter().copied());
        let grouped = grouper.group(vec![
            round("Woods, Tiger", "Augusta National Golf Club", 1),
            round("Woods, Tiger", "TPC Sawgrass", 1),
            round("Woods, Tiger", "Augusta National Golf Club", 2),
        ]);
        assert_eq!(grouped.round_count(), 2);
        assert_eq!(grouper.skipped(), 1);
        assert_eq!(
            grouped.players["Woods, Tiger"]["Augusta National Golf Club"]
                .rounds
                .len(),
            2
        );
    }

    #[test]
    fn normalized_keys_use_catalog_names() {
        let catalog =
            CourseCatalog::from_names(["Pebble Beach Golf Links"], CollisionPolicy::Reject)
                .unwrap();
        let mut normalizer = CourseNameNormalizer::new(catalog);
        let grouped = RoundGrouper::new(Vec::<String>::new())
            .normalize_with(&mut normalizer)
            .group(vec![round("Lowry, Shane", "Pebble Beach GL", 1)]);
        assert!(grouped.players["Lowry, Shane"].contains_key("Pebble Beach Golf Links"));
        assert_eq!(normalizer.report().matched, 1);
    }
}
