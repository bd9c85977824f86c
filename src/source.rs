//! Remote feeds behind small traits so the run can be driven from fixtures.
//!
//! Every fetch unit (one event's rounds, one player's profile) fails on its own: the
//! error is logged and the collection continues with the next unit. Listing failures
//! (rankings, event list, player directory) end the fetch.

pub mod course_table;
pub mod datagolf;
pub mod pga;

use crate::error::SourceError;
use crate::model::{PlayerStat, RankedPlayer, RoundRecord, TourPlayer};
use tracing::{info, warn};

pub use course_table::{CourseTable, CourseTableSource, HttpCourseTable};
pub use datagolf::{DataGolfClient, EventSummary};
pub use pga::PgaTourClient;

pub trait RoundsSource {
    /// # Errors
    ///
    /// Network or parse failure of the rankings feed.
    fn ranked_players(&self) -> Result<Vec<RankedPlayer>, SourceError>;

    /// Completed events of `year` that carry both traditional and strokes-gained stats.
    ///
    /// # Errors
    ///
    /// Network or parse failure of the event list.
    fn events(&self, year: i32) -> Result<Vec<EventSummary>, SourceError>;

    /// # Errors
    ///
    /// Network or parse failure for this one event.
    fn event_rounds(&self, event: &EventSummary) -> Result<Vec<RoundRecord>, SourceError>;
}

pub trait PlayerStatsSource {
    /// Active players only.
    ///
    /// # Errors
    ///
    /// Network or parse failure of the directory.
    fn players(&self) -> Result<Vec<TourPlayer>, SourceError>;

    /// # Errors
    ///
    /// Network or parse failure for this one player.
    fn player_stats(&self, player: &TourPlayer, year: i32) -> Result<Vec<PlayerStat>, SourceError>;
}

/// All rounds of every listed event. An event whose rounds cannot be fetched is skipped.
///
/// # Errors
///
/// Only when the event list itself is unavailable.
pub fn collect_rounds<R: RoundsSource + ?Sized>(
    source: &R,
    year: i32,
) -> Result<Vec<RoundRecord>, SourceError> {
    let events = source.events(year)?;
    let total = events.len();
    let mut rounds = Vec::new();
    for (done, event) in events.iter().enumerate() {
        match source.event_rounds(event) {
            Ok(event_rounds) => {
                info!(
                    "fetched {} rounds for {} ({}/{total})",
                    event_rounds.len(),
                    event.event_name,
                    done + 1
                );
                rounds.extend(event_rounds);
            }
            Err(e) => warn!("failed to fetch rounds for event {}: {e}", event.event_id),
        }
    }
    Ok(rounds)
}

/// Profile stats of every directory player, or of the first `limit` players.
///
/// Each stat is stamped with the player's ids, names and the requested year.
///
/// # Errors
///
/// Only when the player directory is unavailable.
pub fn collect_player_stats<P: PlayerStatsSource + ?Sized>(
    source: &P,
    year: i32,
    limit: Option<usize>,
) -> Result<Vec<PlayerStat>, SourceError> {
    let players = source.players()?;
    let take = limit.unwrap_or(players.len()).min(players.len());
    let mut all = Vec::new();
    for (done, player) in players.iter().take(take).enumerate() {
        let label = format!("{}_{}", player.first_name, player.last_name);
        match source.player_stats(player, year) {
            Ok(stats) => {
                let full_name = player.full_name();
                all.extend(stats.into_iter().map(|mut stat| {
                    stat.player_id = Some(player.id.clone());
                    stat.player_first_name = Some(player.first_name.clone());
                    stat.player_last_name = Some(player.last_name.clone());
                    stat.player_full_name = Some(full_name.clone());
                    stat.year = Some(i64::from(year));
                    stat
                }));
                info!("fetched stats for {label} ({}/{take})", done + 1);
            }
            Err(e) => warn!("failed for {label}: {e}"),
        }
    }
    Ok(all)
}
