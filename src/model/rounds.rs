use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One player's round at one event, in the shape the rounds JSON file stores it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RoundRecord {
    #[serde(rename = "eventName")]
    pub event_name: String,
    #[serde(rename = "eventId", default, deserialize_with = "crate::coerce::lenient::i64")]
    pub event_id: Option<i64>,
    #[serde(rename = "courseName")]
    pub course_name: String,
    #[serde(rename = "playerName")]
    pub player_name: String,
    #[serde(rename = "dgId", default, deserialize_with = "crate::coerce::lenient::i64")]
    pub dg_id: Option<i64>,
    pub round: u8,
    #[serde(default, deserialize_with = "crate::coerce::lenient::text")]
    pub date: Option<String>,
    #[serde(rename = "teeTime", default, deserialize_with = "crate::coerce::lenient::text")]
    pub tee_time: Option<String>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::i64")]
    pub course_num: Option<i64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::i64")]
    pub course_par: Option<i64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::i64")]
    pub start_hole: Option<i64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::i64")]
    pub score: Option<i64>,
    #[serde(flatten)]
    pub stats: RoundStats,
}

/// Strokes-gained and traditional per-round columns.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RoundStats {
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub sg_app: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub sg_arg: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub sg_ott: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub sg_putt: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub sg_t2g: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub sg_total: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub driving_acc: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub driving_dist: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub gir: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub prox_fw: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub prox_rgh: Option<f64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::f64")]
    pub scrambling: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CourseRounds {
    pub rounds: Vec<RoundRecord>,
}

/// Player name, then course name, then that player's rounds on the course.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct PlayerRounds {
    pub players: BTreeMap<String, BTreeMap<String, CourseRounds>>,
}

impl PlayerRounds {
    pub fn push(&mut self, round: RoundRecord) {
        let course = round.course_name.clone();
        self.push_under(course, round);
    }

    /// Files `round` under `course`, which may differ from the round's own course spelling.
    pub fn push_under(&mut self, course: String, round: RoundRecord) {
        self.players
            .entry(round.player_name.clone())
            .or_default()
            .entry(course)
            .or_default()
            .rounds
            .push(round);
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn rounds(&self) -> impl Iterator<Item = &RoundRecord> {
        self.players
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(|course| course.rounds.iter())
    }

    #[must_use]
    pub fn round_count(&self) -> usize {
        self.rounds().count()
    }
}
