use super::RoundsSource;
use crate::error::SourceError;
use crate::model::{RankedPlayer, RoundRecord};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DATAGOLF_FEEDS_URL: &str = "https://feeds.datagolf.com";

#[derive(Deserialize, Debug)]
struct RankingsResponse {
    rankings: Vec<RankingEntry>,
}

#[derive(Deserialize, Debug)]
struct RankingEntry {
    player_name: String,
    dg_id: i64,
    #[serde(default)]
    primary_tour: Option<String>,
}

/// One entry of the historical event list.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventSummary {
    pub event_id: i64,
    pub event_name: String,
    pub calendar_year: i32,
    #[serde(default)]
    pub tour: String,
    #[serde(default)]
    pub traditional_stats: String,
    #[serde(default)]
    pub sg_categories: String,
}

impl EventSummary {
    /// A PGA Tour event of `year` with traditional and strokes-gained stats.
    #[must_use]
    pub fn is_complete_pga(&self, year: i32) -> bool {
        self.tour == "pga"
            && self.traditional_stats == "yes"
            && self.sg_categories == "yes"
            && self.calendar_year == year
    }
}

/// Raw response of the per-event rounds feed.
#[derive(Deserialize, Debug, Default)]
pub struct EventRounds {
    #[serde(default, deserialize_with = "crate::coerce::lenient::text")]
    pub event_completed: Option<String>,
    #[serde(default)]
    pub scores: Vec<Map<String, Value>>,
}

/// Flattens each player's `round_N` objects into round records.
///
/// # Errors
///
/// `SourceError::Json` when a round object has a field of the wrong shape.
pub fn rounds_from_event(
    event: &EventSummary,
    payload: &EventRounds,
) -> Result<Vec<RoundRecord>, SourceError> {
    let mut rounds = Vec::new();
    for score in &payload.scores {
        let Some(player_name) = score.get("player_name").and_then(Value::as_str) else {
            continue;
        };
        for (key, info) in score {
            let Some(number) = key.strip_prefix("round_").and_then(|n| n.parse::<u8>().ok())
            else {
                continue;
            };
            let Some(info) = info.as_object() else {
                continue;
            };
            let mut record = info.clone();
            record.insert("eventName".into(), Value::from(event.event_name.as_str()));
            record.insert("eventId".into(), Value::from(event.event_id));
            record.insert(
                "courseName".into(),
                info.get("course_name").cloned().unwrap_or_default(),
            );
            record.insert("playerName".into(), Value::from(player_name));
            record.insert("dgId".into(), score.get("dg_id").cloned().unwrap_or_default());
            record.insert("round".into(), Value::from(number));
            record.insert(
                "date".into(),
                payload.event_completed.clone().map_or(Value::Null, Value::from),
            );
            record.insert(
                "teeTime".into(),
                info.get("teetime").cloned().unwrap_or_default(),
            );
            rounds.push(serde_json::from_value(Value::Object(record))?);
        }
    }
    Ok(rounds)
}

pub struct DataGolfClient {
    http: reqwest::blocking::Client,
    base_url: String,
    key: String,
}

impl DataGolfClient {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self::with_base_url(DATAGOLF_FEEDS_URL, key)
    }

    #[must_use]
    pub fn with_base_url(base_url: &str, key: &str) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let mut query: Vec<(&str, String)> = vec![
            ("file_format", "json".to_string()),
            ("key", self.key.clone()),
        ];
        query.extend(params.iter().cloned());
        let body = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .query(&query)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl RoundsSource for DataGolfClient {
    fn ranked_players(&self) -> Result<Vec<RankedPlayer>, SourceError> {
        let response: RankingsResponse = self.get_json("preds/get-dg-rankings", &[])?;
        Ok(response
            .rankings
            .into_iter()
            .filter(|p| p.primary_tour.as_deref() == Some("PGA"))
            .map(|p| RankedPlayer {
                name: p.player_name,
                dg_id: p.dg_id,
            })
            .collect())
    }

    fn events(&self, year: i32) -> Result<Vec<EventSummary>, SourceError> {
        let events: Vec<EventSummary> = self.get_json("historical-raw-data/event-list", &[])?;
        Ok(events
            .into_iter()
            .filter(|e| e.is_complete_pga(year))
            .collect())
    }

    fn event_rounds(&self, event: &EventSummary) -> Result<Vec<RoundRecord>, SourceError> {
        let payload: EventRounds = self.get_json(
            "historical-raw-data/rounds",
            &[
                ("tour", "pga".to_string()),
                ("event_id", event.event_id.to_string()),
                ("year", event.calendar_year.to_string()),
            ],
        )?;
        rounds_from_event(event, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_keys_become_records() {
        let event = EventSummary {
            event_id: 14,
            event_name: "Masters Tournament".into(),
            calendar_year: 2025,
            tour: "pga".into(),
            traditional_stats: "yes".into(),
            sg_categories: "yes".into(),
        };
        let payload: EventRounds = serde_json::from_value(json!({
            "event_completed": "2025-04-13",
            "scores": [{
                "player_name": "McIlroy, Rory",
                "dg_id": 10091,
                "fin_text": "1",
                "round_1": {"course_name": "Augusta National Golf Club", "score": 72,
                            "sg_total": 1.25, "teetime": "10:31am", "gir": "N/A"},
                "round_2": {"course_name": "Augusta National Golf Club", "score": 66},
                "round_3": null
            }]
        }))
        .unwrap();
        let rounds = rounds_from_event(&event, &payload).unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].round, 1);
        assert_eq!(rounds[0].dg_id, Some(10091));
        assert_eq!(rounds[0].tee_time.as_deref(), Some("10:31am"));
        assert_eq!(rounds[0].stats.sg_total, Some(1.25));
        assert_eq!(rounds[0].stats.gir, None);
        assert_eq!(rounds[1].score, Some(66));
        assert_eq!(rounds[1].date.as_deref(), Some("2025-04-13"));
    }
}
