use super::PlayerStatsSource;
use crate::error::SourceError;
use crate::model::{PlayerStat, TourPlayer};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Value, json};

pub const PGA_GRAPHQL_URL: &str = "https://orchestrator.pgatour.com/graphql";

const PLAYER_DIRECTORY_QUERY: &str = r"
query PlayerDirectory($tourCode: TourCode!, $active: Boolean) {
  playerDirectory(tourCode: $tourCode, active: $active) {
    players { id isActive firstName lastName headshot }
  }
}";

const PROFILE_STATS_QUERY: &str = r"
query ProfileStatsFullV2($playerId: ID!, $year: Int) {
  playerProfileStatsFullV2(playerId: $playerId, year: $year) {
    playerProfileStatsFull {
      stats {
        statId rank value title category aboveOrBelow fieldAverage
        supportingStat { description value }
        supportingValue { description value }
      }
    }
  }
}";

#[derive(Deserialize, Debug)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct DirectoryData {
    player_directory: Directory,
}

#[derive(Deserialize, Debug)]
struct Directory {
    players: Vec<TourPlayer>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ProfileData {
    player_profile_stats_full_v2: Option<ProfileStats>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ProfileStats {
    #[serde(default)]
    player_profile_stats_full: Vec<ProfileSection>,
}

#[derive(Deserialize, Debug)]
struct ProfileSection {
    #[serde(default)]
    stats: Vec<PlayerStat>,
}

/// Client for the tour's public GraphQL endpoint.
pub struct PgaTourClient {
    http: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl PgaTourClient {
    #[must_use]
    pub fn new(api_key: &str) -> Self {
        Self::with_url(PGA_GRAPHQL_URL, api_key)
    }

    #[must_use]
    pub fn with_url(url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            url: url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn post(&self, operation: &str, query: &str, variables: Value) -> Result<String, SourceError> {
        let body = json!({
            "operationName": operation,
            "variables": variables,
            "query": query,
        });
        let text = self
            .http
            .post(&self.url)
            .header("accept", "*/*")
            .header("x-api-key", &self.api_key)
            .header("x-pgat-platform", "web")
            .json(&body)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(text)
    }
}

fn unwrap_response<T: DeserializeOwned>(operation: &str, text: &str) -> Result<T, SourceError> {
    let response: GraphQlResponse<T> = serde_json::from_str(text)?;
    if let Some(first) = response.errors.first() {
        return Err(SourceError::Parse(format!("{operation}: {first}")));
    }
    response
        .data
        .ok_or_else(|| SourceError::NotFound(format!("{operation} returned no data")))
}

/// Stats of every profile section, flattened in section order.
///
/// # Errors
///
/// `SourceError::Json` for a malformed body, `Parse` for GraphQL errors.
pub fn parse_profile_stats(text: &str) -> Result<Vec<PlayerStat>, SourceError> {
    let data: ProfileData = unwrap_response("ProfileStatsFullV2", text)?;
    Ok(data
        .player_profile_stats_full_v2
        .into_iter()
        .flat_map(|p| p.player_profile_stats_full)
        .flat_map(|section| section.stats)
        .collect())
}

impl PlayerStatsSource for PgaTourClient {
    fn players(&self) -> Result<Vec<TourPlayer>, SourceError> {
        let text = self.post(
            "PlayerDirectory",
            PLAYER_DIRECTORY_QUERY,
            json!({ "tourCode": "R" }),
        )?;
        let data: DirectoryData = unwrap_response("PlayerDirectory", &text)?;
        Ok(data
            .player_directory
            .players
            .into_iter()
            .filter(|p| p.is_active)
            .collect())
    }

    fn player_stats(&self, player: &TourPlayer, year: i32) -> Result<Vec<PlayerStat>, SourceError> {
        let text = self.post(
            "ProfileStatsFullV2",
            PROFILE_STATS_QUERY,
            json!({ "playerId": player.id, "year": year }),
        )?;
        parse_profile_stats(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_stats_flatten_and_keep_supporting_values() {
        let body = r#"{"data":{"playerProfileStatsFullV2":{"playerProfileStatsFull":[
            {"stats":[{"statId":"115","rank":"T12","value":"31.25%","title":"Birdie or Better Conversion",
                       "category":["SCORING"],"aboveOrBelow":"ABOVE","fieldAverage":"29.1%",
                       "supportingStat":{"description":"Birdies","value":"250"},"supportingValue":null}]},
            {"stats":[{"statId":"156","rank":"3","value":4.12,"title":"Birdie Average"}]}
        ]}}}"#;
        let stats = parse_profile_stats(body).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category.as_deref(), Some("SCORING"));
        assert_eq!(stats[0].supporting_stat_value(), Some("250"));
        assert_eq!(stats[0].supporting_value, None);
        assert_eq!(stats[1].value.as_deref(), Some("4.12"));
    }

    #[test]
    fn graphql_errors_surface() {
        let body = r#"{"data":null,"errors":[{"message":"throttled"}]}"#;
        assert!(matches!(
            parse_profile_stats(body),
            Err(SourceError::Parse(_))
        ));
    }
}
