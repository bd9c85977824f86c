use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `supportingStat` / `supportingValue` sub-records of a profile stat.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SupportingValue {
    #[serde(default, deserialize_with = "crate::coerce::lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::text")]
    pub value: Option<String>,
}

/// One player statistic for one season, flattened from the tour's profile feed.
///
/// Optional sub-records are explicit fields; anything the feed adds that is not modelled
/// here survives in `extra`. `category` arrives as a list and is kept comma-joined.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PlayerStat {
    #[serde(default)]
    pub dg_id: Option<i64>,
    #[serde(default)]
    pub player_first_name: Option<String>,
    #[serde(default)]
    pub player_last_name: Option<String>,
    #[serde(default)]
    pub player_full_name: Option<String>,
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::text")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::text")]
    pub rank: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "crate::coerce::lenient::text")]
    pub category: Option<String>,
    #[serde(default, rename = "aboveOrBelow")]
    pub above_or_below: Option<String>,
    #[serde(
        default,
        rename = "fieldAverage",
        deserialize_with = "crate::coerce::lenient::text"
    )]
    pub field_average: Option<String>,
    #[serde(default, rename = "statId")]
    pub stat_id: Option<String>,
    #[serde(default, rename = "supportingStat")]
    pub supporting_stat: Option<SupportingValue>,
    #[serde(default, rename = "supportingValue")]
    pub supporting_value: Option<SupportingValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerStat {
    #[must_use]
    pub fn supporting_stat_description(&self) -> Option<&str> {
        self.supporting_stat
            .as_ref()
            .and_then(|s| s.description.as_deref())
    }

    #[must_use]
    pub fn supporting_stat_value(&self) -> Option<&str> {
        self.supporting_stat.as_ref().and_then(|s| s.value.as_deref())
    }

    #[must_use]
    pub fn supporting_value_description(&self) -> Option<&str> {
        self.supporting_value
            .as_ref()
            .and_then(|s| s.description.as_deref())
    }

    #[must_use]
    pub fn supporting_value_value(&self) -> Option<&str> {
        self.supporting_value
            .as_ref()
            .and_then(|s| s.value.as_deref())
    }
}

/// A tour player as listed by the ranking feed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RankedPlayer {
    pub name: String,
    pub dg_id: i64,
}

/// An active player from the tour's player directory.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TourPlayer {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub headshot: Option<String>,
    #[serde(default, rename = "isActive")]
    pub is_active: bool,
}

impl TourPlayer {
    /// `"Last, First"` with each part title-cased, the form the ranking feed uses.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}, {}", title_case(&self.last_name), title_case(&self.first_name))
    }
}

fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for c in input.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_is_title_cased() {
        let player = TourPlayer {
            id: "46046".into(),
            first_name: "scottie".into(),
            last_name: "SCHEFFLER".into(),
            headshot: None,
            is_active: true,
        };
        assert_eq!(player.full_name(), "Scheffler, Scottie");

        let player = TourPlayer {
            id: "1".into(),
            first_name: "Byeong hun".into(),
            last_name: "an".into(),
            headshot: None,
            is_active: true,
        };
        assert_eq!(player.full_name(), "An, Byeong Hun");
    }
}
