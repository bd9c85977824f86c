use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Driving,
    Scoring,
    Approach,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Driving, Category::Scoring, Category::Approach];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Driving => "driving",
            Category::Scoring => "scoring",
            Category::Approach => "approach",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(Category::Driving),
            "scoring" => Ok(Category::Scoring),
            "approach" => Ok(Category::Approach),
            other => Err(format!("unknown category {other:?}")),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Hard,
    Medium,
    Easy,
}

impl DifficultyTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyTier::Hard => "hard",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Easy => "easy",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hard" => Ok(DifficultyTier::Hard),
            "medium" => Ok(DifficultyTier::Medium),
            "easy" => Ok(DifficultyTier::Easy),
            other => Err(format!("unknown difficulty tier {other:?}")),
        }
    }
}

/// Composite percentile and tier for one category of one course.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CategoryScore {
    pub percentile: Option<u32>,
    pub tier: Option<DifficultyTier>,
}
