use crate::error::CatalogError;
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Number of leading characters that identify a course.
pub const PREFIX_LEN: usize = 8;

const DEFAULT_CATALOG: &str = include_str!("../../data/course_catalog.txt");

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Refuse to build a catalog with two names sharing a prefix.
    Reject,
    /// The later name shadows the earlier one; the collision is logged and kept for reporting.
    #[default]
    LastWins,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PrefixCollision {
    pub prefix: String,
    pub shadowed: String,
    pub kept: String,
}

/// Ordered list of canonical course names with a lowercase prefix index.
#[derive(Clone, Debug)]
pub struct CourseCatalog {
    names: Vec<String>,
    index: HashMap<String, usize, RandomState>,
    collisions: Vec<PrefixCollision>,
}

#[must_use]
pub fn prefix_key(name: &str) -> String {
    name.chars().take(PREFIX_LEN).collect::<String>().to_lowercase()
}

impl CourseCatalog {
    /// # Errors
    ///
    /// Returns `CatalogError::PrefixCollision` under `CollisionPolicy::Reject` when two names
    /// share a prefix.
    pub fn from_names<I, S>(names: I, policy: CollisionPolicy) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self {
            names: Vec::new(),
            index: HashMap::with_hasher(RandomState::new()),
            collisions: Vec::new(),
        };
        for name in names {
            let name: String = name.into();
            let key = prefix_key(&name);
            let position = catalog.names.len();
            if let Some(&previous) = catalog.index.get(&key) {
                let shadowed = catalog.names[previous].clone();
                if policy == CollisionPolicy::Reject {
                    return Err(CatalogError::PrefixCollision {
                        prefix: key,
                        first: shadowed,
                        second: name,
                    });
                }
                warn!(prefix = %key, %shadowed, kept = %name, "catalog prefix collision");
                catalog.collisions.push(PrefixCollision {
                    prefix: key.clone(),
                    shadowed,
                    kept: name.clone(),
                });
            }
            catalog.index.insert(key, position);
            catalog.names.push(name);
        }
        Ok(catalog)
    }

    /// The course list that ships with the crate.
    ///
    /// # Errors
    ///
    /// Only under `CollisionPolicy::Reject`, since the shipped list has known collisions.
    pub fn default_pga(policy: CollisionPolicy) -> Result<Self, CatalogError> {
        Self::from_names(parse_catalog_lines(DEFAULT_CATALOG), policy)
    }

    /// One name per line; blank lines and `#` comments are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unreadable` when the file cannot be read, or a collision error
    /// under `CollisionPolicy::Reject`.
    pub fn from_file(path: &Path, policy: CollisionPolicy) -> Result<Self, CatalogError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| CatalogError::Unreadable {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_names(parse_catalog_lines(&contents), policy)
    }

    #[must_use]
    pub fn lookup(&self, raw_name: &str) -> Option<&str> {
        self.index
            .get(&prefix_key(raw_name))
            .map(|&i| self.names[i].as_str())
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn collisions(&self) -> &[PrefixCollision] {
        &self.collisions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn parse_catalog_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Match counts accumulated over one run.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub matched: usize,
    pub unmatched: usize,
    /// Distinct raw names that missed, in first-seen order.
    pub unmatched_names: Vec<String>,
}

impl NormalizationReport {
    pub fn log_summary(&self, label: &str) {
        info!(
            "{label}: {} course names matched, {} unmatched",
            self.matched, self.unmatched
        );
        for name in &self.unmatched_names {
            info!("{label}: no catalog match for {name:?}");
        }
    }
}

/// Resolves raw course names to catalog names. A miss passes the raw name through.
#[derive(Clone, Debug)]
pub struct CourseNameNormalizer {
    catalog: CourseCatalog,
    report: NormalizationReport,
}

impl CourseNameNormalizer {
    #[must_use]
    pub fn new(catalog: CourseCatalog) -> Self {
        Self {
            catalog,
            report: NormalizationReport::default(),
        }
    }

    pub fn normalize(&mut self, raw_name: &str) -> (String, bool) {
        if let Some(canonical) = self.catalog.lookup(raw_name) {
            self.report.matched += 1;
            return (canonical.to_string(), true);
        }
        self.report.unmatched += 1;
        if !self.report.unmatched_names.iter().any(|n| n == raw_name) {
            self.report.unmatched_names.push(raw_name.to_string());
        }
        (raw_name.to_string(), false)
    }

    #[must_use]
    pub fn report(&self) -> &NormalizationReport {
        &self.report
    }

    #[must_use]
    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn into_report(self) -> NormalizationReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_truncate_naturally() {
        let catalog = CourseCatalog::from_names(["TPC", "Le Golf National"], CollisionPolicy::Reject)
            .unwrap();
        assert_eq!(catalog.lookup("tpc"), Some("TPC"));
        assert_eq!(catalog.lookup("LE GOLF NAT."), Some("Le Golf National"));
        assert_eq!(catalog.lookup("TPC Boston"), None);
    }

    #[test]
    fn shipped_catalog_collisions_are_reported() {
        let catalog = CourseCatalog::default_pga(CollisionPolicy::LastWins).unwrap();
        assert_eq!(catalog.len(), 76);
        let prefixes: Vec<&str> = catalog
            .collisions()
            .iter()
            .map(|c| c.prefix.as_str())
            .collect();
        assert_eq!(prefixes, vec!["sea isla", "torrey p"]);
        assert_eq!(
            catalog.lookup("Torrey Pines (South)"),
            Some("Torrey Pines Golf Course (South Course)")
        );
        assert!(CourseCatalog::default_pga(CollisionPolicy::Reject).is_err());
    }
}
