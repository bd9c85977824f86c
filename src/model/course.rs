use crate::model::types::{Category, CategoryScore, DifficultyTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One course of the source table: raw metric values plus their 1-based ranks.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CourseRow {
    pub course_name: String,
    pub values: BTreeMap<String, Option<f64>>,
    pub ranks: BTreeMap<String, u32>,
}

impl CourseRow {
    #[must_use]
    pub fn new(course_name: impl Into<String>) -> Self {
        Self {
            course_name: course_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_metric(mut self, metric: &str, value: Option<f64>, rank: Option<u32>) -> Self {
        self.values.insert(metric.to_string(), value);
        if let Some(rank) = rank {
            self.ranks.insert(metric.to_string(), rank);
        }
        self
    }

    #[must_use]
    pub fn rank(&self, metric: &str) -> Option<u32> {
        self.ranks.get(metric).copied()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MetricTable {
    pub rows: Vec<CourseRow>,
}

impl MetricTable {
    #[must_use]
    pub fn new(rows: Vec<CourseRow>) -> Self {
        Self { rows }
    }

    /// Number of ranked courses; the denominator for every percentile in this table.
    #[must_use]
    pub fn population(&self) -> usize {
        self.rows.len()
    }

    /// True when at least one row carries a rank for `metric`.
    #[must_use]
    pub fn has_rank_column(&self, metric: &str) -> bool {
        self.rows.iter().any(|row| row.ranks.contains_key(metric))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Category name to the ordered metric columns belonging to it, as published by the source.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySchema {
    columns: BTreeMap<String, Vec<String>>,
}

impl CategorySchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: &str, metrics: &[&str]) -> Self {
        self.insert(category, metrics.iter().map(ToString::to_string).collect());
        self
    }

    pub fn insert(&mut self, category: &str, metrics: Vec<String>) {
        self.columns.insert(category.to_ascii_lowercase(), metrics);
    }

    #[must_use]
    pub fn metrics_for(&self, category: Category) -> Option<&[String]> {
        self.columns.get(category.as_str()).map(Vec::as_slice)
    }

    /// Metrics of every listed category that the schema knows, in category order.
    #[must_use]
    pub fn all_metrics(&self, categories: &[Category]) -> Vec<&str> {
        categories
            .iter()
            .filter_map(|category| self.metrics_for(*category))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Every column of every category the source published, known to this crate or not.
    pub fn all_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.values().flatten().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CourseDifficultyRecord {
    pub course_name: String,
    pub scores: BTreeMap<Category, CategoryScore>,
}

impl CourseDifficultyRecord {
    #[must_use]
    pub fn new(course_name: impl Into<String>) -> Self {
        Self {
            course_name: course_name.into(),
            scores: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn score(&self, category: Category) -> CategoryScore {
        self.scores.get(&category).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn percentile(&self, category: Category) -> Option<u32> {
        self.score(category).percentile
    }

    #[must_use]
    pub fn tier(&self, category: Category) -> Option<DifficultyTier> {
        self.score(category).tier
    }
}

/// Per-course rank-cutoff labels for every metric of every category, used by the extended report.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CourseMetricLabels {
    pub course_name: String,
    pub metrics: BTreeMap<String, MetricLabel>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct MetricLabel {
    pub value: Option<f64>,
    pub rank: Option<u32>,
    pub difficulty: Option<DifficultyTier>,
}
