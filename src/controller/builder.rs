use crate::controller::aggregate::{AggregationReport, CategoryAggregator};
use crate::controller::catalog::CourseNameNormalizer;
use crate::controller::tiers::{RankCutoffThresholds, TierStrategy};
use crate::model::{
    Category, CategorySchema, CourseDifficultyRecord, CourseMetricLabels, MetricLabel,
    MetricTable,
};
use ahash::RandomState;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// How an ingestion path keys its records.
pub enum NamePolicy<'a> {
    /// Use the course name exactly as the source wrote it.
    SourceNative,
    /// Resolve every name through the catalog; misses keep the raw name.
    Canonical(&'a mut CourseNameNormalizer),
}

impl NamePolicy<'_> {
    fn resolve(&mut self, raw: &str) -> String {
        match self {
            Self::SourceNative => raw.to_string(),
            Self::Canonical(normalizer) => normalizer.normalize(raw).0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub records: Vec<CourseDifficultyRecord>,
    pub aggregation: AggregationReport,
    /// Course keys that appeared more than once; the later row replaced the earlier.
    pub duplicates: Vec<String>,
}

pub struct CourseDifficultyBuilder {
    aggregator: CategoryAggregator,
    labels: RankCutoffThresholds,
    categories: Vec<Category>,
}

impl CourseDifficultyBuilder {
    #[must_use]
    pub fn new(categories: &[Category]) -> Self {
        Self {
            aggregator: CategoryAggregator::default(),
            labels: RankCutoffThresholds::default(),
            categories: categories.to_vec(),
        }
    }

    #[must_use]
    pub fn with_rank_band(mut self, band: u32) -> Self {
        self.labels = RankCutoffThresholds { band };
        self
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// One record per row in source order. A repeated key overwrites the earlier record in place.
    pub fn build(
        &self,
        table: &MetricTable,
        schema: &CategorySchema,
        mut names: NamePolicy<'_>,
    ) -> BuildOutput {
        let (scores, aggregation) = self.aggregator.score_table(table, schema, &self.categories);

        let mut output = BuildOutput {
            aggregation,
            ..BuildOutput::default()
        };
        let mut positions: HashMap<String, usize, RandomState> =
            HashMap::with_hasher(RandomState::new());

        for (row, row_scores) in table.rows.iter().zip(scores) {
            let key = names.resolve(&row.course_name);
            let record = CourseDifficultyRecord {
                course_name: key.clone(),
                scores: row_scores,
            };
            if let Some(&at) = positions.get(&key) {
                debug!(course = %key, "duplicate course row, keeping the later one");
                output.records[at] = record;
                output.duplicates.push(key);
            } else {
                positions.insert(key, output.records.len());
                output.records.push(record);
            }
        }
        output
    }

    /// Rank-cutoff labels for every metric of the configured categories, one entry per row.
    #[must_use]
    pub fn metric_labels(
        &self,
        table: &MetricTable,
        schema: &CategorySchema,
    ) -> Vec<CourseMetricLabels> {
        let population = table.population();
        let metrics = schema.all_metrics(&self.categories);
        table
            .rows
            .iter()
            .map(|row| {
                let labels: BTreeMap<String, MetricLabel> = metrics
                    .iter()
                    .map(|metric| {
                        let rank = row.rank(metric);
                        let label = MetricLabel {
                            value: row.values.get(*metric).copied().flatten(),
                            rank,
                            difficulty: self.labels.tier_of(rank, population),
                        };
                        ((*metric).to_string(), label)
                    })
                    .collect();
                CourseMetricLabels {
                    course_name: row.course_name.clone(),
                    metrics: labels,
                }
            })
            .collect()
    }
}
