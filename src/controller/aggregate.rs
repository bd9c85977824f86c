use crate::controller::percentile::{percentile, round_mean};
use crate::controller::tiers::{CompositeThresholds, TierStrategy};
use crate::model::{Category, CategorySchema, CategoryScore, MetricTable};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// What the aggregator had to skip while scoring a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    pub skipped_categories: Vec<Category>,
    pub missing_rank_columns: Vec<String>,
}

/// Averages metric percentiles into one composite per category and grades it.
pub struct CategoryAggregator<T: TierStrategy = CompositeThresholds> {
    strategy: T,
}

impl Default for CategoryAggregator<CompositeThresholds> {
    fn default() -> Self {
        Self::new(CompositeThresholds::default())
    }
}

impl<T: TierStrategy> CategoryAggregator<T> {
    pub fn new(strategy: T) -> Self {
        Self { strategy }
    }

    /// Composite of the percentiles that are present. All missing gives `None` for both the
    /// percentile and the tier; a missing composite never gets a default tier.
    pub fn composite(&self, category: Category, percentiles: &[Option<u32>]) -> CategoryScore {
        let present: Vec<u32> = percentiles.iter().flatten().copied().collect();
        let Some(composite) = round_mean(&present) else {
            debug!(%category, "no metric percentiles present");
            return CategoryScore::default();
        };
        CategoryScore {
            percentile: Some(composite),
            tier: Some(self.strategy.tier(composite, 0)),
        }
    }

    /// Scores every row of `table` for each of `categories`, in row order.
    ///
    /// A category the schema does not define is skipped with a warning and scores
    /// null/null for every course. A metric with no rank column at all contributes nothing.
    pub fn score_table(
        &self,
        table: &MetricTable,
        schema: &CategorySchema,
        categories: &[Category],
    ) -> (Vec<BTreeMap<Category, CategoryScore>>, AggregationReport) {
        let mut report = AggregationReport::default();
        let population = table.population();

        let mut usable: HashMap<&str, bool> = HashMap::new();
        for metric in schema.all_metrics(categories) {
            let present = table.has_rank_column(metric);
            if !present && !report.missing_rank_columns.iter().any(|m| m == metric) {
                warn!(metric, "rank column not found, metric skipped");
                report.missing_rank_columns.push(metric.to_string());
            }
            usable.insert(metric, present);
        }

        for category in categories {
            if schema.metrics_for(*category).is_none() {
                warn!(%category, "category missing from source schema, composite skipped");
                report.skipped_categories.push(*category);
            }
        }

        let scores = table
            .rows
            .iter()
            .map(|row| {
                categories
                    .iter()
                    .map(|category| {
                        let score = match schema.metrics_for(*category) {
                            Some(metrics) => {
                                let percentiles: Vec<Option<u32>> = metrics
                                    .iter()
                                    .filter(|m| usable.get(m.as_str()).copied().unwrap_or(false))
                                    .map(|m| percentile(row.rank(m), population))
                                    .collect();
                                self.composite(*category, &percentiles)
                            }
                            None => CategoryScore::default(),
                        };
                        (*category, score)
                    })
                    .collect()
            })
            .collect();

        (scores, report)
    }
}
