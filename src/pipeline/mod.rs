// Call analytics pipeline: ingestion, processing, and export

pub mod export;
pub mod ingestion;
pub mod processing;

use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use crate::config::AnalyticsConfig;
use crate::domain::{AttributedRecord, CallRecord, DateRange, RawCallRow};
use crate::error::Result;
use processing::attribute::Attributor;
use processing::normalize::{CallNormalizer, NormalizationStats};

/// Everything the pipeline derived from one input export
#[derive(Debug, Clone)]
pub struct ProcessedCalls {
    pub calls: Vec<CallRecord>,
    pub attributed: Vec<AttributedRecord>,
    pub stats: NormalizationStats,
}

/// The calls and attributed records that fall inside a date range
#[derive(Debug, Clone)]
pub struct FilteredCalls {
    pub range: Option<DateRange>,
    pub calls: Vec<CallRecord>,
    pub attributed: Vec<AttributedRecord>,
}

impl ProcessedCalls {
    /// Range spanning the first to the last call date
    pub fn full_range(&self) -> Option<DateRange> {
        DateRange::spanning(&self.calls)
    }

    /// Turn user-supplied bounds into a range, filling open ends from the data.
    ///
    /// Only two explicit bounds can be inverted. A single bound past the data
    /// yields a range with no calls in it, and no bounds keeps everything.
    pub fn resolve_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Option<DateRange>> {
        let full = self.full_range();
        let range = match (from, to) {
            (Some(start), Some(end)) => DateRange::new(start, end)?,
            (Some(start), None) => {
                let end = full.map_or(start, |r| r.end.max(start));
                DateRange::new(start, end)?
            }
            (None, Some(end)) => {
                let start = full.map_or(end, |r| r.start.min(end));
                DateRange::new(start, end)?
            }
            (None, None) => return Ok(None),
        };
        Ok(Some(range))
    }

    /// Restrict both tables to `range`; `None` keeps everything
    pub fn filter(&self, range: Option<DateRange>) -> FilteredCalls {
        let Some(range) = range else {
            return FilteredCalls {
                range: self.full_range(),
                calls: self.calls.clone(),
                attributed: self.attributed.clone(),
            };
        };

        FilteredCalls {
            range: Some(range),
            calls: self
                .calls
                .iter()
                .filter(|c| range.contains(c.call_date()))
                .cloned()
                .collect(),
            attributed: self
                .attributed
                .iter()
                .filter(|a| range.contains(a.record().call_date()))
                .cloned()
                .collect(),
        }
    }
}

pub struct Pipeline {
    normalizer: CallNormalizer,
    attributor: Attributor,
    config: AnalyticsConfig,
}

impl Pipeline {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            normalizer: CallNormalizer::new(config.alias_map()),
            attributor: Attributor::new(config.attribution_config()),
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Normalize and attribute rows that are already in memory
    pub fn process(&self, rows: &[RawCallRow]) -> ProcessedCalls {
        let batch = self.normalizer.normalize(rows);
        let attributed = self.attributor.attribute_batch(&batch.records);

        ProcessedCalls {
            calls: batch.records,
            attributed,
            stats: batch.stats,
        }
    }

    /// Load a CSV export from disk and process it
    pub fn run(&self, input: &Path) -> Result<ProcessedCalls> {
        let rows = ingestion::load_calls(input, &self.config.columns)?;
        let processed = self.process(&rows);
        info!(
            calls = processed.calls.len(),
            attributed = processed.attributed.len(),
            "Pipeline finished"
        );
        Ok(processed)
    }
}
