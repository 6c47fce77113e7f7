//! Pipeline metrics recorded through the `metrics` facade.
//!
//! `call_analytics --metrics` installs a Prometheus recorder with [`init`] and
//! prints its text rendering to stderr on exit. Without a recorder every call
//! below is a no-op.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::{info, warn};

/// Enum representing all metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Ingest metrics
    IngestRowsLoaded,

    // Normalize metrics
    NormalizeRowsKept,
    NormalizeRowsDropped,
    NormalizeInvalidTalkTime,
    NormalizeInvalidCallEnd,
    NormalizeAliasesApplied,

    // Attribute metrics
    AttributeRecordsEmitted,
    AttributeFanOutRatio,

    // Aggregate metrics
    AggregateAgents,
    AggregateOutlierDays,

    // Export metrics
    ExportRowsWritten,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::IngestRowsLoaded => "calls_ingest_rows_loaded_total",

            MetricName::NormalizeRowsKept => "calls_normalize_rows_kept_total",
            MetricName::NormalizeRowsDropped => "calls_normalize_rows_dropped_total",
            MetricName::NormalizeInvalidTalkTime => "calls_normalize_invalid_talk_time_total",
            MetricName::NormalizeInvalidCallEnd => "calls_normalize_invalid_call_end_total",
            MetricName::NormalizeAliasesApplied => "calls_normalize_aliases_applied_total",

            MetricName::AttributeRecordsEmitted => "calls_attribute_records_emitted_total",
            MetricName::AttributeFanOutRatio => "calls_attribute_fan_out_ratio",

            MetricName::AggregateAgents => "calls_aggregate_agents",
            MetricName::AggregateOutlierDays => "calls_aggregate_outlier_days",

            MetricName::ExportRowsWritten => "calls_export_rows_written_total",
        }
    }

    /// Get all metric names as an iterator
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            IngestRowsLoaded,
            NormalizeRowsKept,
            NormalizeRowsDropped,
            NormalizeInvalidTalkTime,
            NormalizeInvalidCallEnd,
            NormalizeAliasesApplied,
            AttributeRecordsEmitted,
            AttributeFanOutRatio,
            AggregateAgents,
            AggregateOutlierDays,
            ExportRowsWritten,
        ]
        .into_iter()
    }

    /// Returns (phase, description)
    pub fn metadata(&self) -> (&'static str, &'static str) {
        match self {
            MetricName::IngestRowsLoaded => ("ingest", "Rows read from the input export"),
            MetricName::NormalizeRowsKept => ("normalize", "Rows that produced a call record"),
            MetricName::NormalizeRowsDropped => ("normalize", "Rows without a valid call start"),
            MetricName::NormalizeInvalidTalkTime => ("normalize", "Talk times missing or invalid"),
            MetricName::NormalizeInvalidCallEnd => ("normalize", "Call end timestamps not parsed"),
            MetricName::NormalizeAliasesApplied => ("normalize", "Aliases replaced by full names"),
            MetricName::AttributeRecordsEmitted => ("attribute", "Attributed records emitted"),
            MetricName::AttributeFanOutRatio => ("attribute", "Attributed records per call"),
            MetricName::AggregateAgents => ("aggregate", "Agents in the last summary"),
            MetricName::AggregateOutlierDays => ("aggregate", "Days flagged for missed calls"),
            MetricName::ExportRowsWritten => ("export", "Rows written to CSV exports"),
        }
    }
}

/// Install a Prometheus recorder and return its handle for rendering
pub fn init() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_all();
            info!("Metrics recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

/// Register the help text of every metric with the installed recorder
pub fn describe_all() {
    for metric in MetricName::all_metrics() {
        let (_, description) = metric.metadata();
        let name = metric.as_str();
        match metric {
            MetricName::AttributeFanOutRatio => {
                ::metrics::describe_histogram!(name, description);
            }
            MetricName::AggregateAgents | MetricName::AggregateOutlierDays => {
                ::metrics::describe_gauge!(name, description);
            }
            _ => {
                ::metrics::describe_counter!(name, description);
            }
        }
    }
}

pub mod ingest {
    use super::MetricName;

    pub fn rows_loaded(rows: usize) {
        ::metrics::counter!(MetricName::IngestRowsLoaded.as_str()).increment(rows as u64);
    }
}

pub mod normalize {
    use super::MetricName;
    use crate::pipeline::processing::normalize::NormalizationStats;

    pub fn batch_normalized(stats: &NormalizationStats) {
        let kept = stats.rows_seen - stats.rows_dropped;
        ::metrics::counter!(MetricName::NormalizeRowsKept.as_str()).increment(kept as u64);
        ::metrics::counter!(MetricName::NormalizeRowsDropped.as_str())
            .increment(stats.rows_dropped as u64);
        ::metrics::counter!(MetricName::NormalizeInvalidTalkTime.as_str())
            .increment(stats.invalid_talk_time as u64);
        ::metrics::counter!(MetricName::NormalizeInvalidCallEnd.as_str())
            .increment(stats.invalid_call_end as u64);
        ::metrics::counter!(MetricName::NormalizeAliasesApplied.as_str())
            .increment(stats.aliases_applied as u64);
    }
}

pub mod attribute {
    use super::MetricName;

    pub fn batch_attributed(calls: usize, attributed: usize) {
        ::metrics::counter!(MetricName::AttributeRecordsEmitted.as_str())
            .increment(attributed as u64);
        if calls > 0 {
            ::metrics::histogram!(MetricName::AttributeFanOutRatio.as_str())
                .record(attributed as f64 / calls as f64);
        }
    }
}

pub mod aggregate {
    use super::MetricName;

    pub fn report_built(agents: usize, outlier_days: usize) {
        ::metrics::gauge!(MetricName::AggregateAgents.as_str()).set(agents as f64);
        ::metrics::gauge!(MetricName::AggregateOutlierDays.as_str()).set(outlier_days as f64);
    }
}

pub mod export {
    use super::MetricName;

    pub fn rows_exported(rows: usize) {
        ::metrics::counter!(MetricName::ExportRowsWritten.as_str()).increment(rows as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names: HashSet<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), MetricName::all_metrics().count());
        assert!(names.iter().all(|n| n.starts_with("calls_")));
    }

    #[test]
    fn test_metadata_phase_matches_name() {
        for metric in MetricName::all_metrics() {
            let (phase, description) = metric.metadata();
            assert!(metric.as_str().starts_with(&format!("calls_{}_", phase)));
            assert!(!description.is_empty());
        }
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        ingest::rows_loaded(3);
        attribute::batch_attributed(0, 0);
        export::rows_exported(1);
        describe_all();
    }
}
