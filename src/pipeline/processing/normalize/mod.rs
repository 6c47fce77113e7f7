pub mod parsing;

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::domain::{CallRecord, RawCallRow};
use crate::observability::metrics;

pub use parsing::{format_talk_time, parse_talk_time, parse_timestamp};

/// Fixed mapping from short agent aliases to full display names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    aliases: BTreeMap<String, String>,
}

impl AliasMap {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Full name for an alias; unknown names pass through unchanged
    pub fn canonicalize(&self, name: &str) -> String {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Counters describing what the normalizer did to a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    pub rows_seen: usize,
    pub rows_dropped: usize,
    pub invalid_call_end: usize,
    pub invalid_talk_time: usize,
    pub aliases_applied: usize,
}

/// Output of the normalizer: surviving records plus what happened along the way
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<CallRecord>,
    pub stats: NormalizationStats,
}

/// Turns raw export rows into typed call records.
///
/// Never fails: rows without a usable start time are dropped, an unparseable
/// end time becomes `None`, and an unparseable talk time becomes `None` (zero minutes).
pub struct CallNormalizer {
    aliases: AliasMap,
}

impl CallNormalizer {
    pub fn new(aliases: AliasMap) -> Self {
        Self { aliases }
    }

    pub fn normalize_row(&self, row: &RawCallRow) -> Option<CallRecord> {
        let mut stats = NormalizationStats::default();
        self.normalize_row_with_stats(row, &mut stats)
    }

    pub fn normalize(&self, rows: &[RawCallRow]) -> NormalizedBatch {
        let span = tracing::info_span!("normalize", rows = rows.len());
        let _enter = span.enter();

        let mut stats = NormalizationStats::default();
        let records: Vec<CallRecord> = rows
            .iter()
            .filter_map(|row| self.normalize_row_with_stats(row, &mut stats))
            .collect();

        metrics::normalize::batch_normalized(&stats);
        info!(
            kept = records.len(),
            dropped = stats.rows_dropped,
            invalid_talk_time = stats.invalid_talk_time,
            invalid_call_end = stats.invalid_call_end,
            "Normalized call rows"
        );

        NormalizedBatch { records, stats }
    }

    fn normalize_row_with_stats(
        &self,
        row: &RawCallRow,
        stats: &mut NormalizationStats,
    ) -> Option<CallRecord> {
        stats.rows_seen += 1;

        let Some(call_start) = row.call_start.as_deref().and_then(parse_timestamp) else {
            stats.rows_dropped += 1;
            debug!(call_start = ?row.call_start, "Dropping row without a valid call start");
            return None;
        };

        let call_end = row.call_end.as_deref().and_then(parse_timestamp);
        if call_end.is_none() && has_value(&row.call_end) {
            stats.invalid_call_end += 1;
        }

        let talk_time = row.talk_time.as_deref().and_then(parse_talk_time);
        if talk_time.is_none() {
            stats.invalid_talk_time += 1;
            debug!(talk_time = ?row.talk_time, "Talk time missing or invalid, using zero minutes");
        }

        let agent_name = row
            .agent_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                if self.aliases.is_alias(name) {
                    stats.aliases_applied += 1;
                }
                self.aliases.canonicalize(name)
            });

        Some(CallRecord::new(agent_name, call_start, call_end, talk_time))
    }
}

fn has_value(cell: &Option<String>) -> bool {
    cell.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}
