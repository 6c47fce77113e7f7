use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::AttributedRecord;

/// Per-agent call statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    pub agent: String,
    pub total_calls: usize,
    pub missed_calls: usize,
    pub total_duration_minutes: f64,
    pub avg_duration_minutes: f64,
    pub pct_missed: f64,
}

#[derive(Default)]
struct Accumulator {
    total_calls: usize,
    missed_calls: usize,
    total_duration_minutes: f64,
}

/// Share of missed calls as a percentage, evaluated as `missed / total * 100`
pub fn percent_missed(missed_calls: usize, total_calls: usize) -> f64 {
    if total_calls == 0 {
        return 0.0;
    }
    missed_calls as f64 / total_calls as f64 * 100.0
}

/// Group attributed calls by credited agent, ordered by agent name
pub fn summarize_by_agent(records: &[AttributedRecord]) -> Vec<AgentSummary> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for attributed in records {
        let acc = groups.entry(attributed.final_agent()).or_default();
        acc.total_calls += 1;
        if attributed.record().is_missed() {
            acc.missed_calls += 1;
        }
        acc.total_duration_minutes += attributed.record().duration_minutes();
    }

    // Every group has at least one member, so the divisions below are safe
    groups
        .into_iter()
        .map(|(agent, acc)| {
            let total = acc.total_calls as f64;
            AgentSummary {
                agent: agent.to_string(),
                total_calls: acc.total_calls,
                missed_calls: acc.missed_calls,
                total_duration_minutes: acc.total_duration_minutes,
                avg_duration_minutes: acc.total_duration_minutes / total,
                pct_missed: percent_missed(acc.missed_calls, acc.total_calls),
            }
        })
        .collect()
}
