use tracing::info;

use crate::domain::{AttributedRecord, CallRecord};
use crate::observability::metrics;

/// Agents responsible for missed calls during `[start_hour, end_hour)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyWindow {
    start_hour: u32,
    end_hour: u32,
    agents: Vec<String>,
}

impl DutyWindow {
    pub fn new(start_hour: u32, end_hour: u32, agents: Vec<String>) -> Self {
        Self {
            start_hour,
            end_hour,
            agents,
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

/// Hour-of-day lookup of on-duty agents. The first matching window wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DutyRoster {
    windows: Vec<DutyWindow>,
}

impl DutyRoster {
    pub fn new(windows: Vec<DutyWindow>) -> Self {
        Self { windows }
    }

    pub fn agents_on_duty(&self, hour: u32) -> &[String] {
        self.windows
            .iter()
            .find(|w| w.contains(hour))
            .map(DutyWindow::agents)
            .unwrap_or(&[])
    }

    pub fn windows(&self) -> &[DutyWindow] {
        &self.windows
    }
}

/// Immutable settings the attributor works from. Roster names are already
/// canonical full names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionConfig {
    pub roster: DutyRoster,
}

/// Decides which agent(s) are credited with each call
pub struct Attributor {
    config: AttributionConfig,
}

impl Attributor {
    pub fn new(config: AttributionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AttributionConfig {
        &self.config
    }

    /// Credit a single call.
    ///
    /// Missed calls inside a duty window fan out to every agent on duty and the
    /// recorded agent is ignored. Anything else is credited to the recorded agent,
    /// or dropped when there is none.
    pub fn attribute(&self, record: &CallRecord) -> Vec<AttributedRecord> {
        if record.is_missed() {
            let on_duty = self.config.roster.agents_on_duty(record.call_hour());
            if !on_duty.is_empty() {
                return on_duty
                    .iter()
                    .map(|agent| AttributedRecord::new(record.clone(), agent.clone()))
                    .collect();
            }
        }

        record
            .agent_name()
            .map(|agent| AttributedRecord::new(record.clone(), agent))
            .into_iter()
            .collect()
    }

    /// Lazily credit every call. Calling again restarts from the first record.
    pub fn attribute_all<'a>(
        &'a self,
        records: &'a [CallRecord],
    ) -> impl Iterator<Item = AttributedRecord> + 'a {
        records.iter().flat_map(move |record| self.attribute(record))
    }

    pub fn attribute_batch(&self, records: &[CallRecord]) -> Vec<AttributedRecord> {
        let span = tracing::info_span!("attribute", records = records.len());
        let _enter = span.enter();

        let attributed: Vec<AttributedRecord> = self.attribute_all(records).collect();

        metrics::attribute::batch_attributed(records.len(), attributed.len());
        info!(
            calls = records.len(),
            attributed = attributed.len(),
            "Attributed calls to agents"
        );
        attributed
    }
}
