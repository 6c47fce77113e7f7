//! Result sets handed to the presentation layer, plus a plain-text rendering
//! for the terminal.

use serde::Serialize;
use std::fmt::Write;
use tracing::{info, warn};

use crate::domain::DateRange;
use crate::observability::metrics;
use crate::pipeline::processing::aggregate::{
    detect_missed_call_outliers, hour_weekday_matrix, summarize_by_agent, weekday_distribution,
    AgentSummary, HourWeekdayMatrix, OutlierReport, WeekdayCount,
};
use crate::pipeline::FilteredCalls;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub range: Option<DateRange>,
    pub calls_in_range: usize,
    pub attributed_in_range: usize,
    pub agents: Vec<AgentSummary>,
    pub weekdays: Vec<WeekdayCount>,
    pub hourly: HourWeekdayMatrix,
    pub missed_call_alerts: OutlierReport,
}

impl Report {
    pub fn build(filtered: &FilteredCalls, std_dev_multiplier: f64) -> Self {
        let span = tracing::info_span!("aggregate", attributed = filtered.attributed.len());
        let _enter = span.enter();

        let records = &filtered.attributed;
        let report = Self {
            range: filtered.range,
            calls_in_range: filtered.calls.len(),
            attributed_in_range: records.len(),
            agents: summarize_by_agent(records),
            weekdays: weekday_distribution(records),
            hourly: hour_weekday_matrix(records),
            missed_call_alerts: detect_missed_call_outliers(records, std_dev_multiplier),
        };

        metrics::aggregate::report_built(
            report.agents.len(),
            report.missed_call_alerts.flagged.len(),
        );
        if report.missed_call_alerts.is_critical() {
            warn!(
                days = report.missed_call_alerts.flagged.len(),
                threshold = report.missed_call_alerts.threshold,
                "Days with unusually many missed calls"
            );
        }
        info!(agents = report.agents.len(), "Built report");
        report
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        section(out, "Call summary by agent")?;
        match self.range {
            Some(range) => writeln!(out, "Range: {} to {}", range.start, range.end)?,
            None => writeln!(out, "Range: no data")?,
        }
        writeln!(
            out,
            "Calls in range: {}  Attributed records: {}\n",
            self.calls_in_range, self.attributed_in_range
        )?;

        let name_width = self
            .agents
            .iter()
            .map(|a| a.agent.chars().count())
            .max()
            .unwrap_or(0)
            .max("Agent".len());
        writeln!(
            out,
            "{:<w$}  {:>6}  {:>6}  {:>10}  {:>8}  {:>8}",
            "Agent", "Total", "Missed", "Total min", "Avg min", "% Missed",
            w = name_width
        )?;
        for agent in &self.agents {
            writeln!(
                out,
                "{}{}  {:>6}  {:>6}  {:>10.1}  {:>8.1}  {:>7.1}%",
                agent.agent,
                " ".repeat(name_width - agent.agent.chars().count()),
                agent.total_calls,
                agent.missed_calls,
                agent.total_duration_minutes,
                agent.avg_duration_minutes,
                agent.pct_missed
            )?;
        }

        section(out, "Calls by weekday")?;
        for day in &self.weekdays {
            writeln!(out, "{:<10} {:>6}", day.label, day.count)?;
        }

        section(out, "Calls by hour and weekday")?;
        if !self.hourly.is_empty() {
            write!(out, "{:>4}", "Hour")?;
            for label in &self.hourly.weekdays {
                write!(out, " {:>10}", label)?;
            }
            writeln!(out)?;
            for row in &self.hourly.rows {
                write!(out, "{:>4}", row.hour)?;
                for count in row.counts {
                    write!(out, " {:>10}", count)?;
                }
                writeln!(out)?;
            }
        }

        section(out, "Missed call alerts")?;
        let alerts = &self.missed_call_alerts;
        if alerts.is_critical() {
            writeln!(
                out,
                "Days with missed calls above the average (threshold {:.2}):",
                alerts.threshold
            )?;
            for day in &alerts.flagged {
                writeln!(out, "  {}  {}", day.date, day.missed_calls)?;
            }
        } else {
            writeln!(out, "No critical days detected.")?;
        }

        Ok(())
    }
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out, "\n{}", "═".repeat(70))?;
    writeln!(out, "  {}", title)?;
    writeln!(out, "{}", "═".repeat(70))
}
