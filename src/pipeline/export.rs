use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use crate::constants::{self, EXPORT_TIMESTAMP_FORMAT};
use crate::domain::{weekday_english_name, AttributedRecord, CallRecord};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::normalize::{format_talk_time, parse_talk_time, parse_timestamp};

/// Export header row, in column order
pub const EXPORT_HEADERS: [&str; 11] = [
    constants::AGENT_NAME_COLUMN,
    constants::CALL_START_COLUMN,
    constants::CALL_END_COLUMN,
    constants::TALK_TIME_COLUMN,
    constants::DURATION_MINUTES_COLUMN,
    constants::DATE_COLUMN,
    constants::HOUR_COLUMN,
    constants::WEEKDAY_EN_COLUMN,
    constants::WEEKDAY_COLUMN,
    constants::MISSED_COLUMN,
    constants::FINAL_AGENT_COLUMN,
];

/// One line of the CSV export. Field names must stay in sync with [`EXPORT_HEADERS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Agent Name")]
    pub agent_name: Option<String>,
    #[serde(rename = "Call Start Time")]
    pub call_start: String,
    #[serde(rename = "Call End Time")]
    pub call_end: Option<String>,
    #[serde(rename = "Talk Time")]
    pub talk_time: Option<String>,
    #[serde(rename = "Duration (min)")]
    pub duration_minutes: f64,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Hour")]
    pub hour: u32,
    #[serde(rename = "Weekday (en)")]
    pub weekday_en: String,
    #[serde(rename = "Weekday")]
    pub weekday: String,
    #[serde(rename = "Missed")]
    pub missed: bool,
    #[serde(rename = "Final Agent")]
    pub final_agent: String,
}

impl From<&AttributedRecord> for ExportRow {
    fn from(attributed: &AttributedRecord) -> Self {
        let record = attributed.record();
        Self {
            agent_name: record.agent_name().map(String::from),
            call_start: record.call_start().format(EXPORT_TIMESTAMP_FORMAT).to_string(),
            call_end: record
                .call_end()
                .map(|end| end.format(EXPORT_TIMESTAMP_FORMAT).to_string()),
            talk_time: record.talk_time().map(format_talk_time),
            duration_minutes: record.duration_minutes(),
            date: record.call_date().format("%Y-%m-%d").to_string(),
            hour: record.call_hour(),
            weekday_en: weekday_english_name(record.weekday()).to_string(),
            weekday: record.weekday_label().to_string(),
            missed: record.is_missed(),
            final_agent: attributed.final_agent().to_string(),
        }
    }
}

impl ExportRow {
    /// Rebuild the attributed record; derived columns are recomputed from the base ones.
    /// Rows without a parseable start time or a credited agent yield `None`.
    pub fn to_attributed(&self) -> Option<AttributedRecord> {
        let final_agent = self.final_agent.trim();
        if final_agent.is_empty() {
            return None;
        }
        let call_start = parse_timestamp(&self.call_start)?;
        let record = CallRecord::new(
            self.agent_name.clone(),
            call_start,
            self.call_end.as_deref().and_then(parse_timestamp),
            self.talk_time.as_deref().and_then(parse_talk_time),
        );
        Some(AttributedRecord::new(record, final_agent))
    }
}

/// Write attributed records as CSV with a header row; returns the number of rows.
/// The header is written even when there are no records.
pub fn write_records<W: Write>(writer: W, records: &[AttributedRecord]) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(EXPORT_HEADERS)?;
    for attributed in records {
        writer.serialize(ExportRow::from(attributed))?;
    }
    writer.flush()?;
    Ok(records.len())
}

pub fn write_export(path: &Path, records: &[AttributedRecord]) -> Result<usize> {
    let span = tracing::info_span!("export", path = %path.display());
    let _enter = span.enter();

    let file = File::create(path)?;
    let written = write_records(file, records)?;

    metrics::export::rows_exported(written);
    info!(rows = written, "Wrote CSV export");
    Ok(written)
}

/// Parse a previously written export back into rows
pub fn read_export<R: Read>(reader: R) -> Result<Vec<ExportRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn sample() -> AttributedRecord {
        let start = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 5, 0)
            .unwrap();
        let record = CallRecord::new(
            Some("Luis, \"El Flaco\"".to_string()),
            start,
            None,
            Some(Duration::seconds(95)),
        );
        AttributedRecord::new(record, constants::JONATHAN_FULL_NAME)
    }

    #[test]
    fn test_header_row() {
        let mut buffer = Vec::new();
        write_records(&mut buffer, &[sample()]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, EXPORT_HEADERS.join(","));
        assert!(header.starts_with("Agent Name,Call Start Time,"));
        assert!(header.ends_with(",Missed,Final Agent"));
    }

    #[test]
    fn test_row_contents() {
        let mut buffer = Vec::new();
        write_records(&mut buffer, &[sample()]).unwrap();

        let rows = read_export(buffer.as_slice()).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.agent_name.as_deref(), Some("Luis, \"El Flaco\""));
        assert_eq!(row.call_start, "2024-03-09 12:05:00");
        assert_eq!(row.call_end, None);
        assert_eq!(row.talk_time.as_deref(), Some("0:01:35"));
        assert_eq!(row.weekday_en, "Saturday");
        assert_eq!(row.weekday, "Sábado");
        assert!(!row.missed);
        assert_eq!(row.final_agent, constants::JONATHAN_FULL_NAME);
    }

    #[test]
    fn test_to_attributed_restores_record() {
        let original = sample();
        let row = ExportRow::from(&original);
        let restored = row.to_attributed().unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_blank_final_agent_is_not_restored() {
        let mut buffer = Vec::new();
        write_records(&mut buffer, &[sample()]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let edited = text.replace(constants::JONATHAN_FULL_NAME, "  ");

        let rows = read_export(edited.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].final_agent.trim(), "");
        assert!(rows[0].to_attributed().is_none());
    }

    #[test]
    fn test_unparseable_start_is_not_restored() {
        let mut row = ExportRow::from(&sample());
        row.call_start = "yesterday".to_string();
        assert!(row.to_attributed().is_none());
    }

    #[test]
    fn test_empty_export_has_no_rows() {
        let mut buffer = Vec::new();
        assert_eq!(write_records(&mut buffer, &[]).unwrap(), 0);

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(read_export(buffer.as_slice()).unwrap().is_empty());
    }
}
