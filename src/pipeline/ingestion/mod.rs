//! Loader for call-center CSV exports.
//!
//! Only locates the configured columns and copies their cells; every other
//! column is ignored and no parsing happens here.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::config::ColumnConfig;
use crate::domain::RawCallRow;
use crate::error::{AnalyticsError, Result};
use crate::observability::metrics;

struct ColumnIndex {
    agent_name: usize,
    call_start: usize,
    call_end: Option<usize>,
    talk_time: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, columns: &ColumnConfig) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };
        let require =
            |name: &str| find(name).ok_or_else(|| AnalyticsError::MissingColumn(name.to_string()));

        Ok(Self {
            agent_name: require(&columns.agent_name)?,
            call_start: require(&columns.call_start)?,
            call_end: find(&columns.call_end),
            talk_time: require(&columns.talk_time)?,
        })
    }
}

fn cell(record: &csv::StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Read raw call rows from any CSV source with a header row
pub fn read_calls<R: Read>(reader: R, columns: &ColumnConfig) -> Result<Vec<RawCallRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let index = ColumnIndex::resolve(reader.headers()?, columns)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(RawCallRow {
            agent_name: cell(&record, index.agent_name),
            call_start: cell(&record, index.call_start),
            call_end: index.call_end.and_then(|idx| cell(&record, idx)),
            talk_time: cell(&record, index.talk_time),
        });
    }

    metrics::ingest::rows_loaded(rows.len());
    Ok(rows)
}

/// Read raw call rows from a CSV file on disk
pub fn load_calls(path: &Path, columns: &ColumnConfig) -> Result<Vec<RawCallRow>> {
    let span = tracing::info_span!("load", path = %path.display());
    let _enter = span.enter();

    let file = File::open(path)?;
    let rows = read_calls(file, columns)?;
    info!(rows = rows.len(), "Loaded call export");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_configured_columns() {
        let data = "\
Call ID,Agent Name,Call Start Time,Call End Time,Talk Time,Queue
1,Jorge,2024-03-04 09:10:00,2024-03-04 09:12:00,0:02:00,Ventas
2,,2024-03-04 09:20:00,,0:00:00,Ventas
";
        let rows = read_calls(data.as_bytes(), &ColumnConfig::default()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].agent_name.as_deref(), Some("Jorge"));
        assert_eq!(rows[0].call_end.as_deref(), Some("2024-03-04 09:12:00"));
        assert_eq!(rows[0].talk_time.as_deref(), Some("0:02:00"));
        assert_eq!(rows[1].agent_name, None);
        assert_eq!(rows[1].call_end, None);
    }

    #[test]
    fn test_call_end_column_is_optional() {
        let data = "Agent Name,Call Start Time,Talk Time\nMaria,2024-03-04 11:00:00,0:00:00\n";
        let rows = read_calls(data.as_bytes(), &ColumnConfig::default()).unwrap();
        assert_eq!(rows[0].call_end, None);
    }

    #[test]
    fn test_missing_required_column() {
        let data = "Agent Name,Talk Time\nMaria,0:00:00\n";
        let result = read_calls(data.as_bytes(), &ColumnConfig::default());
        match result {
            Err(AnalyticsError::MissingColumn(name)) => assert_eq!(name, "Call Start Time"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_headers_and_short_rows() {
        let columns = ColumnConfig {
            agent_name: "Agente".to_string(),
            call_start: "Inicio".to_string(),
            call_end: "Fin".to_string(),
            talk_time: "Conversacion".to_string(),
        };
        let data = "\u{feff}Agente,Inicio,Conversacion,Fin\nJonathan,2024-03-04 18:00:00\n";
        let rows = read_calls(data.as_bytes(), &columns).unwrap();

        assert_eq!(rows[0].agent_name.as_deref(), Some("Jonathan"));
        assert_eq!(rows[0].talk_time, None);
        assert_eq!(rows[0].call_end, None);
    }
}
