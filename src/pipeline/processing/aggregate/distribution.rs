use chrono::Weekday;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{weekday_label, AttributedRecord, DISPLAY_WEEKDAYS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub weekday: Weekday,
    pub label: &'static str,
    pub count: usize,
}

/// Calls per hour, one column per display weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourRow {
    pub hour: u32,
    pub counts: [usize; DISPLAY_WEEKDAYS.len()],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourWeekdayMatrix {
    pub weekdays: Vec<&'static str>,
    pub rows: Vec<HourRow>,
}

impl HourWeekdayMatrix {
    /// Count for a cell; hours with no calls and Sunday always read 0
    pub fn count(&self, hour: u32, weekday: Weekday) -> usize {
        let Some(col) = display_column(weekday) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|row| row.hour == hour)
            .map(|row| row.counts[col])
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn display_column(weekday: Weekday) -> Option<usize> {
    DISPLAY_WEEKDAYS.iter().position(|d| *d == weekday)
}

/// Calls per weekday, Monday through Saturday.
///
/// Sunday never gets a bucket even when Sunday calls are present.
pub fn weekday_distribution(records: &[AttributedRecord]) -> Vec<WeekdayCount> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut counts = [0usize; DISPLAY_WEEKDAYS.len()];
    for attributed in records {
        if let Some(col) = display_column(attributed.record().weekday()) {
            counts[col] += 1;
        }
    }

    DISPLAY_WEEKDAYS
        .iter()
        .zip(counts)
        .map(|(day, count)| WeekdayCount {
            weekday: *day,
            label: weekday_label(*day),
            count,
        })
        .collect()
}

/// Hour × weekday call counts.
///
/// One row per hour that has any call (Sunday included), ascending. Columns
/// are Monday through Saturday and missing combinations are zero.
pub fn hour_weekday_matrix(records: &[AttributedRecord]) -> HourWeekdayMatrix {
    let mut rows: BTreeMap<u32, [usize; DISPLAY_WEEKDAYS.len()]> = BTreeMap::new();

    for attributed in records {
        let record = attributed.record();
        let counts = rows.entry(record.call_hour()).or_default();
        if let Some(col) = display_column(record.weekday()) {
            counts[col] += 1;
        }
    }

    HourWeekdayMatrix {
        weekdays: DISPLAY_WEEKDAYS.iter().map(|d| weekday_label(*d)).collect(),
        rows: rows
            .into_iter()
            .map(|(hour, counts)| HourRow { hour, counts })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CallRecord;
    use chrono::NaiveDate;

    // March 2024: the 4th is a Monday, the 10th a Sunday
    fn attributed(day: u32, hour: u32) -> AttributedRecord {
        let start = NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        AttributedRecord::new(CallRecord::new(None, start, None, None), "Ana")
    }

    #[test]
    fn test_weekday_distribution_order_and_zeros() {
        let records = vec![attributed(4, 9), attributed(4, 10), attributed(9, 12)];
        let dist = weekday_distribution(&records);

        let labels: Vec<&str> = dist.iter().map(|w| w.label).collect();
        assert_eq!(labels, vec!["Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado"]);

        let counts: Vec<usize> = dist.iter().map(|w| w.count).collect();
        assert_eq!(counts, vec![2, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_weekday_distribution_excludes_sunday() {
        let records = vec![attributed(10, 9), attributed(10, 11), attributed(5, 11)];
        let dist = weekday_distribution(&records);

        assert!(dist.iter().all(|w| w.weekday != Weekday::Sun));
        assert_eq!(dist.iter().map(|w| w.count).sum::<usize>(), 1);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(weekday_distribution(&[]).is_empty());
        assert!(hour_weekday_matrix(&[]).is_empty());
    }

    #[test]
    fn test_hour_weekday_matrix() {
        let records = vec![
            attributed(4, 9),
            attributed(4, 9),
            attributed(6, 9),
            attributed(8, 15),
            attributed(10, 21),
        ];
        let matrix = hour_weekday_matrix(&records);

        assert_eq!(matrix.weekdays.len(), 6);
        let hours: Vec<u32> = matrix.rows.iter().map(|r| r.hour).collect();
        assert_eq!(hours, vec![9, 15, 21]);

        assert_eq!(matrix.count(9, Weekday::Mon), 2);
        assert_eq!(matrix.count(9, Weekday::Wed), 1);
        assert_eq!(matrix.count(9, Weekday::Tue), 0);
        assert_eq!(matrix.count(15, Weekday::Fri), 1);
        assert_eq!(matrix.count(21, Weekday::Sun), 0);
        assert_eq!(matrix.rows[2].counts, [0; 6]);
        assert_eq!(matrix.count(3, Weekday::Mon), 0);
    }
}
