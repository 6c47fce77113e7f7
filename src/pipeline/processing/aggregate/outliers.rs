use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::AttributedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyMissedCount {
    pub date: NaiveDate,
    pub missed_calls: usize,
}

/// Daily missed-call counts and the days that stand out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub daily: Vec<DailyMissedCount>,
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
    pub flagged: Vec<DailyMissedCount>,
}

impl OutlierReport {
    /// Whether any day crossed the threshold
    pub fn is_critical(&self) -> bool {
        !self.flagged.is_empty()
    }
}

/// Sum missed calls per date, in date order
pub fn daily_missed_counts(records: &[AttributedRecord]) -> Vec<DailyMissedCount> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for attributed in records {
        let record = attributed.record();
        *per_day.entry(record.call_date()).or_default() += usize::from(record.is_missed());
    }

    per_day
        .into_iter()
        .map(|(date, missed_calls)| DailyMissedCount { date, missed_calls })
        .collect()
}

/// Flag days whose missed-call count exceeds `mean + multiplier * sample_std_dev`.
///
/// With a single day the deviation is zero and the count equals the mean, so
/// the strict comparison never flags it.
pub fn detect_missed_call_outliers(records: &[AttributedRecord], multiplier: f64) -> OutlierReport {
    let daily = daily_missed_counts(records);
    let (mean, std_dev) = mean_and_sample_std_dev(daily.iter().map(|d| d.missed_calls as f64));
    let threshold = mean + multiplier * std_dev;

    let flagged = daily
        .iter()
        .filter(|d| d.missed_calls as f64 > threshold)
        .copied()
        .collect();

    OutlierReport {
        daily,
        mean,
        std_dev,
        threshold,
        flagged,
    }
}

fn mean_and_sample_std_dev(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = values.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }

    let mean = values.clone().sum::<f64>() / n as f64;
    let squares: f64 = values.map(|v| (v - mean).powi(2)).sum();
    let dof = n.saturating_sub(1).max(1) as f64;
    (mean, (squares / dof).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CallRecord;
    use chrono::Duration;

    fn calls_on(day: u32, missed: usize, answered: usize) -> Vec<AttributedRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap();
        let make = |seconds: i64| {
            AttributedRecord::new(
                CallRecord::new(None, start, None, Some(Duration::seconds(seconds))),
                "Ana",
            )
        };
        (0..missed).map(|_| make(0)).chain((0..answered).map(|_| make(90))).collect()
    }

    #[test]
    fn test_spike_is_flagged() {
        let records: Vec<_> = [(1, 1), (2, 1), (3, 1), (4, 1), (5, 10)]
            .into_iter()
            .flat_map(|(day, missed)| calls_on(day, missed, 2))
            .collect();

        let report = detect_missed_call_outliers(&records, 1.5);
        assert!((report.mean - 2.8).abs() < 1e-9);
        assert!((report.std_dev - 16.2_f64.sqrt()).abs() < 1e-9);
        assert!(report.is_critical());
        assert_eq!(
            report.flagged,
            vec![DailyMissedCount {
                date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                missed_calls: 10
            }]
        );
    }

    #[test]
    fn test_single_day_is_never_flagged() {
        let report = detect_missed_call_outliers(&calls_on(7, 25, 3), 1.5);
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.std_dev, 0.0);
        assert!(!report.is_critical());

        let no_margin = detect_missed_call_outliers(&calls_on(7, 25, 3), 0.0);
        assert!(!no_margin.is_critical());
    }

    #[test]
    fn test_flat_days_are_not_flagged() {
        let records: Vec<_> = (1..=4).flat_map(|day| calls_on(day, 3, 1)).collect();
        let report = detect_missed_call_outliers(&records, 1.5);
        assert_eq!(report.std_dev, 0.0);
        assert!(!report.is_critical());
    }

    #[test]
    fn test_days_without_missed_calls_count_as_zero() {
        let mut records = calls_on(1, 0, 4);
        records.extend(calls_on(2, 2, 0));

        let daily = daily_missed_counts(&records);
        assert_eq!(daily.iter().map(|d| d.missed_calls).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_empty_range() {
        let report = detect_missed_call_outliers(&[], 1.5);
        assert!(report.daily.is_empty());
        assert!(!report.is_critical());
        assert_eq!(report.mean, 0.0);
    }
}
