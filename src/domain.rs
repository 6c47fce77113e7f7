//! Typed call records for each pipeline stage.
//!
//! `RawCallRow` holds the untouched cells of one input row, `CallRecord` is the
//! normalized form with every derived column computed once, and
//! `AttributedRecord` pairs a call with the single agent credited for it.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Weekdays shown by the weekday and hour views, in display order.
/// Sunday is intentionally absent.
pub const DISPLAY_WEEKDAYS: [Weekday; 6] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Display label for a weekday
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

pub fn weekday_english_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn weekday_from_english_name(name: &str) -> Option<Weekday> {
    match name {
        "Monday" => Some(Weekday::Mon),
        "Tuesday" => Some(Weekday::Tue),
        "Wednesday" => Some(Weekday::Wed),
        "Thursday" => Some(Weekday::Thu),
        "Friday" => Some(Weekday::Fri),
        "Saturday" => Some(Weekday::Sat),
        "Sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// One input row as read from the export, before any parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCallRow {
    pub agent_name: Option<String>,
    pub call_start: Option<String>,
    pub call_end: Option<String>,
    pub talk_time: Option<String>,
}

/// A normalized call with its derived columns
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    agent_name: Option<String>,
    call_start: NaiveDateTime,
    call_end: Option<NaiveDateTime>,
    talk_time: Option<Duration>,
    duration_minutes: f64,
    call_date: NaiveDate,
    call_hour: u32,
    weekday: Weekday,
    is_missed: bool,
}

impl CallRecord {
    pub fn new(
        agent_name: Option<String>,
        call_start: NaiveDateTime,
        call_end: Option<NaiveDateTime>,
        talk_time: Option<Duration>,
    ) -> Self {
        let duration_minutes = talk_time.map(duration_to_minutes).unwrap_or(0.0);
        // A talk time that failed to parse is never equal to zero
        let is_missed = talk_time == Some(Duration::zero());

        Self {
            agent_name,
            call_start,
            call_end,
            talk_time,
            duration_minutes,
            call_date: call_start.date(),
            call_hour: call_start.hour(),
            weekday: call_start.weekday(),
            is_missed,
        }
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.agent_name.as_deref()
    }

    pub fn call_start(&self) -> NaiveDateTime {
        self.call_start
    }

    pub fn call_end(&self) -> Option<NaiveDateTime> {
        self.call_end
    }

    pub fn talk_time(&self) -> Option<Duration> {
        self.talk_time
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_minutes
    }

    pub fn call_date(&self) -> NaiveDate {
        self.call_date
    }

    pub fn call_hour(&self) -> u32 {
        self.call_hour
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn weekday_label(&self) -> &'static str {
        weekday_label(self.weekday)
    }

    pub fn is_missed(&self) -> bool {
        self.is_missed
    }
}

/// A call credited to exactly one agent
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedRecord {
    record: CallRecord,
    final_agent: String,
}

impl AttributedRecord {
    pub fn new(record: CallRecord, final_agent: impl Into<String>) -> Self {
        Self {
            record,
            final_agent: final_agent.into(),
        }
    }

    pub fn record(&self) -> &CallRecord {
        &self.record
    }

    pub fn final_agent(&self) -> &str {
        &self.final_agent
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The smallest range covering every call, or `None` for an empty table
    pub fn spanning(records: &[CallRecord]) -> Option<Self> {
        let start = records.iter().map(CallRecord::call_date).min()?;
        let end = records.iter().map(CallRecord::call_date).max()?;
        Some(Self { start, end })
    }
}

pub fn duration_to_minutes(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 60.0 + f64::from(duration.subsec_nanos()) / 60_000_000_000.0
}
