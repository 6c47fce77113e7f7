use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Layouts tried in order after RFC 3339
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

// [N day(s)[,]] H:M[M]:S[S][.fraction]; minutes and seconds are range-checked after matching
static TALK_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d{1,6})\s+days?,?\s+)?(\d{1,6}):(\d{1,2}):(\d{1,2})(?:\.(\d{1,9}))?$")
        .expect("talk time pattern is valid")
});

/// Parse a call timestamp. Offsets are dropped in favor of the local wall-clock time.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a talk time such as `0:04:31`, `12:00:00.250` or `1 day 02:00:00`
pub fn parse_talk_time(value: &str) -> Option<Duration> {
    let caps = TALK_TIME_RE.captures(value.trim())?;

    let number = |idx: usize| -> i64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0)
    };

    let (minutes, secs) = (number(3), number(4));
    if minutes >= 60 || secs >= 60 {
        return None;
    }

    let seconds = number(1) * 86_400 + number(2) * 3_600 + minutes * 60 + secs;
    let nanos = caps
        .get(5)
        .map(|m| {
            // Right-pad the fraction to nine digits
            let digits = format!("{:0<9}", m.as_str());
            digits.parse::<i64>().unwrap_or(0)
        })
        .unwrap_or(0);

    Some(Duration::seconds(seconds) + Duration::nanoseconds(nanos))
}

/// Render a talk time in the `H:MM:SS[.fraction]` form accepted by [`parse_talk_time`]
pub fn format_talk_time(duration: Duration) -> String {
    let total = duration.num_seconds();
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let nanos = duration.subsec_nanos();

    if nanos == 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        let fraction = format!("{:09}", nanos);
        format!(
            "{}:{:02}:{:02}.{}",
            hours,
            minutes,
            seconds,
            fraction.trim_end_matches('0')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();

        assert_eq!(parse_timestamp("2024-03-04 14:05:09"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-04T14:05:09"), Some(expected));
        assert_eq!(parse_timestamp("03/04/2024 14:05:09"), Some(expected));
        assert_eq!(parse_timestamp("03/04/2024 02:05:09 PM"), Some(expected));
        assert_eq!(parse_timestamp("  2024-03-04 14:05:09  "), Some(expected));
        assert_eq!(parse_timestamp("2024-03-04T14:05:09-06:00"), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_fraction_and_date_only() {
        let with_fraction = parse_timestamp("2024-03-04 14:05:09.500").unwrap();
        assert_eq!(with_fraction.nanosecond(), 500_000_000);

        let midnight = parse_timestamp("2024-03-04").unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-40 10:00:00"), None);
    }

    #[test]
    fn test_parse_talk_time() {
        assert_eq!(parse_talk_time("0:00:00"), Some(Duration::zero()));
        assert_eq!(parse_talk_time("00:00:00"), Some(Duration::zero()));
        assert_eq!(parse_talk_time("0:04:31"), Some(Duration::seconds(271)));
        assert_eq!(parse_talk_time("0:4:31"), Some(Duration::seconds(271)));
        assert_eq!(parse_talk_time("0:0:5"), Some(Duration::seconds(5)));
        assert_eq!(parse_talk_time("1:00:00"), Some(Duration::seconds(3_600)));
        assert_eq!(parse_talk_time("1 day 02:00:00"), Some(Duration::seconds(93_600)));
        assert_eq!(parse_talk_time("2 days, 00:00:01"), Some(Duration::seconds(172_801)));
        assert_eq!(
            parse_talk_time("0:00:01.25"),
            Some(Duration::milliseconds(1_250))
        );
    }

    #[test]
    fn test_parse_talk_time_rejects_invalid() {
        assert_eq!(parse_talk_time(""), None);
        assert_eq!(parse_talk_time("abc"), None);
        assert_eq!(parse_talk_time("0:61:00"), None);
        assert_eq!(parse_talk_time("0:4:60"), None);
        assert_eq!(parse_talk_time("0:123:00"), None);
        assert_eq!(parse_talk_time("-0:00:05"), None);
        assert_eq!(parse_talk_time("90"), None);
    }

    #[test]
    fn test_format_talk_time_is_parseable() {
        for value in ["0:00:00", "0:04:31", "27:03:09", "0:00:01.25"] {
            let parsed = parse_talk_time(value).unwrap();
            assert_eq!(format_talk_time(parsed), value);
        }
    }
}
