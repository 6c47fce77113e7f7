/// Column and agent constants shared by the loader, the normalizer and the export.
/// These are the built-in defaults; `AnalyticsConfig` can override all of them.

// Input column headers
pub const AGENT_NAME_COLUMN: &str = "Agent Name";
pub const CALL_START_COLUMN: &str = "Call Start Time";
pub const CALL_END_COLUMN: &str = "Call End Time";
pub const TALK_TIME_COLUMN: &str = "Talk Time";

// Derived export columns
pub const DURATION_MINUTES_COLUMN: &str = "Duration (min)";
pub const DATE_COLUMN: &str = "Date";
pub const HOUR_COLUMN: &str = "Hour";
pub const WEEKDAY_EN_COLUMN: &str = "Weekday (en)";
pub const WEEKDAY_COLUMN: &str = "Weekday";
pub const MISSED_COLUMN: &str = "Missed";
pub const FINAL_AGENT_COLUMN: &str = "Final Agent";

// Agents on the default roster
pub const JORGE_ALIAS: &str = "Jorge";
pub const MARIA_ALIAS: &str = "Maria";
pub const JONATHAN_ALIAS: &str = "Jonathan";

pub const JORGE_FULL_NAME: &str = "Jorge Cesar Flores Rivera";
pub const MARIA_FULL_NAME: &str = "Maria Teresa Loredo Morales";
pub const JONATHAN_FULL_NAME: &str = "Jonathan Alejandro Zúñiga";

/// Multiplier applied to the sample standard deviation of daily missed calls
pub const DEFAULT_STD_DEV_MULTIPLIER: f64 = 1.5;

pub const DEFAULT_EXPORT_FILE: &str = "llamadas_filtradas.csv";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

// Environment variables
pub const CONFIG_PATH_ENV: &str = "CALL_ANALYTICS_CONFIG";
pub const LOG_DIR_ENV: &str = "CALL_ANALYTICS_LOG_DIR";

// Timestamp layout used when writing exports
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Get the default alias → full display name pairs
pub fn default_aliases() -> Vec<(&'static str, &'static str)> {
    vec![
        (JORGE_ALIAS, JORGE_FULL_NAME),
        (MARIA_ALIAS, MARIA_FULL_NAME),
        (JONATHAN_ALIAS, JONATHAN_FULL_NAME),
    ]
}
