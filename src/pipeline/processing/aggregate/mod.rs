// Read-only views over attributed calls

pub mod distribution;
pub mod outliers;
pub mod summary;

pub use distribution::{
    hour_weekday_matrix, weekday_distribution, HourRow, HourWeekdayMatrix, WeekdayCount,
};
pub use outliers::{
    daily_missed_counts, detect_missed_call_outliers, DailyMissedCount, OutlierReport,
};
pub use summary::{percent_missed, summarize_by_agent, AgentSummary};
