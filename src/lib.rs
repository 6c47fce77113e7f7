pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod report;

pub use config::AnalyticsConfig;
pub use domain::{AttributedRecord, CallRecord, DateRange, RawCallRow};
pub use error::{AnalyticsError, Result};
pub use pipeline::{FilteredCalls, Pipeline, ProcessedCalls};
pub use report::Report;
