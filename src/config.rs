use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env::VarError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants;
use crate::error::{AnalyticsError, Result};
use crate::pipeline::processing::attribute::{AttributionConfig, DutyRoster, DutyWindow};
use crate::pipeline::processing::normalize::AliasMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub columns: ColumnConfig,
    /// Short alias → full display name
    pub aliases: BTreeMap<String, String>,
    pub duty_windows: Vec<DutyWindowConfig>,
    pub alerts: AlertConfig,
}

/// Header names of the input export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub agent_name: String,
    pub call_start: String,
    pub call_end: String,
    pub talk_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyWindowConfig {
    /// First hour of the window (inclusive)
    pub start_hour: u32,
    /// Hour the window closes (exclusive)
    pub end_hour: u32,
    pub agents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub std_dev_multiplier: f64,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            agent_name: constants::AGENT_NAME_COLUMN.to_string(),
            call_start: constants::CALL_START_COLUMN.to_string(),
            call_end: constants::CALL_END_COLUMN.to_string(),
            talk_time: constants::TALK_TIME_COLUMN.to_string(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            std_dev_multiplier: constants::DEFAULT_STD_DEV_MULTIPLIER,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        use constants::{JONATHAN_ALIAS, JORGE_ALIAS, MARIA_ALIAS};

        let window = |start_hour: u32, end_hour: u32, agents: &[&str]| DutyWindowConfig {
            start_hour,
            end_hour,
            agents: agents.iter().map(|a| a.to_string()).collect(),
        };

        Self {
            columns: ColumnConfig::default(),
            aliases: constants::default_aliases()
                .into_iter()
                .map(|(alias, full)| (alias.to_string(), full.to_string()))
                .collect(),
            duty_windows: vec![
                window(8, 10, &[JORGE_ALIAS]),
                window(10, 12, &[JORGE_ALIAS, MARIA_ALIAS]),
                window(12, 16, &[JORGE_ALIAS, MARIA_ALIAS, JONATHAN_ALIAS]),
                window(16, 18, &[JONATHAN_ALIAS, MARIA_ALIAS]),
                window(18, 20, &[JONATHAN_ALIAS]),
            ],
            alerts: AlertConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AnalyticsError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: AnalyticsConfig = toml::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Resolve the configuration source: an explicit path, then the
    /// `CALL_ANALYTICS_CONFIG` variable, then `./config.toml`, then built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = config_path_from_env(std::env::var(constants::CONFIG_PATH_ENV))? {
            return Self::load(&path);
        }

        let local = Path::new(constants::DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }

        debug!("No configuration file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        for window in &self.duty_windows {
            if window.start_hour >= window.end_hour || window.end_hour > 24 {
                return Err(AnalyticsError::Config(format!(
                    "Duty window [{}, {}) is not a valid hour range",
                    window.start_hour, window.end_hour
                )));
            }
            if window.agents.is_empty() {
                return Err(AnalyticsError::Config(format!(
                    "Duty window [{}, {}) has no agents",
                    window.start_hour, window.end_hour
                )));
            }
            if window.agents.iter().any(|a| a.trim().is_empty()) {
                return Err(AnalyticsError::Config(format!(
                    "Duty window [{}, {}) lists a blank agent name",
                    window.start_hour, window.end_hour
                )));
            }
        }

        if let Some((alias, _)) = self.aliases.iter().find(|(_, full)| full.trim().is_empty()) {
            return Err(AnalyticsError::Config(format!("Alias '{}' maps to a blank name", alias)));
        }

        let k = self.alerts.std_dev_multiplier;
        if !k.is_finite() || k < 0.0 {
            return Err(AnalyticsError::Config(format!(
                "std_dev_multiplier must be a non-negative number, got {}",
                k
            )));
        }

        Ok(())
    }

    pub fn alias_map(&self) -> AliasMap {
        AliasMap::new(self.aliases.clone())
    }

    /// Build the immutable attribution settings, resolving roster aliases to full names
    pub fn attribution_config(&self) -> AttributionConfig {
        let aliases = self.alias_map();
        let windows = self
            .duty_windows
            .iter()
            .map(|w| {
                DutyWindow::new(
                    w.start_hour,
                    w.end_hour,
                    w.agents.iter().map(|a| aliases.canonicalize(a)).collect(),
                )
            })
            .collect();

        AttributionConfig {
            roster: DutyRoster::new(windows),
        }
    }
}

/// An unset variable means "not configured"; any other lookup failure is an error
fn config_path_from_env(
    value: std::result::Result<String, VarError>,
) -> Result<Option<PathBuf>> {
    match value {
        Ok(path) => Ok(Some(PathBuf::from(path))),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
