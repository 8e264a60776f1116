//! Resolver configuration, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{IntervalError, Result};
use crate::logging::{try_init_logging, LogConfig};
use crate::week::WeekConvention;

/// Settings bound into an [`crate::IntervalResolver`] at construction.
///
/// ```
/// use interval_engine::config::ResolverConfig;
/// use interval_engine::WeekStartDay;
///
/// let config = ResolverConfig::from_json(r#"{ "week": { "first_day": "sunday" } }"#).unwrap();
/// assert_eq!(config.week.first_day(), WeekStartDay::Sunday);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub week: WeekConvention,
    pub log: LogConfig,
}

impl ResolverConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| IntervalError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.week.validate()
    }

    /// Install the global subscriber described by the `log` section.
    ///
    /// Returns `false` when a subscriber is already installed; the existing
    /// one is left in place.
    pub fn init_logging(&self) -> bool {
        try_init_logging(&self.log)
    }
}
