use std::time::Duration;

use serde::Deserialize;

use crate::editing::MAX_SOUND_LEVEL;
use crate::error::{Result, StudioError};
use crate::options::{ShortLength, TransitionStyle};

/// Tunables of the studio engine.
///
/// Every field is optional in TOML; missing fields keep their defaults.
///
/// # Example
/// ```
/// use engine::StudioConfig;
///
/// let config = StudioConfig::from_toml_str("completion_delay_ms = 1200").expect("valid");
/// assert_eq!(config.completion_delay_ms, 1_200);
/// assert_eq!(config.tick_period_ms, 420);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    pub tick_period_ms: u64,
    pub completion_delay_ms: u64,
    pub min_increment: f64,
    pub max_increment: f64,
    pub default_sound_level: u8,
    pub min_trim_span_secs: u32,
    pub default_short_length: ShortLength,
    pub default_transition: TransitionStyle,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 420,
            completion_delay_ms: 2_500,
            min_increment: 10.0,
            max_increment: 28.0,
            default_sound_level: 70,
            min_trim_span_secs: 3,
            default_short_length: ShortLength::Thirty,
            default_transition: TransitionStyle::Fade,
        }
    }
}

impl StudioConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(invalid("tick_period_ms must be positive"));
        }
        if self.completion_delay_ms == 0 {
            return Err(invalid("completion_delay_ms must be positive"));
        }
        if !(self.min_increment.is_finite() && self.max_increment.is_finite()) {
            return Err(invalid("increments must be finite"));
        }
        if self.min_increment <= 0.0 {
            return Err(invalid("min_increment must be positive"));
        }
        if self.min_increment >= self.max_increment {
            return Err(invalid("min_increment must be below max_increment"));
        }
        if self.default_sound_level > MAX_SOUND_LEVEL {
            return Err(invalid("default_sound_level must be at most 100"));
        }
        if self.min_trim_span_secs >= ShortLength::Fifteen.seconds() {
            return Err(invalid(
                "min_trim_span_secs must be shorter than the shortest short",
            ));
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }
}

fn invalid(reason: &str) -> StudioError {
    StudioError::InvalidConfig {
        reason: reason.to_owned(),
    }
}
