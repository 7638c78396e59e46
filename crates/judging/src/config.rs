use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_FEEDBACK_DEBOUNCE: Duration = Duration::from_millis(1500);
pub const DEFAULT_SAVED_DISPLAY: Duration = Duration::from_millis(2000);

/// Timings of the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgingConfig {
    /// Inactivity window after the last feedback keystroke before it is saved.
    pub feedback_debounce: Duration,
    /// How long the "saved" indicator stays up.
    pub saved_display: Duration,
}

impl Default for JudgingConfig {
    fn default() -> Self {
        Self {
            feedback_debounce: DEFAULT_FEEDBACK_DEBOUNCE,
            saved_display: DEFAULT_SAVED_DISPLAY,
        }
    }
}

impl JudgingConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            feedback_debounce: millis_or(
                std::env::var("FEEDBACK_DEBOUNCE_MS").ok(),
                DEFAULT_FEEDBACK_DEBOUNCE,
            )
            .context("FEEDBACK_DEBOUNCE_MS must be a number of milliseconds")?,
            saved_display: millis_or(
                std::env::var("SAVED_INDICATOR_MS").ok(),
                DEFAULT_SAVED_DISPLAY,
            )
            .context("SAVED_INDICATOR_MS must be a number of milliseconds")?,
        })
    }
}

fn millis_or(raw: Option<String>, default: Duration) -> Result<Duration> {
    match raw {
        Some(value) => Ok(Duration::from_millis(value.trim().parse()?)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JudgingConfig::default();
        assert_eq!(config.feedback_debounce, Duration::from_millis(1500));
        assert_eq!(config.saved_display, Duration::from_secs(2));
    }

    #[test]
    fn test_millis_parsing() {
        assert_eq!(
            millis_or(Some(" 250 ".to_string()), DEFAULT_SAVED_DISPLAY).unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(
            millis_or(None, DEFAULT_SAVED_DISPLAY).unwrap(),
            DEFAULT_SAVED_DISPLAY
        );
        assert!(millis_or(Some("soon".to_string()), DEFAULT_SAVED_DISPLAY).is_err());
    }
}
