//! Per-observable gesture configuration

use serde::{Deserialize, Serialize};

use crate::analysis::Axis;
use crate::{Error, Result};

/// Cancel threshold applied when an orientation is set but no explicit
/// cancel threshold is configured
pub const DEFAULT_CANCEL_THRESHOLD: f64 = 3.0;

/// Configuration of one gesture observable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservableConfig {
    /// Suppress the default platform reaction to recognized events
    pub prevent_default: bool,
    /// Listener mode override; derived from `prevent_default` when unset
    pub passive: Option<bool>,
    /// Minimum displacement before a gesture starts; `0.0` starts
    /// immediately on the opening event
    pub threshold: f64,
    /// Cross-axis displacement that abandons a candidate gesture; only
    /// consulted when `orientation` is set
    pub cancel_threshold: Option<f64>,
    /// Restrict intent detection to one axis
    pub orientation: Option<Axis>,
}

impl Default for ObservableConfig {
    fn default() -> Self {
        Self {
            prevent_default: false,
            passive: None,
            threshold: 0.0,
            cancel_threshold: None,
            orientation: None,
        }
    }
}

impl ObservableConfig {
    /// Listener mode actually requested from the host surface
    ///
    /// Defaults to the opposite of `prevent_default`: an observable that
    /// wants to suppress defaults cannot attach passively.
    pub fn effective_passive(&self) -> bool {
        self.passive.unwrap_or(!self.prevent_default)
    }

    /// Cancel threshold in effect, or `None` when no orientation is set
    pub fn effective_cancel_threshold(&self) -> Option<f64> {
        self.orientation
            .map(|_| self.cancel_threshold.unwrap_or(DEFAULT_CANCEL_THRESHOLD))
    }

    /// Validate numeric fields
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::Config(format!(
                "threshold must be a finite non-negative number, got {}",
                self.threshold
            )));
        }
        if let Some(limit) = self.cancel_threshold {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(Error::Config(format!(
                    "cancel_threshold must be a finite positive number, got {limit}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(ObservableConfig::default().validate().is_ok());
    }

    #[test]
    fn test_passive_derived_from_prevent_default() {
        let mut config = ObservableConfig::default();
        assert!(config.effective_passive());
        config.prevent_default = true;
        assert!(!config.effective_passive());
        config.passive = Some(true);
        assert!(config.effective_passive());
    }

    #[test]
    fn test_cancel_threshold_requires_orientation() {
        let mut config = ObservableConfig {
            cancel_threshold: Some(5.0),
            ..Default::default()
        };
        assert_eq!(config.effective_cancel_threshold(), None);
        config.orientation = Some(Axis::Vertical);
        assert_eq!(config.effective_cancel_threshold(), Some(5.0));
        config.cancel_threshold = None;
        assert_eq!(
            config.effective_cancel_threshold(),
            Some(DEFAULT_CANCEL_THRESHOLD)
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = ObservableConfig {
            threshold: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ObservableConfig {
            cancel_threshold: Some(0.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ObservableConfig {
            threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
