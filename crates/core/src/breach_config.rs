//! Breach threshold configurations.
//!
//! Static reference data loaded once per detection run. Multiple
//! configurations may be active at the same time; the detector
//! evaluates them independently in the order the caller provides.

use serde::{Deserialize, Serialize};

use crate::breach::BreachKind;
use crate::error::CoreError;
use crate::types::{new_record_id, RecordId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default bounds for hot configurations (°C).
pub const DEFAULT_HOT_MINIMUM: f64 = 8.0;
pub const DEFAULT_HOT_MAXIMUM: f64 = 999.0;

/// Default bounds for cold configurations (°C).
pub const DEFAULT_COLD_MINIMUM: f64 = -999.0;
pub const DEFAULT_COLD_MAXIMUM: f64 = 2.0;

/// Default minimum violation span for consecutive kinds (30 minutes).
pub const DEFAULT_CONSECUTIVE_DURATION_MS: i64 = 30 * 60 * 1000;

/// Default accumulated violation span for cumulative kinds (60 minutes).
pub const DEFAULT_CUMULATIVE_DURATION_MS: i64 = 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// BreachConfiguration
// ---------------------------------------------------------------------------

/// A named threshold rule readings are evaluated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreachConfiguration {
    pub id: RecordId,
    pub kind: BreachKind,
    pub minimum_temperature: f64,
    pub maximum_temperature: f64,
    /// Minimum violation span, milliseconds.
    pub duration_ms: i64,
}

impl BreachConfiguration {
    pub fn new(kind: BreachKind, minimum: f64, maximum: f64, duration_ms: i64) -> Self {
        Self {
            id: new_record_id(),
            kind,
            minimum_temperature: minimum,
            maximum_temperature: maximum,
            duration_ms,
        }
    }

    /// Whether a temperature falls inside this configuration's bounds.
    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.minimum_temperature && temperature <= self.maximum_temperature
    }

    /// Validate the configuration.
    ///
    /// Rules:
    /// - `minimum_temperature` must not exceed `maximum_temperature`.
    /// - `duration_ms` must be positive.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.minimum_temperature > self.maximum_temperature {
            return Err(CoreError::Validation(format!(
                "minimum_temperature {} exceeds maximum_temperature {}",
                self.minimum_temperature, self.maximum_temperature
            )));
        }
        if self.duration_ms <= 0 {
            return Err(CoreError::Validation(format!(
                "duration_ms must be positive, got {}",
                self.duration_ms
            )));
        }
        Ok(())
    }
}

/// The standard four-rule group assigned when a sensor is set up:
/// hot/cold consecutive followed by hot/cold cumulative.
pub fn default_group() -> Vec<BreachConfiguration> {
    vec![
        BreachConfiguration::new(
            BreachKind::HotConsecutive,
            DEFAULT_HOT_MINIMUM,
            DEFAULT_HOT_MAXIMUM,
            DEFAULT_CONSECUTIVE_DURATION_MS,
        ),
        BreachConfiguration::new(
            BreachKind::ColdConsecutive,
            DEFAULT_COLD_MINIMUM,
            DEFAULT_COLD_MAXIMUM,
            DEFAULT_CONSECUTIVE_DURATION_MS,
        ),
        BreachConfiguration::new(
            BreachKind::HotCumulative,
            DEFAULT_HOT_MINIMUM,
            DEFAULT_HOT_MAXIMUM,
            DEFAULT_CUMULATIVE_DURATION_MS,
        ),
        BreachConfiguration::new(
            BreachKind::ColdCumulative,
            DEFAULT_COLD_MINIMUM,
            DEFAULT_COLD_MAXIMUM,
            DEFAULT_CUMULATIVE_DURATION_MS,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min: f64, max: f64, duration_ms: i64) -> BreachConfiguration {
        BreachConfiguration::new(BreachKind::HotConsecutive, min, max, duration_ms)
    }

    #[test]
    fn bounds_are_inclusive() {
        let c = config(8.0, 999.0, 1000);
        assert!(c.contains(8.0));
        assert!(c.contains(999.0));
        assert!(!c.contains(7.99));
        assert!(!c.contains(999.01));
    }

    #[test]
    fn valid_configuration_accepted() {
        assert!(config(8.0, 999.0, 1000).validate().is_ok());
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = config(10.0, 2.0, 1000).validate().unwrap_err();
        assert!(err.to_string().contains("exceeds maximum_temperature"));
    }

    #[test]
    fn equal_bounds_accepted() {
        assert!(config(2.0, 2.0, 1000).validate().is_ok());
    }

    #[test]
    fn non_positive_duration_rejected() {
        assert!(config(8.0, 999.0, 0).validate().is_err());
        assert!(config(8.0, 999.0, -5).validate().is_err());
    }

    #[test]
    fn default_group_has_consecutive_pair_first() {
        let group = default_group();
        assert_eq!(group.len(), 4);
        assert!(group[0].kind.is_consecutive());
        assert!(group[1].kind.is_consecutive());
        assert!(!group[2].kind.is_consecutive());
        assert!(!group[3].kind.is_consecutive());
    }

    #[test]
    fn default_group_validates() {
        for c in default_group() {
            assert!(c.validate().is_ok());
        }
    }
}
