//! Operating rules and limits for simulations and suggestion scans.

use crate::error::CoreError;
use crate::lookup::EquipmentCategory;
use serde::{Deserialize, Serialize};

/// Configuration for a one-day fleet assignment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetRules {
    /// Length of the operating day in hours
    pub day_hours: f64,
    /// Nightly maintenance window carved out of the operating day
    pub maintenance_hours: f64,
    /// Maximum duty hours (block + turn) a crew may accumulate
    pub crew_max_hours: f64,
    /// Hour of day at which the first departure may leave
    pub day_start_hour: f64,
    /// Average block speed used to turn distance into airborne time
    pub cruise_speed_mph: f64,
    /// Taxi-out plus taxi-in added to every leg
    pub taxi_overhead_hours: f64,
    pub regional_turn_hours: f64,
    pub narrowbody_turn_hours: f64,
    pub widebody_turn_hours: f64,
}

impl Default for FleetRules {
    fn default() -> Self {
        Self {
            day_hours: 18.0,
            maintenance_hours: 6.0,
            crew_max_hours: 14.0,
            day_start_hour: 5.0,
            cruise_speed_mph: 500.0,
            taxi_overhead_hours: 0.5,
            regional_turn_hours: 0.4,
            narrowbody_turn_hours: 0.5,
            widebody_turn_hours: 1.0,
        }
    }
}

impl FleetRules {
    /// Rules with custom day, maintenance and crew caps; everything else default.
    pub fn with_caps(day_hours: f64, maintenance_hours: f64, crew_max_hours: f64) -> Self {
        Self {
            day_hours,
            maintenance_hours,
            crew_max_hours,
            ..Self::default()
        }
    }

    /// Hours a tail may be committed before its maintenance window.
    pub fn available_hours(&self) -> f64 {
        self.day_hours - self.maintenance_hours
    }

    /// Block hours for a leg of the given distance.
    pub fn block_hours(&self, distance_miles: f64) -> f64 {
        self.taxi_overhead_hours + distance_miles.max(0.0) / self.cruise_speed_mph
    }

    /// Turn buffer after a leg flown by the given category.
    pub fn turn_hours(&self, category: EquipmentCategory) -> f64 {
        match category {
            EquipmentCategory::Regional => self.regional_turn_hours,
            EquipmentCategory::Narrowbody => self.narrowbody_turn_hours,
            EquipmentCategory::Widebody => self.widebody_turn_hours,
        }
    }

    /// Reject configurations that cannot describe a real operating day.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("day_hours", self.day_hours),
            ("maintenance_hours", self.maintenance_hours),
            ("crew_max_hours", self.crew_max_hours),
            ("day_start_hour", self.day_start_hour),
            ("cruise_speed_mph", self.cruise_speed_mph),
            ("taxi_overhead_hours", self.taxi_overhead_hours),
            ("regional_turn_hours", self.regional_turn_hours),
            ("narrowbody_turn_hours", self.narrowbody_turn_hours),
            ("widebody_turn_hours", self.widebody_turn_hours),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidRules(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.day_hours <= 0.0 || self.day_hours > 24.0 {
            return Err(CoreError::InvalidRules(format!(
                "day_hours must be within (0, 24], got {}",
                self.day_hours
            )));
        }
        if self.maintenance_hours >= self.day_hours {
            return Err(CoreError::InvalidRules(format!(
                "maintenance_hours ({}) leaves no flying time in a {}h day",
                self.maintenance_hours, self.day_hours
            )));
        }
        if self.crew_max_hours <= 0.0 {
            return Err(CoreError::InvalidRules(
                "crew_max_hours must be positive".to_string(),
            ));
        }
        if self.cruise_speed_mph <= 0.0 {
            return Err(CoreError::InvalidRules(
                "cruise_speed_mph must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bounds for the CBSA suggestion scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionLimits {
    /// Maximum suggestions returned
    pub max_suggestions: usize,
    /// Maximum candidate airport pairs examined before the scan stops
    pub candidate_cap: usize,
}

impl Default for SuggestionLimits {
    fn default() -> Self {
        Self {
            max_suggestions: 10,
            candidate_cap: 250_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_valid() {
        assert!(FleetRules::default().validate().is_ok());
    }

    #[test]
    fn maintenance_must_leave_flying_time() {
        let rules = FleetRules::with_caps(8.0, 8.0, 10.0);
        assert!(matches!(rules.validate(), Err(CoreError::InvalidRules(_))));
    }

    #[test]
    fn negative_caps_are_rejected() {
        assert!(FleetRules::with_caps(18.0, -1.0, 14.0).validate().is_err());
        assert!(FleetRules::with_caps(18.0, 6.0, 0.0).validate().is_err());
        assert!(FleetRules::with_caps(f64::NAN, 6.0, 14.0).validate().is_err());
    }

    #[test]
    fn five_hundred_mile_leg_turns_in_two_hours() {
        let rules = FleetRules::default();
        let total = rules.block_hours(500.0) + rules.turn_hours(EquipmentCategory::Narrowbody);
        assert!((total - 2.0).abs() < 1e-9);
    }
}
