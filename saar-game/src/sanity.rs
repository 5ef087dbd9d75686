//! Sanity meter with darkness drain and safe-zone restoration.

use serde::{Deserialize, Serialize};

use crate::constants::METER_MAX;
use crate::numbers::clamp_meter;
use crate::tuning::SanityTuning;

/// Coarse sanity bands polled by the feedback layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanityRegime {
    Stable,
    Low,
    Depleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityState {
    pub sanity: f32,
    pub in_darkness: bool,
    pub in_safe_zone: bool,
}

impl Default for SanityState {
    fn default() -> Self {
        Self {
            sanity: METER_MAX,
            in_darkness: false,
            in_safe_zone: false,
        }
    }
}

impl SanityState {
    /// Apply darkness drain and safe-zone restore for one tick.
    ///
    /// Both flags are evaluated independently; when both hold the effects add up.
    pub fn tick(&mut self, delta_secs: f32, tuning: &SanityTuning) {
        let mut next = self.sanity;
        if self.in_darkness {
            next -= tuning.drain_per_sec * delta_secs;
        }
        if self.in_safe_zone {
            next += tuning.restore_per_sec * delta_secs;
        }
        self.sanity = clamp_meter(next);
    }

    pub fn decrease(&mut self, amount: f32) {
        if amount.is_finite() {
            self.sanity = clamp_meter(self.sanity - amount);
        }
    }

    pub fn increase(&mut self, amount: f32) {
        if amount.is_finite() {
            self.sanity = clamp_meter(self.sanity + amount);
        }
    }

    #[must_use]
    pub fn percent(&self) -> f32 {
        self.sanity / METER_MAX * 100.0
    }

    #[must_use]
    pub fn regime(&self, low_threshold: f32) -> SanityRegime {
        if self.sanity <= 0.0 {
            SanityRegime::Depleted
        } else if self.sanity < low_threshold {
            SanityRegime::Low
        } else {
            SanityRegime::Stable
        }
    }

    /// Clear zone flags and refill.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn darkness_drains_half_point_per_second() {
        let tuning = Tuning::default();
        let mut state = SanityState {
            in_darkness: true,
            ..SanityState::default()
        };
        for _ in 0..40 {
            state.tick(0.1, &tuning.sanity);
        }
        assert!((state.sanity - 98.0).abs() < 1e-3);
    }

    #[test]
    fn darkness_and_safe_zone_are_additive() {
        let tuning = Tuning::default();
        let mut state = SanityState {
            sanity: 50.0,
            in_darkness: true,
            in_safe_zone: true,
        };
        state.tick(2.0, &tuning.sanity);
        // -0.5*2 + 2*2 = +3
        assert!((state.sanity - 53.0).abs() < 1e-4);
    }

    #[test]
    fn discrete_changes_clamp() {
        let mut state = SanityState::default();
        state.increase(5.0);
        assert!((state.sanity - 100.0).abs() < f32::EPSILON);
        state.sanity = 4.0;
        state.decrease(15.0);
        assert!((state.sanity - 0.0).abs() < f32::EPSILON);
        assert_eq!(state.regime(30.0), SanityRegime::Depleted);
    }

    #[test]
    fn regime_boundaries() {
        let mut state = SanityState::default();
        state.sanity = 30.0;
        assert_eq!(state.regime(30.0), SanityRegime::Stable);
        state.sanity = 29.9;
        assert_eq!(state.regime(30.0), SanityRegime::Low);
    }
}
