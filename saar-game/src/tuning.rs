//! Tunable rates, thresholds and probabilities for the simulation.
//!
//! Every field carries a serde default, so a partial JSON document only
//! overrides the values it names.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants;

/// Errors raised when tuning invariants are violated.
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("{field} must be non-negative and finite (got {value:.3})")]
    NegativeRate { field: &'static str, value: f32 },
    #[error("{field} must be a probability in [0, 1] (got {value:.3})")]
    Probability { field: &'static str, value: f32 },
    #[error("{field} must lie within the meter range [0, 100] (got {value:.3})")]
    Threshold { field: &'static str, value: f32 },
    #[error("flicker intensity range [{min:.2}, {max:.2}] must satisfy 0 <= min <= max <= 1")]
    FlickerRange { min: f32, max: f32 },
    #[error("inventory capacity must be at least 1")]
    EmptyInventory,
    #[error("sprint speed {sprint:.2} is slower than walk speed {walk:.2}")]
    SprintSlowerThanWalk { walk: f32, sprint: f32 },
    #[error("tuning document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaTuning {
    #[serde(default = "StaminaTuning::default_drain")]
    pub drain_per_sec: f32,
    #[serde(default = "StaminaTuning::default_regen")]
    pub regen_per_sec: f32,
}

impl StaminaTuning {
    const fn default_drain() -> f32 {
        constants::STAMINA_DRAIN_PER_SEC
    }

    const fn default_regen() -> f32 {
        constants::STAMINA_REGEN_PER_SEC
    }
}

impl Default for StaminaTuning {
    fn default() -> Self {
        Self {
            drain_per_sec: Self::default_drain(),
            regen_per_sec: Self::default_regen(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryTuning {
    #[serde(default = "BatteryTuning::default_drain")]
    pub drain_per_sec: f32,
    #[serde(default = "BatteryTuning::default_flicker_threshold")]
    pub flicker_threshold: f32,
    #[serde(default = "BatteryTuning::default_flicker_chance")]
    pub flicker_chance: f32,
    /// Dimmest intensity a flicker can resample to.
    #[serde(default = "BatteryTuning::default_flicker_min_intensity")]
    pub flicker_min_intensity: f32,
    #[serde(default = "BatteryTuning::default_flicker_max_intensity")]
    pub flicker_max_intensity: f32,
}

impl BatteryTuning {
    const fn default_drain() -> f32 {
        constants::BATTERY_DRAIN_PER_SEC
    }

    const fn default_flicker_threshold() -> f32 {
        constants::BATTERY_FLICKER_THRESHOLD
    }

    const fn default_flicker_chance() -> f32 {
        constants::FLICKER_CHANCE
    }

    const fn default_flicker_min_intensity() -> f32 {
        constants::FLICKER_INTENSITY_MIN
    }

    const fn default_flicker_max_intensity() -> f32 {
        constants::FLICKER_INTENSITY_MAX
    }
}

impl Default for BatteryTuning {
    fn default() -> Self {
        Self {
            drain_per_sec: Self::default_drain(),
            flicker_threshold: Self::default_flicker_threshold(),
            flicker_chance: Self::default_flicker_chance(),
            flicker_min_intensity: Self::default_flicker_min_intensity(),
            flicker_max_intensity: Self::default_flicker_max_intensity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityTuning {
    #[serde(default = "SanityTuning::default_drain")]
    pub drain_per_sec: f32,
    #[serde(default = "SanityTuning::default_restore")]
    pub restore_per_sec: f32,
    #[serde(default = "SanityTuning::default_low_threshold")]
    pub low_threshold: f32,
    /// Per-tick chance of a whisper cue while sanity is low.
    #[serde(default = "SanityTuning::default_whisper_chance")]
    pub whisper_chance: f32,
    #[serde(default = "SanityTuning::default_see_enemy_loss")]
    pub see_enemy_loss: f32,
    #[serde(default = "SanityTuning::default_jump_scare_loss")]
    pub jump_scare_loss: f32,
    #[serde(default = "SanityTuning::default_read_document_gain")]
    pub read_document_gain: f32,
}

impl SanityTuning {
    const fn default_drain() -> f32 {
        constants::SANITY_DRAIN_PER_SEC
    }

    const fn default_restore() -> f32 {
        constants::SANITY_RESTORE_PER_SEC
    }

    const fn default_low_threshold() -> f32 {
        constants::LOW_SANITY_THRESHOLD
    }

    const fn default_whisper_chance() -> f32 {
        constants::WHISPER_CHANCE
    }

    const fn default_see_enemy_loss() -> f32 {
        constants::SEE_ENEMY_SANITY_LOSS
    }

    const fn default_jump_scare_loss() -> f32 {
        constants::JUMP_SCARE_SANITY_LOSS
    }

    const fn default_read_document_gain() -> f32 {
        constants::READ_DOCUMENT_SANITY_GAIN
    }
}

impl Default for SanityTuning {
    fn default() -> Self {
        Self {
            drain_per_sec: Self::default_drain(),
            restore_per_sec: Self::default_restore(),
            low_threshold: Self::default_low_threshold(),
            whisper_chance: Self::default_whisper_chance(),
            see_enemy_loss: Self::default_see_enemy_loss(),
            jump_scare_loss: Self::default_jump_scare_loss(),
            read_document_gain: Self::default_read_document_gain(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueTuning {
    #[serde(default = "CueTuning::default_heartbeat_gap")]
    pub heartbeat_gap_secs: f64,
    #[serde(default = "CueTuning::default_screech_delay")]
    pub screech_delay_secs: f64,
}

impl CueTuning {
    const fn default_heartbeat_gap() -> f64 {
        constants::HEARTBEAT_GAP_SECS
    }

    const fn default_screech_delay() -> f64 {
        constants::SCREECH_DELAY_SECS
    }
}

impl Default for CueTuning {
    fn default() -> Self {
        Self {
            heartbeat_gap_secs: Self::default_heartbeat_gap(),
            screech_delay_secs: Self::default_screech_delay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusTuning {
    #[serde(default = "StimulusTuning::default_noise_radius")]
    pub noise_radius: f32,
    #[serde(default = "StimulusTuning::default_light_radius")]
    pub light_radius: f32,
}

impl StimulusTuning {
    const fn default_noise_radius() -> f32 {
        constants::NOISE_RADIUS
    }

    const fn default_light_radius() -> f32 {
        constants::LIGHT_RADIUS
    }
}

impl Default for StimulusTuning {
    fn default() -> Self {
        Self {
            noise_radius: Self::default_noise_radius(),
            light_radius: Self::default_light_radius(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementTuning {
    #[serde(default = "MovementTuning::default_walk_speed")]
    pub walk_speed: f32,
    #[serde(default = "MovementTuning::default_sprint_speed")]
    pub sprint_speed: f32,
    #[serde(default = "MovementTuning::default_look_sensitivity")]
    pub look_sensitivity: f32,
    #[serde(default = "MovementTuning::default_footstep_chance")]
    pub footstep_chance: f32,
}

impl MovementTuning {
    const fn default_walk_speed() -> f32 {
        constants::WALK_SPEED
    }

    const fn default_sprint_speed() -> f32 {
        constants::SPRINT_SPEED
    }

    const fn default_look_sensitivity() -> f32 {
        constants::LOOK_SENSITIVITY
    }

    const fn default_footstep_chance() -> f32 {
        constants::FOOTSTEP_CHANCE
    }
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            walk_speed: Self::default_walk_speed(),
            sprint_speed: Self::default_sprint_speed(),
            look_sensitivity: Self::default_look_sensitivity(),
            footstep_chance: Self::default_footstep_chance(),
        }
    }
}

/// Complete tuning document for one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    #[serde(default)]
    pub stamina: StaminaTuning,
    #[serde(default)]
    pub battery: BatteryTuning,
    #[serde(default)]
    pub sanity: SanityTuning,
    #[serde(default)]
    pub cues: CueTuning,
    #[serde(default)]
    pub stimuli: StimulusTuning,
    #[serde(default)]
    pub movement: MovementTuning,
    #[serde(default = "Tuning::default_inventory_capacity")]
    pub inventory_capacity: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            stamina: StaminaTuning::default(),
            battery: BatteryTuning::default(),
            sanity: SanityTuning::default(),
            cues: CueTuning::default(),
            stimuli: StimulusTuning::default(),
            movement: MovementTuning::default(),
            inventory_capacity: Self::default_inventory_capacity(),
        }
    }
}

impl Tuning {
    const fn default_inventory_capacity() -> usize {
        constants::INVENTORY_CAPACITY
    }

    /// Parse and validate a tuning document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or violates an invariant.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Tuning shipped with the crate.
    #[must_use]
    pub fn shipped() -> &'static Self {
        static SHIPPED: OnceLock<Tuning> = OnceLock::new();
        SHIPPED.get_or_init(|| {
            Self::from_json(include_str!("../assets/tuning.json")).unwrap_or_else(|err| {
                log::warn!("shipped tuning rejected, using built-in defaults: {err}");
                Self::default()
            })
        })
    }

    /// Check every rate, threshold and probability.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), TuningError> {
        let rates = [
            ("stamina.drain_per_sec", self.stamina.drain_per_sec),
            ("stamina.regen_per_sec", self.stamina.regen_per_sec),
            ("battery.drain_per_sec", self.battery.drain_per_sec),
            ("sanity.drain_per_sec", self.sanity.drain_per_sec),
            ("sanity.restore_per_sec", self.sanity.restore_per_sec),
            ("sanity.see_enemy_loss", self.sanity.see_enemy_loss),
            ("sanity.jump_scare_loss", self.sanity.jump_scare_loss),
            ("sanity.read_document_gain", self.sanity.read_document_gain),
            ("stimuli.noise_radius", self.stimuli.noise_radius),
            ("stimuli.light_radius", self.stimuli.light_radius),
            ("movement.walk_speed", self.movement.walk_speed),
            ("movement.sprint_speed", self.movement.sprint_speed),
            ("movement.look_sensitivity", self.movement.look_sensitivity),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::NegativeRate { field, value });
            }
        }

        let delays = [
            ("cues.heartbeat_gap_secs", self.cues.heartbeat_gap_secs),
            ("cues.screech_delay_secs", self.cues.screech_delay_secs),
        ];
        for (field, value) in delays {
            if !value.is_finite() || value < 0.0 {
                #[allow(clippy::cast_possible_truncation)]
                let value = value as f32;
                return Err(TuningError::NegativeRate { field, value });
            }
        }

        let probabilities = [
            ("battery.flicker_chance", self.battery.flicker_chance),
            ("sanity.whisper_chance", self.sanity.whisper_chance),
            ("movement.footstep_chance", self.movement.footstep_chance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::Probability { field, value });
            }
        }

        let thresholds = [
            ("battery.flicker_threshold", self.battery.flicker_threshold),
            ("sanity.low_threshold", self.sanity.low_threshold),
        ];
        for (field, value) in thresholds {
            if !(constants::METER_MIN..=constants::METER_MAX).contains(&value) {
                return Err(TuningError::Threshold { field, value });
            }
        }

        let (min, max) = (
            self.battery.flicker_min_intensity,
            self.battery.flicker_max_intensity,
        );
        if !(0.0..=1.0).contains(&min) || !(min..=1.0).contains(&max) {
            return Err(TuningError::FlickerRange { min, max });
        }

        if self.inventory_capacity == 0 {
            return Err(TuningError::EmptyInventory);
        }
        if self.movement.sprint_speed < self.movement.walk_speed {
            return Err(TuningError::SprintSlowerThanWalk {
                walk: self.movement.walk_speed,
                sprint: self.movement.sprint_speed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_tuning_matches_defaults() {
        assert_eq!(Tuning::shipped(), &Tuning::default());
    }

    #[test]
    fn partial_document_keeps_remaining_defaults() {
        let tuning = Tuning::from_json(r#"{ "stamina": { "drain_per_sec": 20.0 } }"#).unwrap();
        assert!((tuning.stamina.drain_per_sec - 20.0).abs() < f32::EPSILON);
        assert!((tuning.stamina.regen_per_sec - 10.0).abs() < f32::EPSILON);
        assert_eq!(tuning.inventory_capacity, 16);
    }

    #[test]
    fn rejects_inverted_flicker_range() {
        let err = Tuning::from_json(
            r#"{ "battery": { "flicker_min_intensity": 0.9, "flicker_max_intensity": 0.4 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TuningError::FlickerRange { .. }));

        let tuning =
            Tuning::from_json(r#"{ "battery": { "flicker_max_intensity": 0.8 } }"#).unwrap();
        assert!((tuning.battery.flicker_min_intensity - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_invalid_probability() {
        let err = Tuning::from_json(r#"{ "sanity": { "whisper_chance": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Probability {
                field: "sanity.whisper_chance",
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_rate_and_bad_threshold() {
        let mut tuning = Tuning::default();
        tuning.battery.drain_per_sec = -1.0;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NegativeRate { .. })
        ));

        let mut tuning = Tuning::default();
        tuning.sanity.low_threshold = 140.0;
        assert!(matches!(tuning.validate(), Err(TuningError::Threshold { .. })));
    }

    #[test]
    fn rejects_empty_inventory_and_malformed_json() {
        let mut tuning = Tuning::default();
        tuning.inventory_capacity = 0;
        assert!(matches!(tuning.validate(), Err(TuningError::EmptyInventory)));
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }
}
