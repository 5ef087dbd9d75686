//! Player body: position, heading, stamina and flashlight battery.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::ops::{Add, Mul, Sub};
use thiserror::Error;

use crate::constants::{EYE_HEIGHT, FLASHLIGHT_NOMINAL_INTENSITY, FOOTSTEP_MIN_STEP, METER_MAX};
use crate::input::InputFrame;
use crate::numbers::clamp_meter;
use crate::rng::{RandomSource, RollStream};
use crate::tuning::{BatteryTuning, MovementTuning, StaminaTuning};

/// Plain 3D vector, persisted as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(value: Vec3) -> Self {
        value.to_array()
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Rejected flashlight transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlashlightError {
    #[error("flashlight battery is depleted")]
    BatteryDepleted,
}

/// What happened to the flashlight during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatteryTick {
    /// Battery reached zero this tick and the light was forced off.
    pub depleted: bool,
    /// Intensity was resampled by the low-battery flicker.
    pub flickered: bool,
}

/// Mutable player meters and body state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub stamina: f32,
    pub battery: f32,
    pub flashlight_on: bool,
    pub flashlight_intensity: f32,
    /// Derived each tick; see [`PlayerState::can_sprint`].
    pub is_sprinting: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            stamina: METER_MAX,
            battery: METER_MAX,
            flashlight_on: false,
            flashlight_intensity: 0.0,
            is_sprinting: false,
        }
    }
}

impl PlayerState {
    /// Sprint requires the sprint flag, stamina left, and a direction held.
    #[must_use]
    pub fn can_sprint(&self, input: &InputFrame) -> bool {
        input.sprint && self.stamina > 0.0 && input.has_movement()
    }

    /// Apply mouse-look; pitch is clamped to straight up/down.
    pub fn apply_look(&mut self, look_delta: (f32, f32), sensitivity: f32) {
        let (dx, dy) = look_delta;
        if dx.is_finite() {
            self.yaw -= dx * sensitivity;
        }
        if dy.is_finite() {
            self.pitch = (self.pitch - dy * sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
        }
    }

    /// Planar facing direction derived from yaw.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Integrate movement for one tick, returning the distance covered.
    pub fn step_movement(
        &mut self,
        delta_secs: f32,
        input: &InputFrame,
        sprinting: bool,
        tuning: &MovementTuning,
    ) -> f32 {
        let forward = self.forward();
        let right = self.right();
        let mut direction = Vec3::ZERO;
        if input.forward {
            direction = direction + forward;
        }
        if input.backward {
            direction = direction - forward;
        }
        if input.right {
            direction = direction + right;
        }
        if input.left {
            direction = direction - right;
        }

        let speed = if sprinting {
            tuning.sprint_speed
        } else {
            tuning.walk_speed
        };
        self.velocity = direction.normalized() * (speed * delta_secs);
        self.position = self.position + self.velocity;
        self.velocity.length()
    }

    /// Whether a displacement is large enough to count as a footstep.
    #[must_use]
    pub fn is_audible_step(displacement: f32) -> bool {
        displacement > FOOTSTEP_MIN_STEP
    }

    /// Drain while sprinting, regenerate otherwise; always within `[0, 100]`.
    pub fn tick_stamina(&mut self, delta_secs: f32, sprinting: bool, tuning: &StaminaTuning) {
        self.stamina = if sprinting {
            clamp_meter(self.stamina - tuning.drain_per_sec * delta_secs)
        } else {
            clamp_meter(self.stamina + tuning.regen_per_sec * delta_secs)
        };
    }

    /// Flip the flashlight; turning on with an empty battery is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`FlashlightError::BatteryDepleted`] when the battery is empty.
    pub fn toggle_flashlight(&mut self) -> Result<bool, FlashlightError> {
        if self.battery <= 0.0 {
            return Err(FlashlightError::BatteryDepleted);
        }
        self.flashlight_on = !self.flashlight_on;
        self.flashlight_intensity = if self.flashlight_on {
            FLASHLIGHT_NOMINAL_INTENSITY
        } else {
            0.0
        };
        Ok(self.flashlight_on)
    }

    /// Drain the battery while lit, flickering below the threshold.
    ///
    /// Reaching zero switches the light off within the same tick.
    pub fn tick_battery(
        &mut self,
        delta_secs: f32,
        tuning: &BatteryTuning,
        rng: &mut dyn RandomSource,
    ) -> BatteryTick {
        let mut outcome = BatteryTick::default();
        if !(self.flashlight_on && self.battery > 0.0) {
            return outcome;
        }

        self.battery = clamp_meter(self.battery - tuning.drain_per_sec * delta_secs);

        if self.battery < tuning.flicker_threshold {
            if rng.roll(RollStream::Flicker) < tuning.flicker_chance {
                let span = tuning.flicker_max_intensity - tuning.flicker_min_intensity;
                self.flashlight_intensity =
                    tuning.flicker_min_intensity + span * rng.roll(RollStream::Flicker);
                outcome.flickered = true;
            }
        } else {
            self.flashlight_intensity = FLASHLIGHT_NOMINAL_INTENSITY;
        }

        if self.battery <= 0.0 {
            self.flashlight_on = false;
            self.flashlight_intensity = 0.0;
            outcome.depleted = true;
        }
        outcome
    }

    /// Recharge the battery, capped at full.
    pub fn add_battery(&mut self, amount: f32) {
        if amount.is_finite() {
            self.battery = clamp_meter(self.battery + amount);
        }
    }

    /// Whether the flashlight currently projects light.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        self.flashlight_on && self.battery > 0.0
    }
}
