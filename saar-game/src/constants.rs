//! Centralized balance and tuning constants for the Saar-Legende simulation.
//!
//! These values are the shipped defaults behind [`crate::tuning::Tuning`].
//! The JSON tuning asset may override them, but every field falls back to the
//! value declared here.

// Meters -------------------------------------------------------------------
pub const METER_MIN: f32 = 0.0;
pub const METER_MAX: f32 = 100.0;

// Stamina ------------------------------------------------------------------
pub(crate) const STAMINA_DRAIN_PER_SEC: f32 = 15.0;
pub(crate) const STAMINA_REGEN_PER_SEC: f32 = 10.0;

// Flashlight ---------------------------------------------------------------
/// Nominal five-minute discharge from a full battery.
pub(crate) const BATTERY_DRAIN_PER_SEC: f32 = 3.33;
pub(crate) const BATTERY_FLICKER_THRESHOLD: f32 = 20.0;
pub(crate) const FLICKER_CHANCE: f32 = 0.1;
pub(crate) const FLICKER_INTENSITY_MIN: f32 = 0.5;
pub(crate) const FLICKER_INTENSITY_MAX: f32 = 1.0;
pub(crate) const FLASHLIGHT_NOMINAL_INTENSITY: f32 = 1.0;

// Sanity -------------------------------------------------------------------
pub(crate) const SANITY_DRAIN_PER_SEC: f32 = 0.5;
pub(crate) const SANITY_RESTORE_PER_SEC: f32 = 2.0;
pub(crate) const LOW_SANITY_THRESHOLD: f32 = 30.0;
pub(crate) const WHISPER_CHANCE: f32 = 0.01;
pub(crate) const SEE_ENEMY_SANITY_LOSS: f32 = 10.0;
pub(crate) const JUMP_SCARE_SANITY_LOSS: f32 = 15.0;
pub(crate) const READ_DOCUMENT_SANITY_GAIN: f32 = 5.0;

// Delayed cues (seconds) ---------------------------------------------------
pub(crate) const HEARTBEAT_GAP_SECS: f64 = 0.2;
pub(crate) const SCREECH_DELAY_SECS: f64 = 0.1;

// Stimuli ------------------------------------------------------------------
pub(crate) const NOISE_RADIUS: f32 = 15.0;
pub(crate) const LIGHT_RADIUS: f32 = 25.0;

// Movement -----------------------------------------------------------------
pub(crate) const WALK_SPEED: f32 = 5.0;
pub(crate) const SPRINT_SPEED: f32 = 8.0;
pub(crate) const LOOK_SENSITIVITY: f32 = 0.002;
pub(crate) const FOOTSTEP_CHANCE: f32 = 0.02;
pub(crate) const FOOTSTEP_MIN_STEP: f32 = 0.01;
pub(crate) const EYE_HEIGHT: f32 = 1.7;

// Inventory ----------------------------------------------------------------
pub(crate) const INVENTORY_CAPACITY: usize = 16;

// Persistence --------------------------------------------------------------
pub const SAVE_SLOT_KEY: &str = "saarHorrorGameState";
pub(crate) const SAVE_VERSION: u32 = 1;

// Messages -----------------------------------------------------------------
pub(crate) const GAME_OVER_SANITY: &str = "Du hast deinen Verstand verloren...";
pub(crate) const DEFAULT_HINT: &str = "Explore the area carefully.";
