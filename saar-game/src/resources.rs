//! Per-tick meter rules: stamina, flashlight battery and sanity.

use serde::{Deserialize, Serialize};

use crate::input::InputFrame;
use crate::player::{FlashlightError, PlayerState};
use crate::rng::{RandomSource, RollStream};
use crate::sanity::{SanityRegime, SanityState};
use crate::tuning::Tuning;

/// Summary of one resource update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceTick {
    pub sprinting: bool,
    /// Distance covered this tick.
    pub displacement: f32,
    /// Footstep roll succeeded while moving.
    pub footstep: bool,
    /// Flashlight toggle requested this tick and its result.
    pub flashlight_toggle: Option<Result<bool, FlashlightError>>,
    pub battery_depleted: bool,
    pub flickered: bool,
    pub regime_before: SanityRegime,
    pub regime: SanityRegime,
}

impl ResourceTick {
    /// Sanity fell below the low threshold during this tick.
    #[must_use]
    pub fn entered_low_sanity(&self) -> bool {
        self.regime_before == SanityRegime::Stable && self.regime != SanityRegime::Stable
    }
}

/// Owner of the player and sanity meters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceModel {
    pub player: PlayerState,
    pub sanity: SanityState,
}

impl ResourceModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every meter by `delta_secs` under the given intent.
    pub fn tick(
        &mut self,
        delta_secs: f32,
        input: &InputFrame,
        tuning: &Tuning,
        rng: &mut dyn RandomSource,
    ) -> ResourceTick {
        let regime_before = self.sanity.regime(tuning.sanity.low_threshold);

        self.player
            .apply_look(input.look_delta, tuning.movement.look_sensitivity);

        let sprinting = self.player.can_sprint(input);
        self.player.is_sprinting = sprinting;
        let displacement =
            self.player
                .step_movement(delta_secs, input, sprinting, &tuning.movement);
        let footstep = PlayerState::is_audible_step(displacement)
            && rng.roll(RollStream::Footstep) < tuning.movement.footstep_chance;

        self.player
            .tick_stamina(delta_secs, sprinting, &tuning.stamina);

        let flashlight_toggle = input.toggle_flashlight.then(|| self.toggle_flashlight());

        let battery = self.player.tick_battery(delta_secs, &tuning.battery, rng);

        self.sanity.tick(delta_secs, &tuning.sanity);
        let regime = self.sanity.regime(tuning.sanity.low_threshold);

        ResourceTick {
            sprinting,
            displacement,
            footstep,
            flashlight_toggle,
            battery_depleted: battery.depleted,
            flickered: battery.flickered,
            regime_before,
            regime,
        }
    }

    /// Toggle the flashlight; switching it on lifts the darkness flag.
    ///
    /// # Errors
    ///
    /// Returns [`FlashlightError::BatteryDepleted`] when the battery is empty.
    pub fn toggle_flashlight(&mut self) -> Result<bool, FlashlightError> {
        let on = self.player.toggle_flashlight()?;
        if on {
            self.sanity.in_darkness = false;
        }
        log::debug!("flashlight {}", if on { "on" } else { "off" });
        Ok(on)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
