//! Translation of player state into noise and light stimuli.
//!
//! Stimuli are pushed to the adversary every tick the condition holds. There
//! is no queue, no coalescing and no acknowledgment.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::player::{PlayerState, Vec3};
use crate::tuning::StimulusTuning;

/// Perception interface of the (external) adversary.
pub trait AdversaryPerception {
    fn hear_noise(&mut self, position: Vec3, radius: f32);
    fn see_light(&mut self, position: Vec3, radius: f32);
}

/// Adversary stand-in that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdversary;

impl AdversaryPerception for NoAdversary {
    fn hear_noise(&mut self, _position: Vec3, _radius: f32) {}
    fn see_light(&mut self, _position: Vec3, _radius: f32) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stimulus {
    Noise { position: Vec3, radius: f32 },
    Light { position: Vec3, radius: f32 },
}

impl Stimulus {
    fn deliver(self, adversary: &mut dyn AdversaryPerception) {
        match self {
            Self::Noise { position, radius } => adversary.hear_noise(position, radius),
            Self::Light { position, radius } => adversary.see_light(position, radius),
        }
    }
}

/// At most one noise and one light per tick.
pub type StimulusSet = SmallVec<[Stimulus; 2]>;

/// Stateless router from player state to adversary notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct StimulusRouter;

impl StimulusRouter {
    /// Stimuli implied by the post-update player state.
    #[must_use]
    pub fn derive(player: &PlayerState, tuning: &StimulusTuning) -> StimulusSet {
        let mut stimuli = StimulusSet::new();
        if player.is_sprinting {
            stimuli.push(Stimulus::Noise {
                position: player.position,
                radius: tuning.noise_radius,
            });
        }
        if player.is_lit() {
            stimuli.push(Stimulus::Light {
                position: player.position,
                radius: tuning.light_radius,
            });
        }
        stimuli
    }

    /// Derive and push this tick's stimuli, returning what was sent.
    pub fn route(
        player: &PlayerState,
        tuning: &StimulusTuning,
        adversary: &mut dyn AdversaryPerception,
    ) -> StimulusSet {
        let stimuli = Self::derive(player, tuning);
        for stimulus in &stimuli {
            stimulus.deliver(adversary);
        }
        stimuli
    }
}
