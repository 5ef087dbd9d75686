//! Threshold- and event-driven feedback: whispers, scares and game over.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::audio::{AudioCue, AudioEffects};
use crate::constants::GAME_OVER_SANITY;
use crate::rng::{RandomSource, RollStream};
use crate::sanity::{SanityRegime, SanityState};
use crate::schedule::CueSchedule;
use crate::tuning::Tuning;
use crate::ui::UiProjection;

/// Why a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum EndCondition {
    SanityDepleted { message: String },
}

impl EndCondition {
    #[must_use]
    pub fn sanity_depleted() -> Self {
        Self::SanityDepleted {
            message: GAME_OVER_SANITY.to_string(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::SanityDepleted { message } => message,
        }
    }
}

impl fmt::Display for EndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of a discrete feedback event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedbackOutcome {
    pub sanity: f32,
    /// Cues played immediately.
    pub cues: SmallVec<[AudioCue; 2]>,
    /// Cues queued for a later tick.
    pub scheduled: SmallVec<[AudioCue; 2]>,
    /// Set when the event drove sanity to zero.
    pub ended: Option<EndCondition>,
}

/// Audio and UI sinks a feedback call may touch.
pub struct FeedbackSinks<'a> {
    pub audio: &'a mut dyn AudioEffects,
    pub ui: &'a mut dyn UiProjection,
    pub schedule: &'a mut CueSchedule,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDispatcher {
    whispers: u32,
    scares: u32,
}

impl FeedbackDispatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            whispers: 0,
            scares: 0,
        }
    }

    /// Whispers fired since the dispatcher was created or reset.
    #[must_use]
    pub const fn whispers(&self) -> u32 {
        self.whispers
    }

    /// Enemy sightings and jump scares handled.
    #[must_use]
    pub const fn scares(&self) -> u32 {
        self.scares
    }

    /// Continuous per-tick feedback: mirror sanity and maybe whisper.
    pub fn on_tick(
        &mut self,
        sanity: &SanityState,
        tuning: &Tuning,
        rng: &mut dyn RandomSource,
        audio: &mut dyn AudioEffects,
        ui: &mut dyn UiProjection,
    ) -> Option<AudioCue> {
        ui.update_sanity(sanity.percent());
        audio.set_tension(1.0 - sanity.percent() / 100.0);

        if sanity.regime(tuning.sanity.low_threshold) == SanityRegime::Stable {
            return None;
        }
        if rng.roll(RollStream::Whisper) < tuning.sanity.whisper_chance {
            self.whispers = self.whispers.saturating_add(1);
            AudioCue::Whisper.play(audio);
            return Some(AudioCue::Whisper);
        }
        None
    }

    /// The player spotted the adversary: sanity loss and a double heartbeat.
    pub fn on_see_enemy(
        &mut self,
        sanity: &mut SanityState,
        now: f64,
        tuning: &Tuning,
        sinks: FeedbackSinks<'_>,
    ) -> FeedbackOutcome {
        self.scares = self.scares.saturating_add(1);
        sanity.decrease(tuning.sanity.see_enemy_loss);
        AudioCue::Heartbeat.play(sinks.audio);
        sinks
            .schedule
            .schedule(now, tuning.cues.heartbeat_gap_secs, AudioCue::Heartbeat);
        Self::finish(
            sanity,
            sinks.ui,
            &[AudioCue::Heartbeat],
            &[AudioCue::Heartbeat],
        )
    }

    /// A jump scare: larger sanity loss, loud cue, then a delayed screech.
    pub fn on_jump_scare(
        &mut self,
        sanity: &mut SanityState,
        now: f64,
        tuning: &Tuning,
        sinks: FeedbackSinks<'_>,
    ) -> FeedbackOutcome {
        self.scares = self.scares.saturating_add(1);
        sanity.decrease(tuning.sanity.jump_scare_loss);
        AudioCue::JumpScare.play(sinks.audio);
        sinks
            .schedule
            .schedule(now, tuning.cues.screech_delay_secs, AudioCue::Screech);
        Self::finish(
            sanity,
            sinks.ui,
            &[AudioCue::JumpScare],
            &[AudioCue::Screech],
        )
    }

    /// Reading a document steadies the player. No audio.
    pub fn on_read_document(
        &mut self,
        sanity: &mut SanityState,
        tuning: &Tuning,
        ui: &mut dyn UiProjection,
    ) -> FeedbackOutcome {
        sanity.increase(tuning.sanity.read_document_gain);
        Self::finish(sanity, ui, &[], &[])
    }

    /// Terminal check: sanity at zero ends the run.
    #[must_use]
    pub fn terminal(sanity: &SanityState) -> Option<EndCondition> {
        (sanity.sanity <= 0.0).then(EndCondition::sanity_depleted)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn finish(
        sanity: &SanityState,
        ui: &mut dyn UiProjection,
        cues: &[AudioCue],
        scheduled: &[AudioCue],
    ) -> FeedbackOutcome {
        ui.update_sanity(sanity.percent());
        FeedbackOutcome {
            sanity: sanity.sanity,
            cues: cues.iter().copied().collect(),
            scheduled: scheduled.iter().copied().collect(),
            ended: Self::terminal(sanity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentAudio;
    use crate::rng::FixedRoll;
    use crate::ui::HeadlessUi;

    fn low_sanity() -> SanityState {
        SanityState {
            sanity: 20.0,
            ..SanityState::default()
        }
    }

    #[test]
    fn whisper_fires_only_when_low_and_roll_hits() {
        let tuning = Tuning::default();
        let mut dispatcher = FeedbackDispatcher::new();
        let (mut audio, mut ui) = (SilentAudio, HeadlessUi);

        let calm = SanityState::default();
        assert_eq!(
            dispatcher.on_tick(&calm, &tuning, &mut FixedRoll(0.0), &mut audio, &mut ui),
            None
        );
        assert_eq!(
            dispatcher.on_tick(&low_sanity(), &tuning, &mut FixedRoll(0.5), &mut audio, &mut ui),
            None
        );
        assert_eq!(
            dispatcher.on_tick(&low_sanity(), &tuning, &mut FixedRoll(0.0), &mut audio, &mut ui),
            Some(AudioCue::Whisper)
        );
        assert_eq!(dispatcher.whispers(), 1);
    }

    #[test]
    fn jump_scare_costs_fifteen_and_queues_screech() {
        let tuning = Tuning::default();
        let mut dispatcher = FeedbackDispatcher::new();
        let mut sanity = SanityState {
            sanity: 50.0,
            ..SanityState::default()
        };
        let mut schedule = CueSchedule::new();
        let outcome = dispatcher.on_jump_scare(
            &mut sanity,
            3.0,
            &tuning,
            FeedbackSinks {
                audio: &mut SilentAudio,
                ui: &mut HeadlessUi,
                schedule: &mut schedule,
            },
        );
        assert!((outcome.sanity - 35.0).abs() < f32::EPSILON);
        assert_eq!(outcome.cues.as_slice(), &[AudioCue::JumpScare]);
        assert_eq!(outcome.scheduled.as_slice(), &[AudioCue::Screech]);
        assert!(outcome.ended.is_none());
        assert!((schedule.pending()[0].due_at - 3.1).abs() < 1e-9);
    }

    #[test]
    fn see_enemy_schedules_second_heartbeat() {
        let tuning = Tuning::default();
        let mut dispatcher = FeedbackDispatcher::new();
        let mut sanity = SanityState::default();
        let mut schedule = CueSchedule::new();
        let outcome = dispatcher.on_see_enemy(
            &mut sanity,
            0.0,
            &tuning,
            FeedbackSinks {
                audio: &mut SilentAudio,
                ui: &mut HeadlessUi,
                schedule: &mut schedule,
            },
        );
        assert!((outcome.sanity - 90.0).abs() < f32::EPSILON);
        assert_eq!(schedule.drain_due(0.2), vec![AudioCue::Heartbeat]);
        assert_eq!(dispatcher.scares(), 1);
    }

    #[test]
    fn scare_at_low_sanity_reports_end() {
        let tuning = Tuning::default();
        let mut dispatcher = FeedbackDispatcher::new();
        let mut sanity = SanityState {
            sanity: 8.0,
            ..SanityState::default()
        };
        let mut schedule = CueSchedule::new();
        let outcome = dispatcher.on_jump_scare(
            &mut sanity,
            0.0,
            &tuning,
            FeedbackSinks {
                audio: &mut SilentAudio,
                ui: &mut HeadlessUi,
                schedule: &mut schedule,
            },
        );
        assert!((outcome.sanity - 0.0).abs() < f32::EPSILON);
        assert_eq!(outcome.ended, Some(EndCondition::sanity_depleted()));
    }

    #[test]
    fn reading_restores_with_clamp() {
        let tuning = Tuning::default();
        let mut dispatcher = FeedbackDispatcher::new();
        let mut sanity = SanityState {
            sanity: 97.0,
            ..SanityState::default()
        };
        let outcome = dispatcher.on_read_document(&mut sanity, &tuning, &mut HeadlessUi);
        assert!((outcome.sanity - 100.0).abs() < f32::EPSILON);
        assert!(outcome.cues.is_empty());
    }
}
