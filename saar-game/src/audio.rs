//! Outbound audio cues.
//!
//! The simulation never synthesizes sound; it only tells an [`AudioEffects`]
//! implementation which cue to play. Calls are fire-and-forget.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Audio backend consumed by the simulation.
pub trait AudioEffects {
    fn play_footstep(&mut self);
    fn play_heartbeat(&mut self);
    fn play_whisper(&mut self);
    fn play_screech(&mut self);
    fn play_jump_scare(&mut self);
    /// Tension drone level in `[0, 1]`.
    fn set_tension(&mut self, level: f32);
    fn start_ambient(&mut self);
    /// Master volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    fn pause(&mut self);
    fn resume(&mut self);
}

/// Raised by an audio backend factory that cannot open a device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("audio backend unavailable: {reason}")]
pub struct AudioInitError {
    pub reason: String,
}

impl AudioInitError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Audio-disabled mode: every call is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioEffects for SilentAudio {
    fn play_footstep(&mut self) {}
    fn play_heartbeat(&mut self) {}
    fn play_whisper(&mut self) {}
    fn play_screech(&mut self) {}
    fn play_jump_scare(&mut self) {}
    fn set_tension(&mut self, _level: f32) {}
    fn start_ambient(&mut self) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn pause(&mut self) {}
    fn resume(&mut self) {}
}

/// One-shot cue the simulation can fire immediately or schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    Footstep,
    Heartbeat,
    Whisper,
    Screech,
    JumpScare,
}

impl AudioCue {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Footstep => "footstep",
            Self::Heartbeat => "heartbeat",
            Self::Whisper => "whisper",
            Self::Screech => "screech",
            Self::JumpScare => "jump_scare",
        }
    }

    /// Dispatch the cue to a backend.
    pub fn play(self, audio: &mut dyn AudioEffects) {
        match self {
            Self::Footstep => audio.play_footstep(),
            Self::Heartbeat => audio.play_heartbeat(),
            Self::Whisper => audio.play_whisper(),
            Self::Screech => audio.play_screech(),
            Self::JumpScare => audio.play_jump_scare(),
        }
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tally {
        calls: Vec<&'static str>,
    }

    impl AudioEffects for Tally {
        fn play_footstep(&mut self) {
            self.calls.push("footstep");
        }
        fn play_heartbeat(&mut self) {
            self.calls.push("heartbeat");
        }
        fn play_whisper(&mut self) {
            self.calls.push("whisper");
        }
        fn play_screech(&mut self) {
            self.calls.push("screech");
        }
        fn play_jump_scare(&mut self) {
            self.calls.push("jump_scare");
        }
        fn set_tension(&mut self, _level: f32) {}
        fn start_ambient(&mut self) {}
        fn set_volume(&mut self, _volume: f32) {}
        fn pause(&mut self) {}
        fn resume(&mut self) {}
    }

    #[test]
    fn cue_dispatch_matches_label() {
        let mut tally = Tally::default();
        for cue in [
            AudioCue::Footstep,
            AudioCue::Heartbeat,
            AudioCue::Whisper,
            AudioCue::Screech,
            AudioCue::JumpScare,
        ] {
            cue.play(&mut tally);
        }
        assert_eq!(
            tally.calls,
            vec!["footstep", "heartbeat", "whisper", "screech", "jump_scare"]
        );
        assert_eq!(AudioCue::JumpScare.to_string(), "jump_scare");
    }

    #[test]
    fn init_error_message() {
        let err = AudioInitError::new("no output device");
        assert_eq!(err.to_string(), "audio backend unavailable: no output device");
    }
}
