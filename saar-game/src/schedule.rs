//! Deferred audio cues drained against the simulation clock.
//!
//! Two-part cues (heartbeat double-thump, jump scare followed by a screech)
//! queue their second half here instead of using wall-clock timers, so every
//! delayed effect fires deterministically on a tick and can be cancelled.

use serde::{Deserialize, Serialize};

use crate::audio::AudioCue;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCue {
    /// Simulation time (seconds) at which the cue becomes due.
    pub due_at: f64,
    pub cue: AudioCue,
}

/// Time-ordered queue of pending cues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CueSchedule {
    pending: Vec<ScheduledCue>,
}

impl CueSchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `cue` to fire `delay_secs` after `now`.
    pub fn schedule(&mut self, now: f64, delay_secs: f64, cue: AudioCue) {
        let due_at = now + delay_secs.max(0.0);
        let entry = ScheduledCue { due_at, cue };
        // Equal due times keep insertion order.
        let idx = self
            .pending
            .partition_point(|existing| existing.due_at <= due_at);
        self.pending.insert(idx, entry);
    }

    /// Remove and return every cue due at or before `now`, oldest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<AudioCue> {
        let split = self.pending.partition_point(|entry| entry.due_at <= now);
        self.pending.drain(..split).map(|entry| entry.cue).collect()
    }

    /// Drop every pending cue, returning how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn pending(&self) -> &[ScheduledCue] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_due_order_and_keeps_future_cues() {
        let mut schedule = CueSchedule::new();
        schedule.schedule(0.0, 0.2, AudioCue::Heartbeat);
        schedule.schedule(0.0, 0.1, AudioCue::Screech);
        schedule.schedule(0.0, 1.0, AudioCue::Whisper);

        assert!(schedule.drain_due(0.05).is_empty());
        assert_eq!(
            schedule.drain_due(0.25),
            vec![AudioCue::Screech, AudioCue::Heartbeat]
        );
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn equal_due_times_fire_in_insertion_order() {
        let mut schedule = CueSchedule::new();
        schedule.schedule(1.0, 0.5, AudioCue::Heartbeat);
        schedule.schedule(1.0, 0.5, AudioCue::Screech);
        assert_eq!(
            schedule.drain_due(1.5),
            vec![AudioCue::Heartbeat, AudioCue::Screech]
        );
    }

    #[test]
    fn cancel_clears_everything() {
        let mut schedule = CueSchedule::new();
        schedule.schedule(0.0, 0.1, AudioCue::Screech);
        schedule.schedule(0.0, 0.2, AudioCue::Heartbeat);
        assert_eq!(schedule.cancel_all(), 2);
        assert!(schedule.is_empty());
        assert!(schedule.drain_due(10.0).is_empty());
    }
}
