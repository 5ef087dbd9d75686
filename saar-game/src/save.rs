//! Versioned, checksummed save blobs.
//!
//! The blob is a JSON envelope `{ version, checksum, payload }`. `payload` is
//! the JSON text of [`SaveData`] and `checksum` its XxHash64 in hex. Decoding
//! validates everything before handing anything back, so a failed load never
//! touches live state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use std::sync::Arc;
use thiserror::Error;
use twox_hash::XxHash64;

use crate::constants::{FLASHLIGHT_NOMINAL_INTENSITY, METER_MAX, METER_MIN, SAVE_VERSION};
use crate::player::{PlayerState, Vec3};
use crate::sanity::SanityState;
use crate::story::{Progression, StoryCatalog, StoryState};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no save in slot")]
    Missing,
    #[error("save is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
    #[error("save checksum mismatch")]
    ChecksumMismatch,
    #[error("invalid save: {0}")]
    Invalid(String),
    #[error("persistence store failed: {0}")]
    Store(String),
}

/// Logical save schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub position: [f32; 3],
    pub stamina: f32,
    pub battery: f32,
    pub flashlight_on: bool,
    pub sanity: f32,
    pub current_chapter_index: u8,
    pub documents_found_ids: Vec<u8>,
    pub chapter_unlocked: Vec<bool>,
    pub timestamp: DateTime<Utc>,
}

impl SaveData {
    #[must_use]
    pub fn capture(
        player: &PlayerState,
        sanity: &SanityState,
        story: StoryState,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            position: player.position.to_array(),
            stamina: player.stamina,
            battery: player.battery,
            flashlight_on: player.flashlight_on,
            sanity: sanity.sanity,
            current_chapter_index: story.current_chapter_index,
            documents_found_ids: story.documents_found_ids,
            chapter_unlocked: story.chapter_unlocked,
            timestamp,
        }
    }

    #[must_use]
    pub fn story_state(&self) -> StoryState {
        StoryState {
            current_chapter_index: self.current_chapter_index,
            documents_found_ids: self.documents_found_ids.clone(),
            chapter_unlocked: self.chapter_unlocked.clone(),
        }
    }

    /// Copy the saved body and meters onto `player`. Motion state is cleared.
    pub fn restore_player(&self, player: &mut PlayerState) {
        player.position = Vec3::from(self.position);
        player.velocity = Vec3::ZERO;
        player.stamina = self.stamina;
        player.battery = self.battery;
        player.flashlight_on = self.flashlight_on;
        player.flashlight_intensity = if self.flashlight_on {
            FLASHLIGHT_NOMINAL_INTENSITY
        } else {
            0.0
        };
        player.is_sprinting = false;
    }

    fn validate_meters(&self) -> Result<(), SaveError> {
        if !self.position.iter().all(|axis| axis.is_finite()) {
            return Err(SaveError::Invalid("position is not finite".into()));
        }
        let meters = [
            ("stamina", self.stamina),
            ("battery", self.battery),
            ("sanity", self.sanity),
        ];
        for (name, value) in meters {
            if !value.is_finite() || !(METER_MIN..=METER_MAX).contains(&value) {
                return Err(SaveError::Invalid(format!("{name} {value} out of range")));
            }
        }
        if self.flashlight_on && self.battery <= 0.0 {
            return Err(SaveError::Invalid("flashlight on with empty battery".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SaveEnvelope {
    version: u32,
    checksum: String,
    payload: String,
}

/// A decoded and validated save.
#[derive(Debug, Clone)]
pub struct LoadedSave {
    pub data: SaveData,
    pub story: Progression,
}

pub struct SaveStateCodec;

impl SaveStateCodec {
    /// # Errors
    ///
    /// Returns [`SaveError::Malformed`] if serialization fails.
    pub fn encode(data: &SaveData) -> Result<String, SaveError> {
        let payload = serde_json::to_string(data)?;
        let envelope = SaveEnvelope {
            version: SAVE_VERSION,
            checksum: checksum(&payload),
            payload,
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Decode and validate a blob against the story catalog.
    ///
    /// # Errors
    ///
    /// Any structural, version, checksum or range problem yields a [`SaveError`].
    pub fn decode(blob: &str, catalog: Arc<StoryCatalog>) -> Result<LoadedSave, SaveError> {
        let envelope: SaveEnvelope = serde_json::from_str(blob)?;
        if envelope.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(envelope.version));
        }
        if checksum(&envelope.payload) != envelope.checksum {
            return Err(SaveError::ChecksumMismatch);
        }
        let data: SaveData = serde_json::from_str(&envelope.payload)?;
        data.validate_meters()?;
        let story = Progression::from_state(catalog, &data.story_state())
            .map_err(|err| SaveError::Invalid(err.to_string()))?;
        Ok(LoadedSave { data, story })
    }
}

fn checksum(payload: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(payload.as_bytes());
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> SaveData {
        let mut story = Progression::default();
        story.discover_document(1).unwrap();
        story.discover_document(2).unwrap();
        story.advance_chapter().unwrap();
        let player = PlayerState {
            position: Vec3::new(4.5, 1.7, -12.25),
            stamina: 63.5,
            battery: 41.0,
            flashlight_on: true,
            ..PlayerState::default()
        };
        let sanity = SanityState {
            sanity: 72.0,
            ..SanityState::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 10, 31, 23, 0, 0).unwrap();
        SaveData::capture(&player, &sanity, story.snapshot(), at)
    }

    #[test]
    fn encode_then_decode_restores_state() {
        let data = sample();
        let blob = SaveStateCodec::encode(&data).unwrap();
        let loaded = SaveStateCodec::decode(&blob, StoryCatalog::shipped()).unwrap();
        assert_eq!(loaded.data, data);
        assert_eq!(loaded.story.current_chapter_index(), 1);
        assert_eq!(loaded.story.found_ids(), &[1, 2]);
    }

    #[test]
    fn payload_uses_camel_case_schema() {
        let blob = SaveStateCodec::encode(&sample()).unwrap();
        let envelope: SaveEnvelope = serde_json::from_str(&blob).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&envelope.payload).unwrap();
        for key in [
            "position",
            "stamina",
            "battery",
            "flashlightOn",
            "sanity",
            "currentChapterIndex",
            "documentsFoundIds",
            "chapterUnlocked",
            "timestamp",
        ] {
            assert!(payload.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn tampered_payload_fails_checksum() {
        let blob = SaveStateCodec::encode(&sample()).unwrap();
        let tampered = blob.replace("72.0", "99.0");
        assert!(matches!(
            SaveStateCodec::decode(&tampered, StoryCatalog::shipped()),
            Err(SaveError::ChecksumMismatch)
        ));
    }

    #[test]
    fn rejects_garbage_and_future_versions() {
        assert!(matches!(
            SaveStateCodec::decode("not json", StoryCatalog::shipped()),
            Err(SaveError::Malformed(_))
        ));
        let future = r#"{"version":9,"checksum":"0","payload":"{}"}"#;
        assert!(matches!(
            SaveStateCodec::decode(future, StoryCatalog::shipped()),
            Err(SaveError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn rejects_out_of_range_meters() {
        let mut data = sample();
        data.sanity = 140.0;
        let blob = SaveStateCodec::encode(&data).unwrap();
        assert!(matches!(
            SaveStateCodec::decode(&blob, StoryCatalog::shipped()),
            Err(SaveError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_locked_cursor() {
        let mut data = sample();
        data.current_chapter_index = 5;
        let blob = SaveStateCodec::encode(&data).unwrap();
        assert!(matches!(
            SaveStateCodec::decode(&blob, StoryCatalog::shipped()),
            Err(SaveError::Invalid(msg)) if msg.contains("locked")
        ));
    }
}
