//! Die Saar-Legende simulation core
//!
//! Platform-agnostic survival-horror loop: resource meters, adversary stimuli,
//! threshold-driven feedback, document-gated story progression and save blobs.
//! Rendering, audio synthesis and input devices are collaborators behind traits.

pub mod audio;
pub mod constants;
pub mod feedback;
pub mod input;
pub mod inventory;
pub mod numbers;
pub mod player;
pub mod resources;
pub mod rng;
pub mod sanity;
pub mod save;
pub mod schedule;
pub mod simulation;
pub mod stimulus;
pub mod story;
pub mod tuning;
pub mod ui;

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

// Re-export commonly used types
pub use audio::{AudioCue, AudioEffects, AudioInitError, SilentAudio};
pub use feedback::{EndCondition, FeedbackDispatcher, FeedbackOutcome};
pub use input::InputFrame;
pub use inventory::{Inventory, InventoryError, InventoryItem, ItemEffect, ItemKind, ItemUse};
pub use player::{FlashlightError, PlayerState, Vec3};
pub use resources::{ResourceModel, ResourceTick};
pub use rng::{FixedRoll, RandomSource, RngBundle, RollStream};
pub use sanity::{SanityRegime, SanityState};
pub use save::{LoadedSave, SaveData, SaveError, SaveStateCodec};
pub use schedule::CueSchedule;
pub use simulation::{
    BuildError, Interactable, Pickup, PickupError, SimStatus, Simulation, SimulationBuilder,
    TickOutcome,
};
pub use stimulus::{AdversaryPerception, NoAdversary, Stimulus, StimulusRouter, StimulusSet};
pub use story::{
    ChapterDef, DocumentDef, DocumentDiscovery, Progression, StoryCatalog, StoryError, StoryState,
};
pub use tuning::{Tuning, TuningError};
pub use ui::{HeadlessUi, UiProjection};

/// String-keyed storage for the save slot.
/// Platform-specific implementations should provide this
pub trait PersistenceStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Overwrite a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// In-memory store; clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
