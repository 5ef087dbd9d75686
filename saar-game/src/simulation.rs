//! Frame-driven simulation session binding the core to its collaborators.

use chrono::Utc;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::PersistenceStore;
use crate::audio::{AudioCue, AudioEffects, AudioInitError, SilentAudio};
use crate::constants::SAVE_SLOT_KEY;
use crate::feedback::{EndCondition, FeedbackDispatcher, FeedbackOutcome, FeedbackSinks};
use crate::input::InputFrame;
use crate::inventory::{Inventory, InventoryError, InventoryItem, ItemEffect, ItemUse};
use crate::numbers::sanitize_delta;
use crate::player::{FlashlightError, PlayerState};
use crate::resources::{ResourceModel, ResourceTick};
use crate::rng::{RandomSource, RngBundle};
use crate::sanity::SanityState;
use crate::save::{SaveData, SaveError, SaveStateCodec};
use crate::schedule::CueSchedule;
use crate::stimulus::{AdversaryPerception, NoAdversary, StimulusRouter, StimulusSet};
use crate::story::{DocumentDiscovery, Progression, StoryCatalog, StoryError};
use crate::tuning::{Tuning, TuningError};
use crate::ui::{HeadlessUi, UiProjection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimStatus {
    Running,
    Paused,
    Ended(EndCondition),
}

impl SimStatus {
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self, Self::Ended(_))
    }
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Paused => f.write_str("paused"),
            Self::Ended(end) => write!(f, "ended: {end}"),
        }
    }
}

/// Something the player can pick up when close enough.
#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    pub prompt: String,
    pub item: InventoryItem,
}

impl Interactable {
    #[must_use]
    pub fn new(prompt: impl Into<String>, item: InventoryItem) -> Self {
        Self {
            prompt: prompt.into(),
            item,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickupError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Story(#[from] StoryError),
}

/// Reasons a [`SimulationBuilder`] refuses to build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid tuning: {0}")]
    Tuning(#[from] TuningError),
    #[error("invalid story catalog: {0}")]
    Story(#[from] StoryError),
}

/// A successful pickup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pickup {
    pub item_id: String,
    /// Document newly discovered by this pickup.
    pub document: Option<u8>,
    pub unlocked_chapter: Option<u8>,
}

pub type CueList = SmallVec<[AudioCue; 4]>;

/// Everything observable from one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub status: SimStatus,
    pub stimuli: StimulusSet,
    pub cues_fired: CueList,
    /// Set only on the tick the run ended.
    pub ended: Option<EndCondition>,
    pub resources: Option<ResourceTick>,
    pub pickup: Option<Result<Pickup, PickupError>>,
}

impl TickOutcome {
    fn idle(status: SimStatus) -> Self {
        Self {
            status,
            stimuli: StimulusSet::new(),
            cues_fired: CueList::new(),
            ended: None,
            resources: None,
            pickup: None,
        }
    }
}

pub struct SimulationBuilder {
    tuning: Tuning,
    catalog: Arc<StoryCatalog>,
    rng: Box<dyn RandomSource>,
    audio: Option<Box<dyn AudioEffects>>,
    adversary: Box<dyn AdversaryPerception>,
    ui: Box<dyn UiProjection>,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tuning: Tuning::shipped().clone(),
            catalog: StoryCatalog::shipped(),
            rng: Box::new(RngBundle::from_user_seed(0)),
            audio: None,
            adversary: Box::new(NoAdversary),
            ui: Box::new(HeadlessUi),
        }
    }

    #[must_use]
    pub fn tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    #[must_use]
    pub fn catalog(mut self, catalog: Arc<StoryCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Seed every random stream from one user seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Box::new(RngBundle::from_user_seed(seed));
        self
    }

    #[must_use]
    pub fn random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[must_use]
    pub fn audio(mut self, audio: impl AudioEffects + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    /// Initialize an audio backend, falling back to silence when it fails.
    #[must_use]
    pub fn try_audio<A, F>(mut self, init: F) -> Self
    where
        A: AudioEffects + 'static,
        F: FnOnce() -> Result<A, AudioInitError>,
    {
        match init() {
            Ok(audio) => self.audio = Some(Box::new(audio)),
            Err(err) => {
                log::warn!("audio disabled: {err}");
                self.audio = None;
            }
        }
        self
    }

    #[must_use]
    pub fn adversary(mut self, adversary: impl AdversaryPerception + 'static) -> Self {
        self.adversary = Box::new(adversary);
        self
    }

    #[must_use]
    pub fn ui(mut self, ui: impl UiProjection + 'static) -> Self {
        self.ui = Box::new(ui);
        self
    }

    /// # Errors
    ///
    /// Returns [`BuildError`] if the tuning or the story catalog is invalid.
    pub fn build(self) -> Result<Simulation, BuildError> {
        self.tuning.validate()?;
        self.catalog.validate()?;
        let audio_enabled = self.audio.is_some();
        let inventory = Inventory::with_capacity(self.tuning.inventory_capacity);
        Ok(Simulation {
            resources: ResourceModel::new(),
            story: Progression::new(self.catalog),
            inventory,
            feedback: FeedbackDispatcher::new(),
            schedule: CueSchedule::new(),
            status: SimStatus::Running,
            elapsed: 0.0,
            nearby: None,
            tuning: self.tuning,
            rng: self.rng,
            audio: self.audio.unwrap_or_else(|| Box::new(SilentAudio)),
            audio_enabled,
            adversary: self.adversary,
            ui: self.ui,
        })
    }
}

/// One running game.
pub struct Simulation {
    resources: ResourceModel,
    story: Progression,
    inventory: Inventory,
    feedback: FeedbackDispatcher,
    schedule: CueSchedule,
    status: SimStatus,
    elapsed: f64,
    nearby: Option<Interactable>,
    tuning: Tuning,
    rng: Box<dyn RandomSource>,
    audio: Box<dyn AudioEffects>,
    audio_enabled: bool,
    adversary: Box<dyn AdversaryPerception>,
    ui: Box<dyn UiProjection>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("status", &self.status)
            .field("elapsed", &self.elapsed)
            .field("resources", &self.resources)
            .field("story", &self.story.snapshot())
            .field("inventory", &self.inventory.len())
            .field("pending_cues", &self.schedule.len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    #[must_use]
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    #[must_use]
    pub const fn status(&self) -> &SimStatus {
        &self.status
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerState {
        &self.resources.player
    }

    #[must_use]
    pub const fn sanity(&self) -> &SanityState {
        &self.resources.sanity
    }

    #[must_use]
    pub const fn story(&self) -> &Progression {
        &self.story
    }

    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[must_use]
    pub const fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    #[must_use]
    pub const fn feedback(&self) -> &FeedbackDispatcher {
        &self.feedback
    }

    /// Simulated seconds spent running.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[must_use]
    pub fn pending_cues(&self) -> usize {
        self.schedule.len()
    }

    #[must_use]
    pub const fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    #[must_use]
    pub const fn nearby_interactable(&self) -> Option<&Interactable> {
        self.nearby.as_ref()
    }

    pub fn start(&mut self) {
        self.audio.start_ambient();
        self.refresh_ui();
    }

    pub fn pause(&mut self) {
        if self.status.is_running() {
            self.status = SimStatus::Paused;
            self.audio.pause();
        }
    }

    pub fn resume(&mut self) {
        if self.status == SimStatus::Paused {
            self.status = SimStatus::Running;
            self.audio.resume();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self.audio.set_volume(volume);
    }

    /// Location logic reports whether the player stands in darkness.
    pub fn set_in_darkness(&mut self, in_darkness: bool) {
        self.resources.sanity.in_darkness = in_darkness;
    }

    pub fn set_in_safe_zone(&mut self, in_safe_zone: bool) {
        self.resources.sanity.in_safe_zone = in_safe_zone;
    }

    /// Update what the player could interact with, toggling the prompt on change.
    pub fn set_nearby_interactable(&mut self, nearby: Option<Interactable>) {
        if self.nearby == nearby {
            return;
        }
        match &nearby {
            Some(target) => self.ui.show_interaction_prompt(Some(&target.prompt)),
            None => self.ui.hide_interaction_prompt(),
        }
        self.nearby = nearby;
    }

    /// # Errors
    ///
    /// Returns [`FlashlightError::BatteryDepleted`] when trying to switch on an empty light.
    pub fn toggle_flashlight(&mut self) -> Result<bool, FlashlightError> {
        let result = self.resources.toggle_flashlight();
        self.ui.update_battery(self.resources.player.battery);
        result
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self, delta_secs: f32, input: &InputFrame) -> TickOutcome {
        if !self.status.is_running() {
            return TickOutcome::idle(self.status.clone());
        }
        let delta_secs = sanitize_delta(delta_secs);
        self.elapsed += f64::from(delta_secs);

        let resources = self
            .resources
            .tick(delta_secs, input, &self.tuning, self.rng.as_mut());
        let mut cues_fired = CueList::new();
        if resources.footstep {
            AudioCue::Footstep.play(self.audio.as_mut());
            cues_fired.push(AudioCue::Footstep);
        }
        if resources.battery_depleted {
            log::debug!("flashlight battery depleted");
        }

        let stimuli = StimulusRouter::route(
            &self.resources.player,
            &self.tuning.stimuli,
            self.adversary.as_mut(),
        );

        self.ui.update_stamina(self.resources.player.stamina);
        self.ui.update_battery(self.resources.player.battery);
        if let Some(cue) = self.feedback.on_tick(
            &self.resources.sanity,
            &self.tuning,
            self.rng.as_mut(),
            self.audio.as_mut(),
            self.ui.as_mut(),
        ) {
            cues_fired.push(cue);
        }

        for cue in self.schedule.drain_due(self.elapsed) {
            cue.play(self.audio.as_mut());
            cues_fired.push(cue);
        }

        let pickup = if input.interact {
            self.pick_up_nearby()
        } else {
            None
        };

        let ended = self.check_terminal();
        TickOutcome {
            status: self.status.clone(),
            stimuli,
            cues_fired,
            ended,
            resources: Some(resources),
            pickup,
        }
    }

    /// The adversary came into view.
    pub fn on_see_enemy(&mut self) -> Option<FeedbackOutcome> {
        if self.status.is_ended() {
            return None;
        }
        let outcome = self.feedback.on_see_enemy(
            &mut self.resources.sanity,
            self.elapsed,
            &self.tuning,
            FeedbackSinks {
                audio: self.audio.as_mut(),
                ui: self.ui.as_mut(),
                schedule: &mut self.schedule,
            },
        );
        self.check_terminal();
        Some(outcome)
    }

    pub fn on_jump_scare(&mut self) -> Option<FeedbackOutcome> {
        if self.status.is_ended() {
            return None;
        }
        let outcome = self.feedback.on_jump_scare(
            &mut self.resources.sanity,
            self.elapsed,
            &self.tuning,
            FeedbackSinks {
                audio: self.audio.as_mut(),
                ui: self.ui.as_mut(),
                schedule: &mut self.schedule,
            },
        );
        self.check_terminal();
        Some(outcome)
    }

    pub fn on_read_document(&mut self) -> Option<FeedbackOutcome> {
        if self.status.is_ended() {
            return None;
        }
        Some(self.feedback.on_read_document(
            &mut self.resources.sanity,
            &self.tuning,
            self.ui.as_mut(),
        ))
    }

    /// Pick up an item directly. Document items also advance the story.
    ///
    /// # Errors
    ///
    /// Fails without side effects when the inventory rejects the item or the
    /// document is unknown.
    pub fn pick_up(&mut self, item: InventoryItem) -> Result<Pickup, PickupError> {
        if let Some(document_id) = item.document_id()
            && self.story.catalog().document(document_id).is_none()
        {
            return Err(StoryError::UnknownDocument(document_id).into());
        }
        let item_id = item.id.clone();
        let document_id = item.document_id();
        self.inventory.add_item(item)?;

        let mut pickup = Pickup {
            item_id,
            document: None,
            unlocked_chapter: None,
        };
        if let Some(id) = document_id {
            let unlocked = match self.story.discover_document(id)? {
                DocumentDiscovery::Found {
                    unlocked_chapter, ..
                } => Some(unlocked_chapter),
                DocumentDiscovery::AlreadyFound => None,
            };
            if let Some(unlocked_chapter) = unlocked {
                pickup.document = Some(id);
                pickup.unlocked_chapter = unlocked_chapter;
                self.ui.update_objective(&self.story.objective_text());
            }
        }
        Ok(pickup)
    }

    /// Use a carried item, applying its effect.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownItem`] if the item is not carried.
    pub fn use_item(&mut self, id: &str) -> Result<ItemUse, InventoryError> {
        let used = self.inventory.use_item(id)?;
        if let Some(ItemEffect::Battery(charge)) = used.item.effect {
            self.resources.player.add_battery(charge);
            self.ui.update_battery(self.resources.player.battery);
        }
        Ok(used)
    }

    /// Move the story cursor forward.
    ///
    /// # Errors
    ///
    /// See [`Progression::advance_chapter`].
    pub fn advance_chapter(&mut self) -> Result<u8, StoryError> {
        let chapter = self.story.advance_chapter()?.id;
        self.ui.update_objective(&self.story.objective_text());
        Ok(chapter)
    }

    /// Discard all progress and start over.
    pub fn new_game(&mut self) {
        let cancelled = self.schedule.cancel_all();
        log::debug!("new game, {cancelled} pending cues cancelled");
        self.resources.reset();
        self.story.reset();
        self.inventory.clear();
        self.feedback.reset();
        self.elapsed = 0.0;
        self.status = SimStatus::Running;
        self.set_nearby_interactable(None);
        self.refresh_ui();
    }

    /// # Errors
    ///
    /// Returns [`SaveError::Store`] when the store rejects the write.
    pub fn save<S: PersistenceStore>(&self, store: &S) -> Result<(), SaveError> {
        let data = SaveData::capture(
            &self.resources.player,
            &self.resources.sanity,
            self.story.snapshot(),
            Utc::now(),
        );
        let blob = SaveStateCodec::encode(&data)?;
        store
            .set(SAVE_SLOT_KEY, &blob)
            .map_err(|err| SaveError::Store(err.to_string()))?;
        log::debug!("saved at chapter {}", data.current_chapter_index);
        Ok(())
    }

    /// Replace the in-memory state with the saved one.
    ///
    /// # Errors
    ///
    /// Any failure leaves the current state untouched.
    pub fn load<S: PersistenceStore>(&mut self, store: &S) -> Result<(), SaveError> {
        let blob = store
            .get(SAVE_SLOT_KEY)
            .map_err(|err| SaveError::Store(err.to_string()))?
            .ok_or(SaveError::Missing)
            .inspect_err(|err| log::warn!("load failed: {err}"))?;
        let loaded = SaveStateCodec::decode(&blob, Arc::clone(self.story.catalog()))
            .inspect_err(|err| log::warn!("save rejected: {err}"))?;

        self.schedule.cancel_all();
        loaded.data.restore_player(&mut self.resources.player);
        self.resources.sanity.sanity = loaded.data.sanity;
        self.story = loaded.story;
        // Documents picked up after the save go back into the world.
        let dropped = self
            .inventory
            .retain_documents(|id| self.story.is_found(id));
        if dropped > 0 {
            log::debug!("{dropped} unsaved documents dropped from the inventory");
        }
        self.status = SimStatus::Running;
        self.refresh_ui();
        log::debug!("loaded save from {}", loaded.data.timestamp);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SaveError::Store`] when the store cannot be read.
    pub fn has_save<S: PersistenceStore>(store: &S) -> Result<bool, SaveError> {
        store
            .get(SAVE_SLOT_KEY)
            .map(|blob| blob.is_some())
            .map_err(|err| SaveError::Store(err.to_string()))
    }

    fn pick_up_nearby(&mut self) -> Option<Result<Pickup, PickupError>> {
        let target = self.nearby.clone()?;
        let result = self.pick_up(target.item);
        if result.is_ok() {
            self.set_nearby_interactable(None);
        }
        Some(result)
    }

    fn check_terminal(&mut self) -> Option<EndCondition> {
        if self.status.is_ended() {
            return None;
        }
        let end = FeedbackDispatcher::terminal(&self.resources.sanity)?;
        let cancelled = self.schedule.cancel_all();
        log::info!("game over after {:.1}s: {end} ({cancelled} cues cancelled)", self.elapsed);
        self.status = SimStatus::Ended(end.clone());
        Some(end)
    }

    fn refresh_ui(&mut self) {
        let player = &self.resources.player;
        self.ui.update_stamina(player.stamina);
        self.ui.update_battery(player.battery);
        self.ui.update_sanity(self.resources.sanity.percent());
        self.ui.update_objective(&self.story.objective_text());
    }
}
