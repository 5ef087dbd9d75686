#![allow(dead_code)]

use saar_game::{
    AdversaryPerception, AudioEffects, InputFrame, RandomSource, SaveData, SaveStateCodec,
    SanityState, Simulation, StoryState, TickOutcome, UiProjection, Vec3,
};
use saar_game::{MemoryStore, PersistenceStore, PlayerState, Progression, constants};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Footstep,
    Heartbeat,
    Whisper,
    Screech,
    JumpScare,
    Tension(f32),
    Ambient,
    Volume(f32),
    Pause,
    Resume,
    Noise(f32),
    Light(f32),
    Stamina(f32),
    Battery(f32),
    Sanity(f32),
    Prompt(Option<String>),
    HidePrompt,
    Objective(String),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct RecordingAudio(pub CallLog);

impl AudioEffects for RecordingAudio {
    fn play_footstep(&mut self) {
        self.0.borrow_mut().push(Call::Footstep);
    }
    fn play_heartbeat(&mut self) {
        self.0.borrow_mut().push(Call::Heartbeat);
    }
    fn play_whisper(&mut self) {
        self.0.borrow_mut().push(Call::Whisper);
    }
    fn play_screech(&mut self) {
        self.0.borrow_mut().push(Call::Screech);
    }
    fn play_jump_scare(&mut self) {
        self.0.borrow_mut().push(Call::JumpScare);
    }
    fn set_tension(&mut self, level: f32) {
        self.0.borrow_mut().push(Call::Tension(level));
    }
    fn start_ambient(&mut self) {
        self.0.borrow_mut().push(Call::Ambient);
    }
    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().push(Call::Volume(volume));
    }
    fn pause(&mut self) {
        self.0.borrow_mut().push(Call::Pause);
    }
    fn resume(&mut self) {
        self.0.borrow_mut().push(Call::Resume);
    }
}

pub struct RecordingAdversary(pub CallLog);

impl AdversaryPerception for RecordingAdversary {
    fn hear_noise(&mut self, _position: Vec3, radius: f32) {
        self.0.borrow_mut().push(Call::Noise(radius));
    }
    fn see_light(&mut self, _position: Vec3, radius: f32) {
        self.0.borrow_mut().push(Call::Light(radius));
    }
}

pub struct RecordingUi(pub CallLog);

impl UiProjection for RecordingUi {
    fn update_stamina(&mut self, percent: f32) {
        self.0.borrow_mut().push(Call::Stamina(percent));
    }
    fn update_battery(&mut self, percent: f32) {
        self.0.borrow_mut().push(Call::Battery(percent));
    }
    fn update_sanity(&mut self, percent: f32) {
        self.0.borrow_mut().push(Call::Sanity(percent));
    }
    fn show_interaction_prompt(&mut self, text: Option<&str>) {
        self.0
            .borrow_mut()
            .push(Call::Prompt(text.map(str::to_string)));
    }
    fn hide_interaction_prompt(&mut self) {
        self.0.borrow_mut().push(Call::HidePrompt);
    }
    fn update_objective(&mut self, text: &str) {
        self.0.borrow_mut().push(Call::Objective(text.to_string()));
    }
}

/// Simulation wired to recording fakes that share one call log.
pub fn recorded(rng: impl RandomSource + 'static) -> (Simulation, CallLog) {
    let log = CallLog::default();
    let sim = Simulation::builder()
        .random_source(rng)
        .audio(RecordingAudio(Rc::clone(&log)))
        .adversary(RecordingAdversary(Rc::clone(&log)))
        .ui(RecordingUi(Rc::clone(&log)))
        .build()
        .unwrap();
    (sim, log)
}

pub fn count(log: &CallLog, predicate: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|call| predicate(call)).count()
}

/// Tick `seconds` worth of fixed steps, returning every outcome.
pub fn run_for(
    sim: &mut Simulation,
    input: &InputFrame,
    seconds: f32,
    step: f32,
) -> Vec<TickOutcome> {
    let steps = (seconds / step).round() as usize;
    (0..steps).map(|_| sim.tick(step, input)).collect()
}

/// Put a save with the given sanity into a fresh store.
pub fn store_with_sanity(sanity: f32) -> MemoryStore {
    let player = PlayerState::default();
    let state = SanityState {
        sanity,
        ..SanityState::default()
    };
    let story: StoryState = Progression::default().snapshot();
    let data = SaveData::capture(&player, &state, story, chrono_now());
    let store = MemoryStore::new();
    store
        .set(
            constants::SAVE_SLOT_KEY,
            &SaveStateCodec::encode(&data).unwrap(),
        )
        .unwrap();
    store
}

fn chrono_now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

pub fn approx(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
