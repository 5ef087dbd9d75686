mod common;

use common::{approx, recorded, run_for};
use saar_game::constants::SAVE_SLOT_KEY;
use saar_game::{
    FixedRoll, InputFrame, InventoryItem, MemoryStore, PersistenceStore, SaveError, Simulation,
};

fn progressed() -> Simulation {
    let (mut sim, _log) = recorded(FixedRoll(0.999));
    sim.pick_up(InventoryItem::document(1, "Journal")).unwrap();
    sim.pick_up(InventoryItem::document(3, "Records")).unwrap();
    sim.advance_chapter().unwrap();
    sim.toggle_flashlight().unwrap();
    sim.set_in_darkness(true);
    run_for(&mut sim, &InputFrame::sprinting(), 1.5, 0.1);
    sim.on_see_enemy();
    sim
}

type Snapshot = ([f32; 3], f32, f32, bool, f32, u8, Vec<u8>, Vec<bool>);

fn snapshot(sim: &Simulation) -> Snapshot {
    let story = sim.story().snapshot();
    (
        sim.player().position.to_array(),
        sim.player().stamina,
        sim.player().battery,
        sim.player().flashlight_on,
        sim.sanity().sanity,
        story.current_chapter_index,
        story.documents_found_ids,
        story.chapter_unlocked,
    )
}

#[test]
fn save_then_load_reproduces_state() {
    let sim = progressed();
    let store = MemoryStore::new();
    assert!(!Simulation::has_save(&store).unwrap());
    sim.save(&store).unwrap();
    assert!(Simulation::has_save(&store).unwrap());

    let (mut fresh, _log) = recorded(FixedRoll(0.999));
    fresh.load(&store).unwrap();
    assert_eq!(snapshot(&fresh), snapshot(&sim));
}

#[test]
fn load_after_new_game_restores_saved_progress() {
    let mut sim = progressed();
    let store = MemoryStore::new();
    sim.save(&store).unwrap();
    let saved = snapshot(&sim);

    sim.new_game();
    assert_ne!(snapshot(&sim), saved);
    sim.load(&store).unwrap();
    assert_eq!(snapshot(&sim), saved);
    assert_eq!(sim.pending_cues(), 0);
}

#[test]
fn missing_save_leaves_state_untouched() {
    let mut sim = progressed();
    let before = snapshot(&sim);
    assert!(matches!(
        sim.load(&MemoryStore::new()),
        Err(SaveError::Missing)
    ));
    assert_eq!(snapshot(&sim), before);
}

#[test]
fn corrupt_save_leaves_state_untouched() {
    let mut sim = progressed();
    let before = snapshot(&sim);
    let store = MemoryStore::new();

    for blob in [
        "",
        "{",
        r#"{"version":1,"checksum":"00","payload":"{}"}"#,
        r#"{"stamina": 10}"#,
    ] {
        store.set(SAVE_SLOT_KEY, blob).unwrap();
        assert!(sim.load(&store).is_err(), "accepted {blob:?}");
        assert_eq!(snapshot(&sim), before);
    }
}

#[test]
fn tampered_save_is_rejected() {
    let sim = progressed();
    let store = MemoryStore::new();
    sim.save(&store).unwrap();
    let blob = store.get(SAVE_SLOT_KEY).unwrap().unwrap();
    let tampered = blob.replacen("currentChapterIndex\\\":1", "currentChapterIndex\\\":7", 1);
    assert_ne!(tampered, blob);
    store.set(SAVE_SLOT_KEY, &tampered).unwrap();

    let (mut fresh, _log) = recorded(FixedRoll(0.999));
    assert!(matches!(
        fresh.load(&store),
        Err(SaveError::ChecksumMismatch)
    ));
    assert_eq!(fresh.story().current_chapter_index(), 0);
}

#[test]
fn zone_flags_survive_load() {
    let sim = progressed();
    let store = MemoryStore::new();
    sim.save(&store).unwrap();

    let (mut fresh, _log) = recorded(FixedRoll(0.999));
    fresh.set_in_safe_zone(true);
    fresh.load(&store).unwrap();
    assert!(fresh.sanity().in_safe_zone);
    assert!(!fresh.sanity().in_darkness);
    approx(fresh.sanity().sanity, sim.sanity().sanity, f32::EPSILON);
}

struct BrokenStore;

#[derive(Debug)]
struct Offline;

impl std::fmt::Display for Offline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("storage offline")
    }
}

impl std::error::Error for Offline {}

impl PersistenceStore for BrokenStore {
    type Error = Offline;

    fn get(&self, _key: &str) -> Result<Option<String>, Self::Error> {
        Err(Offline)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), Self::Error> {
        Err(Offline)
    }
}

#[test]
fn store_failures_surface_as_errors() {
    let mut sim = progressed();
    let before = snapshot(&sim);
    assert!(matches!(
        sim.save(&BrokenStore),
        Err(SaveError::Store(msg)) if msg == "storage offline"
    ));
    assert!(matches!(sim.load(&BrokenStore), Err(SaveError::Store(_))));
    assert_eq!(snapshot(&sim), before);
}

#[test]
fn document_picked_up_after_save_can_be_found_again_after_load() {
    let (mut sim, _log) = recorded(FixedRoll(0.999));
    let store = MemoryStore::new();
    sim.save(&store).unwrap();

    sim.pick_up(InventoryItem::document(1, "Journal")).unwrap();
    sim.pick_up(InventoryItem::generic("key", "Cellar key")).unwrap();
    sim.load(&store).unwrap();

    assert!(!sim.story().is_found(1));
    assert_eq!(sim.inventory().document_count(), 0);
    assert!(sim.inventory().has_item("key"));

    let pickup = sim.pick_up(InventoryItem::document(1, "Journal")).unwrap();
    assert_eq!(pickup.document, Some(1));
    assert_eq!(pickup.unlocked_chapter, Some(1));
    assert!(sim.story().is_found(1));
    assert_eq!(sim.story().is_unlocked(1), Ok(true));
}

#[test]
fn load_keeps_documents_the_save_already_knows() {
    let sim = progressed();
    let store = MemoryStore::new();
    sim.save(&store).unwrap();

    let mut sim = sim;
    sim.load(&store).unwrap();
    assert_eq!(sim.inventory().document_count(), 2);
    assert!(sim.inventory().has_item("document-1"));
    assert!(sim.inventory().has_item("document-3"));
}
