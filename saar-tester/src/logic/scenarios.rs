//! Scenario catalog for the headless tester.
//!
//! Each scenario builds a seeded simulation, drives it, and checks its own
//! expectations against the tuning in effect.

use saar_game::{AudioCue, InputFrame, InventoryItem, MemoryStore, StoryError};

use super::game_tester::{GameTester, InputPlan, RunStats, RunSummary, Segment};

pub type ScenarioFn = fn(&GameTester, u64) -> Result<RunSummary, String>;

#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

const SCENARIOS: &[TestScenario] = &[
    TestScenario {
        name: "smoke",
        description: "Random wander for a minute; meters stay in range",
        run: smoke,
    },
    TestScenario {
        name: "sprint-drain",
        description: "Two seconds of sprinting drains stamina at the tuned rate",
        run: sprint_drain,
    },
    TestScenario {
        name: "flashlight-drain",
        description: "Ten seconds of light drains the battery at the tuned rate",
        run: flashlight_drain,
    },
    TestScenario {
        name: "darkness-drain",
        description: "Four seconds in darkness drains sanity at the tuned rate",
        run: darkness_drain,
    },
    TestScenario {
        name: "jump-scare",
        description: "Jump scare costs sanity and fires the delayed screech",
        run: jump_scare,
    },
    TestScenario {
        name: "story-complete",
        description: "Collect all documents and walk every chapter",
        run: story_complete,
    },
    TestScenario {
        name: "save-roundtrip",
        description: "Save, start over, load and compare",
        run: save_roundtrip,
    },
    TestScenario {
        name: "sanity-collapse",
        description: "Darkness until sanity runs out; the end is terminal",
        run: sanity_collapse,
    },
];

#[must_use]
pub fn all_scenarios() -> &'static [TestScenario] {
    SCENARIOS
}

#[must_use]
pub fn find_scenario(name: &str) -> Option<&'static TestScenario> {
    all_scenarios().iter().find(|scenario| scenario.name == name)
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    all_scenarios()
        .iter()
        .map(|scenario| (scenario.name, scenario.description))
        .collect()
}

fn expect_close(label: &str, actual: f32, expected: f32, tolerance: f32) -> Result<(), String> {
    if (actual - expected).abs() <= tolerance {
        Ok(())
    } else {
        Err(format!("{label}: expected {expected:.2}, got {actual:.2}"))
    }
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), String> {
    if condition { Ok(()) } else { Err(message()) }
}

fn smoke(tester: &GameTester, seed: u64) -> Result<RunSummary, String> {
    let mut sim = tester.simulation(seed).map_err(|err| err.to_string())?;
    let stats = tester.drive(&mut sim, &InputPlan::Wander { seconds: 60.0 }, seed);
    ensure(stats.meter_violations.is_empty(), || {
        stats.meter_violations.join("; ")
    })?;
    ensure(!sim.status().is_ended(), || {
        format!("run ended unexpectedly: {}", sim.status())
    })?;
    Ok(RunSummary::capture(&sim, seed, stats))
}

fn sprint_drain(tester: &GameTester, seed: u64) -> Result<RunSummary, String> {
    let mut sim = tester.simulation(seed).map_err(|err| err.to_string())?;
    let plan = InputPlan::Scripted(vec![Segment::new(InputFrame::sprinting(), 2.0)]);
    let stats = tester.drive(&mut sim, &plan, seed);
    let expected = (100.0 - tester.tuning().stamina.drain_per_sec * 2.0).max(0.0);
    expect_close("stamina", sim.player().stamina, expected, 0.01)?;
    ensure(stats.noise_events == stats.ticks || expected <= 0.0, || {
        format!("{} noise events over {} ticks", stats.noise_events, stats.ticks)
    })?;
    Ok(RunSummary::capture(&sim, seed, stats))
}

fn flashlight_drain(tester: &GameTester, seed: u64) -> Result<RunSummary, String> {
    let mut sim = tester.simulation(seed).map_err(|err| err.to_string())?;
    sim.toggle_flashlight().map_err(|err| err.to_string())?;
    let plan = InputPlan::Scripted(vec![Segment::new(InputFrame::idle(), 10.0)]);
    let stats = tester.drive(&mut sim, &plan, seed);
    let expected = (100.0 - tester.tuning().battery.drain_per_sec * 10.0).max(0.0);
    expect_close("battery", sim.player().battery, expected, 0.05)?;
    ensure(sim.player().flashlight_on == (expected > 0.0), || {
        "flashlight state does not match battery".to_string()
    })?;
    Ok(RunSummary::capture(&sim, seed, stats))
}

fn darkness_drain(tester: &GameTester, seed: u64) -> Result<RunSummary, String> {
    let mut sim = tester.simulation(seed).map_err(|err| err.to_string())?;
    sim.set_in_darkness(true);
    let plan = InputPlan::Scripted(vec![Segment::new(InputFrame::idle(), 4.0)]);
    let stats = tester.drive(&mut sim, &plan, seed);
    let expected = (100.0 - tester.tuning().sanity.drain_per_sec * 4.0).max(0.0);
    expect_close("sanity", sim.sanity().sanity, expected, 0.01)?;
    Ok(RunSummary::capture(&sim, seed, stats))
}

fn jump_scare(tester: &GameTester, seed: u64) -> Result<RunSummary, String> {
    let mut sim = tester.simulation(seed).map_err(|err| err.to_string())?;
    let outcome = sim
        .on_jump_scare()
        .ok_or_else(|| "jump scare ignored".to_string())?;
    let expected = (100.0 - tester.tuning().sanity.jump_scare_loss).max(0.0);
    expect_close("sanity", outcome.sanity, expected, 0.001)?;

    let mut stats = RunStats::default();
    for cue in &outcome.cues {
        stats.record_cue(*cue);
    }
    let wait = tester.tuning().cues.screech_delay_secs as f32 + 0.1;
    let plan = InputPlan::Scripted(vec![Segment::new(InputFrame::idle(), wait)]);
    let tail = tester.drive(&mut sim, &plan, seed);
    for (cue, count) in tail.cues {
        *stats.cues.entry(cue).or_default() += count;
    }
    stats.ticks = tail.ticks;

    ensure(stats.cue_count(AudioCue::JumpScare) == 1, || {
        "jump scare cue missing".to_string()
    })?;
    ensure(stats.cue_count(AudioCue::Screech) == 1, || {
        format!("expected one screech, got {}", stats.cue_count(AudioCue::Screech))
    })?;
    Ok(RunSummary::capture(&sim, seed, stats))
}

fn story_complete(tester: &GameTester, seed: u64) -> Result<RunSummary, String> {
    let mut sim = tester.simulation(seed).map_err(|err| err.to_string())?;
    match sim.advance_chapter() {
        Err(StoryError::ChapterLocked(1)) => {}
        other => return Err(format!("advance before any document: {other:?}")),
    }

    let document_count = u8::try_from(sim.story().document_count()).unwrap_or(u8::MAX);
    for id in 1..=document_count {
        sim.pick_up(InventoryItem::document(id, format!("Document {id}")))
            .map_err(|err| err.to_string())?;
        if sim.story().is_complete() {
            break;
        }
        sim.advance_chapter().map_err(|err| err.to_string())?;
    }
    ensure(sim.story().is_complete(), || {
        format!(
            "story incomplete at chapter {} ({}%)",
            sim.story().current_chapter_index(),
            sim.story().completion_percentage()
        )
    })?;
    Ok(RunSummary::capture(&sim, seed, RunStats::default()))
}

fn save_roundtrip(tester: &GameTester, seed: u64) -> Result<RunSummary, String> {
    let mut sim = tester.simulation(seed).map_err(|err| err.to_string())?;
    sim.pick_up(InventoryItem::document(1, "Document 1"))
        .map_err(|err| err.to_string())?;
    sim.advance_chapter().map_err(|err| err.to_string())?;
    sim.set_in_darkness(true);
    let stats = tester.drive(&mut sim, &InputPlan::Wander { seconds: 30.0 }, seed);

    let store = MemoryStore::new();
    sim.save(&store).map_err(|err| err.to_string())?;
    let saved = RunSummary::capture(&sim, seed, RunStats::default());
    let position = sim.player().position;
    let story = sim.story().snapshot();

    sim.new_game();
    sim.load(&store).map_err(|err| err.to_string())?;

    ensure(sim.player().position == position, || {
        "position changed across load".to_string()
    })?;
    ensure(sim.story().snapshot() == story, || {
        "story changed across load".to_string()
    })?;
    expect_close("stamina", sim.player().stamina, saved.stamina, 0.0)?;
    expect_close("battery", sim.player().battery, saved.battery, 0.0)?;
    expect_close("sanity", sim.sanity().sanity, saved.sanity, 0.0)?;
    ensure(sim.player().flashlight_on == saved.flashlight_on, || {
        "flashlight changed across load".to_string()
    })?;
    Ok(RunSummary::capture(&sim, seed, stats))
}

fn sanity_collapse(tester: &GameTester, seed: u64) -> Result<RunSummary, String> {
    let mut sim = tester.simulation(seed).map_err(|err| err.to_string())?;
    sim.set_in_darkness(true);
    let mut stats = RunStats::default();
    let mut ended_ticks = 0;
    for _ in 0..10_000 {
        let outcome = sim.tick(1.0, &InputFrame::idle());
        stats.ticks += 1;
        if outcome.ended.is_some() {
            ended_ticks += 1;
        }
        if sim.status().is_ended() {
            break;
        }
    }
    ensure(sim.status().is_ended(), || {
        format!("still running with sanity {:.1}", sim.sanity().sanity)
    })?;
    ensure(ended_ticks == 1, || format!("end reported {ended_ticks} times"))?;

    sim.set_in_darkness(false);
    sim.set_in_safe_zone(true);
    let after = sim.tick(5.0, &InputFrame::walking());
    ensure(after.ended.is_none() && sim.sanity().sanity <= 0.0, || {
        "ticks after the end still mutate sanity".to_string()
    })?;
    Ok(RunSummary::capture(&sim, seed, stats))
}
