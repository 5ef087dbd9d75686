pub mod game_tester;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod tester;

pub use game_tester::GameTester;
pub use scenarios::{find_scenario, list_scenarios};
pub use seeds::resolve_seed_inputs;
pub use tester::*;
