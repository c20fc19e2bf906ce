//! Pure-logic scripted dungeon engine.
//! - Levels as small grids of described tiles
//! - Keystroke rules with yes/no prompts
//! - Built-in scenarios embedded as JSON

mod game;
mod level;
mod preset;

pub use game::{ScriptedNetHack, NEVER_MIND, WELCOME_MESSAGE};
pub use level::{Feature, Level, Rule, RuleRow, Scenario, AGENT_DESCRIPTION, FLOOR_DESCRIPTION, STAIRS_DOWN_DESCRIPTION};
pub use preset::{preset_names, preset_scenario};
