//! Core traits and types for MiniHack-style task environments.
//! The engine contract (GameView, GameEngine) is what the reward core consumes;
//! Environment is what an agent drives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

pub mod actions;
pub mod observation;

pub use actions::{move_actions, skill_actions, ActionCode, Command, CompassDirection, MiscDirection, YES};
pub use observation::{decode_nul_padded, encode_nul_padded, Observation, ScreenDescriptions};

/// Errors surfaced by engines, reward managers and environments.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("action {0} is not in the action space")]
    UnknownAction(String),
    #[error("message buffer is not valid utf-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
}

/// Read-only queries against the engine's current state.
pub trait GameView {
    /// True if `name` appears in any tile description of the current screen.
    fn screen_contains(&self, name: &str) -> bool;

    /// Code behind action index `index`, if the index is in the action space.
    fn action_code(&self, index: usize) -> Option<ActionCode>;

    /// Whether the agent stands on the named object. The agent's glyph hides the
    /// object underneath it, so the description vanishes from the screen.
    fn standing_on(&self, name: &str) -> bool {
        !self.screen_contains(name)
    }
}

/// One engine transition.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineStep {
    pub observation: Observation,
    /// The game itself ended (the character died or quit).
    pub game_over: bool,
}

/// A steppable game engine.
pub trait GameEngine: GameView + Send + Sync {
    fn reset(&mut self, seed: Option<u64>) -> Result<Observation, EngineError>;
    fn step(&mut self, action: usize) -> Result<EngineStep, EngineError>;
    fn last_observation(&self) -> &Observation;
    fn num_actions(&self) -> usize;
}

/// How a step ended, from the task's point of view.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Running,
    TaskSuccessful,
    Death,
    Aborted,
}

impl StepStatus {
    pub fn is_done(self) -> bool { !matches!(self, StepStatus::Running) }
}

/// Result of one agent step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub status: StepStatus,
}

/// Snapshot contract for checkpoint/inspection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub engine: String,
    pub data: Json,
}

/// Agent-facing environment.
#[async_trait]
pub trait Environment: Send + Sync {
    async fn reset(&mut self) -> Result<Observation, EngineError>;
    async fn step(&mut self, action: usize) -> Result<Transition, EngineError>;
    async fn checkpoint(&self) -> Result<Snapshot, EngineError>;
}

// -----------------------
// Tests
// -----------------------
