use minihack_core::{ActionCode, Command, EngineError};
use serde::{Deserialize, Serialize};

/// Description the agent's own tile shows. It hides whatever lies underneath.
pub const AGENT_DESCRIPTION: &str = "human caveman called Agent";
pub const FLOOR_DESCRIPTION: &str = "floor of a room";
pub const STAIRS_DOWN_DESCRIPTION: &str = "staircase down";

/// Something placed on a tile: an item, a dungeon feature, a monster or a wall.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub pos: (i64, i64),
    pub description: String,
    #[serde(default)]
    pub blocks: bool,
    /// Message printed when the agent steps onto the tile.
    #[serde(default)]
    pub on_enter: Option<String>,
    /// Stepping onto the tile ends the game.
    #[serde(default)]
    pub deadly: bool,
}

impl Feature {
    pub fn new(pos: (i64, i64), description: impl Into<String>) -> Self {
        Self { pos, description: description.into(), blocks: false, on_enter: None, deadly: false }
    }

    pub fn wall(pos: (i64, i64)) -> Self {
        Self { pos, description: "wall".into(), blocks: true, on_enter: None, deadly: false }
    }

    pub fn deadly(mut self) -> Self {
        self.deadly = true;
        self
    }

    pub fn with_on_enter(mut self, message: impl Into<String>) -> Self {
        self.on_enter = Some(message.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub start: (i64, i64),
    #[serde(default)]
    pub stairs_down: Option<(i64, i64)>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Level {
    /// Open room of `width x height` floor tiles with the agent at `start`.
    pub fn room(name: impl Into<String>, width: usize, height: usize, start: (i64, i64)) -> Self {
        Self { name: name.into(), width, height, start, stairs_down: None, features: Vec::new() }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn with_stairs_down(mut self, pos: (i64, i64)) -> Self {
        self.stairs_down = Some(pos);
        self
    }

    pub fn in_bounds(&self, (x, y): (i64, i64)) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::Validation(format!("level {} has an empty map", self.name)));
        }
        let outside = std::iter::once(self.start)
            .chain(self.stairs_down)
            .chain(self.features.iter().map(|f| f.pos))
            .find(|&p| !self.in_bounds(p));
        if let Some((x, y)) = outside {
            return Err(EngineError::Validation(format!(
                "level {}: tile ({x}, {y}) outside {}x{} map",
                self.name, self.width, self.height
            )));
        }
        if self.features.iter().any(|f| f.blocks && f.pos == self.start) {
            return Err(EngineError::Validation(format!("level {}: agent starts inside a wall", self.name)));
        }
        Ok(())
    }
}

/// Scripted response to one keystroke.
///
/// A rule matches when its action is pressed, the agent stands on a tile whose
/// description contains `on` (if set) and the inventory holds an item containing
/// `requires_item` (if set). With a `prompt`, the game first asks and the effect
/// only happens once the question is answered with yes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub action: ActionCode,
    pub on: Option<String>,
    pub requires_item: Option<String>,
    pub prompt: Option<String>,
    pub message: String,
    pub consume: bool,
    pub gain_item: Option<String>,
    pub ends_game: bool,
    pub takes_time: bool,
}

impl Rule {
    pub fn new(action: impl Into<ActionCode>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            on: None,
            requires_item: None,
            prompt: None,
            message: message.into(),
            consume: false,
            gain_item: None,
            ends_game: false,
            takes_time: true,
        }
    }

    pub fn on(mut self, description: impl Into<String>) -> Self { self.on = Some(description.into()); self }
    pub fn requiring(mut self, item: impl Into<String>) -> Self { self.requires_item = Some(item.into()); self }
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self { self.prompt = Some(prompt.into()); self }
    pub fn consuming(mut self) -> Self { self.consume = true; self }
    pub fn gaining(mut self, item: impl Into<String>) -> Self { self.gain_item = Some(item.into()); self }
    pub fn ending_game(mut self) -> Self { self.ends_game = true; self }
    pub fn free_action(mut self) -> Self { self.takes_time = false; self }
}

/// Serialized form of a rule; the action is a command name such as "eat" or "pray".
#[derive(Clone, Debug, Deserialize)]
pub struct RuleRow {
    pub action: String,
    #[serde(default)]
    pub on: Option<String>,
    #[serde(default)]
    pub requires_item: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    pub message: String,
    #[serde(default)]
    pub consume: bool,
    #[serde(default)]
    pub gain_item: Option<String>,
    #[serde(default)]
    pub ends_game: bool,
    #[serde(default = "default_takes_time")]
    pub takes_time: bool,
}

fn default_takes_time() -> bool { true }

impl TryFrom<RuleRow> for Rule {
    type Error = EngineError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        let action = Command::from_name(&row.action)?;
        Ok(Rule {
            action: action.code(),
            on: row.on,
            requires_item: row.requires_item,
            prompt: row.prompt,
            message: row.message,
            consume: row.consume,
            gain_item: row.gain_item,
            ends_game: row.ends_game,
            takes_time: row.takes_time,
        })
    }
}

/// Level variants plus the rules that apply on all of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub levels: Vec<Level>,
    pub rules: Vec<Rule>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, level: Level) -> Self {
        Self { name: name.into(), levels: vec![level], rules: Vec::new() }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.levels.push(level);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.levels.is_empty() {
            return Err(EngineError::Validation(format!("scenario {} has no levels", self.name)));
        }
        self.levels.iter().try_for_each(Level::validate)
    }
}
