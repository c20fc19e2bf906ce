use minihack_core::observation::INTERNAL_STAIRS_DOWN;
use minihack_core::{
    ActionCode, CompassDirection, EngineError, EngineStep, GameEngine, GameView, Observation, YES,
};
use tracing::trace;

use crate::level::{Feature, Level, Rule, Scenario, AGENT_DESCRIPTION, FLOOR_DESCRIPTION, STAIRS_DOWN_DESCRIPTION};

pub const WELCOME_MESSAGE: &str = "Hello Agent, welcome to NetHack!  You are a neutral male human Caveman.";
pub const NEVER_MIND: &str = "Never mind.";

/// Mutable per-episode state.
#[derive(Clone, Debug)]
struct GameState {
    level: usize,
    features: Vec<Feature>,
    agent: (i64, i64),
    time: i64,
    inventory: Vec<String>,
    pending: Option<usize>,
    game_over: bool,
}

/// Deterministic engine driven by a `Scenario`: compass keys move the agent,
/// every other keystroke is answered by the first matching rule.
#[derive(Clone, Debug)]
pub struct ScriptedNetHack {
    scenario: Scenario,
    actions: Vec<ActionCode>,
    state: GameState,
    history: Vec<ActionCode>,
    last: Observation,
}

impl ScriptedNetHack {
    pub fn new(scenario: Scenario, actions: Vec<ActionCode>) -> Result<Self, EngineError> {
        scenario.validate()?;
        if actions.is_empty() {
            return Err(EngineError::Validation("action space is empty".into()));
        }
        let state = Self::fresh_state(&scenario.levels[0], 0);
        let mut engine = Self { scenario, actions, state, history: Vec::new(), last: Observation::blank() };
        engine.last = engine.render(WELCOME_MESSAGE)?;
        Ok(engine)
    }

    fn fresh_state(level: &Level, index: usize) -> GameState {
        GameState {
            level: index,
            features: level.features.clone(),
            agent: level.start,
            time: 1,
            inventory: Vec::new(),
            pending: None,
            game_over: false,
        }
    }

    pub fn scenario(&self) -> &Scenario { &self.scenario }
    pub fn actions(&self) -> &[ActionCode] { &self.actions }
    pub fn agent_position(&self) -> (i64, i64) { self.state.agent }
    pub fn inventory(&self) -> &[String] { &self.state.inventory }
    pub fn level_index(&self) -> usize { self.state.level }

    /// Keystrokes received since the last reset.
    pub fn history(&self) -> &[ActionCode] { &self.history }

    /// Index of `code` in the action space, if present.
    pub fn action_index(&self, code: impl Into<ActionCode>) -> Option<usize> {
        let code = code.into();
        self.actions.iter().position(|&a| a == code)
    }

    fn level(&self) -> &Level {
        &self.scenario.levels[self.state.level]
    }

    fn feature_at(&self, pos: (i64, i64)) -> Option<&Feature> {
        self.state.features.iter().rev().find(|f| f.pos == pos)
    }

    fn matching_rule(&self, code: ActionCode) -> Option<usize> {
        let here = self.feature_at(self.state.agent);
        self.scenario.rules.iter().position(|rule| {
            rule.action == code
                && rule
                    .on
                    .as_deref()
                    .map_or(true, |on| here.map_or(false, |f| f.description.contains(on)))
                && rule
                    .requires_item
                    .as_deref()
                    .map_or(true, |item| self.state.inventory.iter().any(|i| i.contains(item)))
        })
    }

    /// Carry out rule `index`; returns the message and whether time passed.
    fn apply_rule(&mut self, index: usize) -> (String, bool) {
        let rule: &Rule = &self.scenario.rules[index];
        let (message, takes_time, ends_game) = (rule.message.clone(), rule.takes_time, rule.ends_game);
        if rule.consume {
            let agent = self.state.agent;
            let on = rule.on.clone();
            if let Some(i) = self.state.features.iter().rposition(|f| {
                f.pos == agent && on.as_deref().map_or(true, |o| f.description.contains(o))
            }) {
                self.state.features.remove(i);
            }
        }
        if let Some(item) = rule.gain_item.clone() {
            self.state.inventory.push(item);
        }
        if ends_game {
            self.state.game_over = true;
        }
        (message, takes_time)
    }

    fn try_move(&mut self, dir: CompassDirection) -> (String, bool) {
        let (dx, dy) = dir.delta();
        let target = (self.state.agent.0 + dx, self.state.agent.1 + dy);
        if !self.level().in_bounds(target) || self.feature_at(target).map_or(false, |f| f.blocks) {
            return (String::new(), false);
        }
        self.state.agent = target;
        let (message, deadly) = match self.feature_at(target) {
            Some(f) => (f.on_enter.clone().unwrap_or_default(), f.deadly),
            None => (String::new(), false),
        };
        if deadly {
            self.state.game_over = true;
        }
        (message, true)
    }

    fn render(&self, message: &str) -> Result<Observation, EngineError> {
        let level = self.level();
        let mut obs = Observation::with_screen(level.height, level.width);
        for y in 0..level.height {
            for x in 0..level.width {
                obs.screen_descriptions.set(x, y, FLOOR_DESCRIPTION)?;
            }
        }
        if let Some((x, y)) = level.stairs_down {
            obs.screen_descriptions.set(x as usize, y as usize, STAIRS_DOWN_DESCRIPTION)?;
        }
        for f in &self.state.features {
            obs.screen_descriptions.set(f.pos.0 as usize, f.pos.1 as usize, &f.description)?;
        }
        let (ax, ay) = self.state.agent;
        obs.screen_descriptions.set(ax as usize, ay as usize, AGENT_DESCRIPTION)?;
        obs.set_position(ax, ay);
        obs.set_time(self.state.time);
        obs.set_message(message);
        if level.stairs_down == Some(self.state.agent) {
            obs.internal[INTERNAL_STAIRS_DOWN] = 1;
        }
        for (i, item) in self.state.inventory.iter().enumerate() {
            obs.push_inventory((b'a' + (i % 26) as u8) as char, item);
        }
        Ok(obs)
    }
}

impl GameView for ScriptedNetHack {
    fn screen_contains(&self, name: &str) -> bool {
        self.last.screen_descriptions.contains(name)
    }

    fn action_code(&self, index: usize) -> Option<ActionCode> {
        self.actions.get(index).copied()
    }
}

impl GameEngine for ScriptedNetHack {
    /// `seed` picks the level variant; without one the first level is used.
    fn reset(&mut self, seed: Option<u64>) -> Result<Observation, EngineError> {
        let index = seed.map_or(0, |s| (s % self.scenario.levels.len() as u64) as usize);
        self.state = Self::fresh_state(&self.scenario.levels[index], index);
        self.history.clear();
        self.last = self.render(WELCOME_MESSAGE)?;
        Ok(self.last.clone())
    }

    fn step(&mut self, action: usize) -> Result<EngineStep, EngineError> {
        if self.state.game_over {
            return Err(EngineError::Validation("game is over; reset the engine".into()));
        }
        let code = self.action_code(action).ok_or_else(|| {
            EngineError::Validation(format!("action index {action} outside action space of {}", self.actions.len()))
        })?;
        self.history.push(code);

        let (message, time_passes) = if let Some(pending) = self.state.pending.take() {
            if code == YES { self.apply_rule(pending) } else { (NEVER_MIND.to_string(), false) }
        } else if let Some(index) = self.matching_rule(code) {
            match self.scenario.rules[index].prompt.clone() {
                Some(prompt) => {
                    self.state.pending = Some(index);
                    (prompt, false)
                }
                None => self.apply_rule(index),
            }
        } else if let Some(dir) = CompassDirection::from_code(code) {
            self.try_move(dir)
        } else {
            (String::new(), false)
        };

        if time_passes {
            self.state.time += 1;
        }
        self.last = self.render(&message)?;
        trace!(action, code = code.as_u8(), time = self.state.time, message = %message, "scripted step");
        Ok(EngineStep { observation: self.last.clone(), game_over: self.state.game_over })
    }

    fn last_observation(&self) -> &Observation {
        &self.last
    }

    fn num_actions(&self) -> usize {
        self.actions.len()
    }
}
