use minihack_core::{ActionCode, EngineError, GameView, Observation, YES};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Message,
    LocAction,
    Coord,
    Loc,
}

/// Reward and termination settings shared by every event.
/// Defaults: reward 1, not repeatable, required, not sufficient.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    pub reward: f64,
    pub repeatable: bool,
    pub terminal_required: bool,
    pub terminal_sufficient: bool,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self { reward: 1.0, repeatable: false, terminal_required: true, terminal_sufficient: false }
    }
}

impl EventSettings {
    pub fn with_reward(mut self, reward: f64) -> Self { self.reward = reward; self }
    pub fn with_repeatable(mut self, repeatable: bool) -> Self { self.repeatable = repeatable; self }
    pub fn with_terminal_required(mut self, required: bool) -> Self { self.terminal_required = required; self }
    pub fn with_terminal_sufficient(mut self, sufficient: bool) -> Self { self.terminal_sufficient = sufficient; self }
}

/// Progress of a location+action event. Armed means the triggering action was
/// taken on the location and the game is waiting for a yes/no answer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LocActionPhase {
    #[default]
    Idle,
    Armed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventTrigger {
    /// Any of `messages` is a substring of the turn's message.
    Message { messages: Vec<String> },
    /// The agent stands on `loc`.
    Loc { loc: String },
    /// `action` taken while standing on `loc`, then confirmed with yes.
    LocAction { loc: String, action: ActionCode, phase: LocActionPhase },
    /// The agent is at exactly these coordinates.
    Coord { coordinates: (i64, i64) },
}

/// One detectable occurrence in an episode.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub reward: f64,
    pub repeatable: bool,
    pub terminal_required: bool,
    pub terminal_sufficient: bool,
    achieved: bool,
    trigger: EventTrigger,
}

impl Event {
    pub fn new(trigger: EventTrigger, settings: EventSettings) -> Self {
        Self {
            reward: settings.reward,
            repeatable: settings.repeatable,
            terminal_required: settings.terminal_required,
            terminal_sufficient: settings.terminal_sufficient,
            achieved: false,
            trigger,
        }
    }

    pub fn message<S: Into<String>>(messages: impl IntoIterator<Item = S>, settings: EventSettings) -> Self {
        let messages = messages.into_iter().map(Into::into).collect();
        Self::new(EventTrigger::Message { messages }, settings)
    }

    pub fn location(loc: impl Into<String>, settings: EventSettings) -> Self {
        Self::new(EventTrigger::Loc { loc: loc.into() }, settings)
    }

    pub fn loc_action(loc: impl Into<String>, action: impl Into<ActionCode>, settings: EventSettings) -> Self {
        let trigger = EventTrigger::LocAction { loc: loc.into(), action: action.into(), phase: LocActionPhase::Idle };
        Self::new(trigger, settings)
    }

    pub fn coordinates(coordinates: (i64, i64), settings: EventSettings) -> Self {
        Self::new(EventTrigger::Coord { coordinates }, settings)
    }

    pub fn kind(&self) -> EventKind {
        match self.trigger {
            EventTrigger::Message { .. } => EventKind::Message,
            EventTrigger::Loc { .. } => EventKind::Loc,
            EventTrigger::LocAction { .. } => EventKind::LocAction,
            EventTrigger::Coord { .. } => EventKind::Coord,
        }
    }

    pub fn trigger(&self) -> &EventTrigger { &self.trigger }
    pub fn achieved(&self) -> bool { self.achieved }

    /// Phase of a location+action event; `None` for every other kind.
    pub fn phase(&self) -> Option<LocActionPhase> {
        match self.trigger {
            EventTrigger::LocAction { phase, .. } => Some(phase),
            _ => None,
        }
    }

    /// True while a location+action event is armed.
    pub fn status(&self) -> bool {
        self.phase() == Some(LocActionPhase::Armed)
    }

    /// Inspect the step `previous --action--> observation` and return this
    /// event's reward if it fired, `0.0` otherwise.
    pub fn check(
        &mut self,
        env: &dyn GameView,
        _previous: &Observation,
        action: usize,
        observation: &Observation,
    ) -> Result<f64, EngineError> {
        if self.achieved {
            return Ok(0.0);
        }
        let fired = match &mut self.trigger {
            EventTrigger::Message { messages } => {
                let current = observation.message_text()?;
                messages.iter().any(|m| current.contains(m.as_str()))
            }
            EventTrigger::Loc { loc } => env.standing_on(loc),
            EventTrigger::LocAction { loc, action: wanted, phase } => {
                let taken = env.action_code(action);
                if taken == Some(*wanted) && env.standing_on(loc) {
                    *phase = LocActionPhase::Armed;
                    false
                } else if taken == Some(YES) && *phase == LocActionPhase::Armed {
                    *phase = LocActionPhase::Idle;
                    true
                } else {
                    *phase = LocActionPhase::Idle;
                    false
                }
            }
            EventTrigger::Coord { coordinates } => observation.position() == Some(*coordinates),
        };
        Ok(if fired { self.set_achieved() } else { 0.0 })
    }

    fn set_achieved(&mut self) -> f64 {
        if !self.repeatable {
            self.achieved = true;
        }
        debug!(kind = ?self.kind(), reward = self.reward, repeatable = self.repeatable, "event fired");
        self.reward
    }

    pub fn reset(&mut self) {
        self.achieved = false;
        if let EventTrigger::LocAction { phase, .. } = &mut self.trigger {
            *phase = LocActionPhase::Idle;
        }
    }
}
