//! Serde description of reward managers, so tasks can be configured from JSON.
//!
//! ```json
//! { "type": "standard",
//!   "events": [ { "kind": "eat", "name": "apple" },
//!               { "kind": "positional", "place": "altar", "action": "pray", "reward": 2.0 } ] }
//! ```

use minihack_core::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::builder::EventBuilder;
use crate::event::EventSettings;
use crate::grouped::GroupedRewardManager;
use crate::manager::{EpisodeManager, RewardManager};
use crate::sequential::SequentialRewardManager;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventSpec {
    Eat { name: String, #[serde(flatten)] settings: EventSettings },
    Wield { name: String, #[serde(flatten)] settings: EventSettings },
    Wear { name: String, #[serde(flatten)] settings: EventSettings },
    Amulet { #[serde(flatten)] settings: EventSettings },
    Kill { name: String, #[serde(flatten)] settings: EventSettings },
    Message { messages: Vec<String>, #[serde(flatten)] settings: EventSettings },
    Positional { place: String, action: String, #[serde(flatten)] settings: EventSettings },
    Coordinate { coordinates: (i64, i64), #[serde(flatten)] settings: EventSettings },
    Location { location: String, #[serde(flatten)] settings: EventSettings },
}

impl EventSpec {
    /// Register this event on `target`.
    pub fn add_to<B: EventBuilder>(&self, target: &mut B) -> Result<(), EngineError> {
        match self {
            EventSpec::Eat { name, settings } => target.add_eat_event(name, *settings),
            EventSpec::Wield { name, settings } => target.add_wield_event(name, *settings),
            EventSpec::Wear { name, settings } => target.add_wear_event(name, *settings),
            EventSpec::Amulet { settings } => target.add_amulet_event(*settings),
            EventSpec::Kill { name, settings } => target.add_kill_event(name, *settings),
            EventSpec::Message { messages, settings } => target.add_message_event(messages.iter().cloned(), *settings),
            EventSpec::Positional { place, action, settings } => target.add_positional_event(place, action, *settings)?,
            EventSpec::Coordinate { coordinates, settings } => target.add_coordinate_event(*coordinates, *settings),
            EventSpec::Location { location, settings } => target.add_location_event(location, *settings),
        }
        Ok(())
    }
}

fn default_true() -> bool { true }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberSpec {
    pub manager: ManagerSpec,
    #[serde(default = "default_true")]
    pub terminal_required: bool,
    #[serde(default)]
    pub terminal_sufficient: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ManagerSpec {
    Standard {
        #[serde(default)]
        events: Vec<EventSpec>,
    },
    Sequential {
        #[serde(default)]
        events: Vec<EventSpec>,
    },
    Grouped {
        #[serde(default)]
        members: Vec<MemberSpec>,
    },
}

impl ManagerSpec {
    pub fn from_json(value: Json) -> Result<Self, EngineError> {
        serde_json::from_value(value).map_err(|e| EngineError::Validation(format!("bad reward spec: {e}")))
    }

    pub fn build(&self) -> Result<Box<dyn EpisodeManager>, EngineError> {
        Ok(match self {
            ManagerSpec::Standard { events } => {
                let mut manager = RewardManager::new();
                for event in events {
                    event.add_to(&mut manager)?;
                }
                Box::new(manager)
            }
            ManagerSpec::Sequential { events } => {
                let mut manager = SequentialRewardManager::new();
                for event in events {
                    event.add_to(&mut manager)?;
                }
                Box::new(manager)
            }
            ManagerSpec::Grouped { members } => {
                let mut group = GroupedRewardManager::new();
                for member in members {
                    group.add_boxed_reward_manager(member.manager.build()?, member.terminal_required, member.terminal_sufficient);
                }
                Box::new(group)
            }
        })
    }
}
