//! Shorthand for registering the common event shapes.

use minihack_core::{Command, EngineError};

use crate::event::{Event, EventSettings};

/// Messages the game prints when `name` is eaten.
pub fn eat_messages(name: &str) -> Vec<String> {
    let mut msgs = vec![
        format!("This {name} is delicious"),
        "Blecch!  Rotten food!".to_string(),
        "last bite of your meal".to_string(),
    ];
    match name {
        "apple" => {
            msgs.push("Delicious!  Must be a Macintosh!".to_string());
            msgs.push("Core dumped.".to_string());
        }
        "pear" => msgs.push("Core dumped.".to_string()),
        _ => {}
    }
    msgs
}

pub fn wield_messages(name: &str) -> Vec<String> {
    vec![format!("{name} wields itself to your hand!"), format!("{name} (weapon in hand)")]
}

pub fn wear_messages(name: &str) -> Vec<String> {
    vec![format!("You are now wearing a {name}")]
}

pub fn amulet_messages() -> Vec<String> {
    vec!["amulet (being worn).".to_string()]
}

pub fn kill_messages(name: &str) -> Vec<String> {
    vec![format!("You kill the {name}")]
}

/// Anything events can be registered on. Every helper forwards to `add_event`.
pub trait EventBuilder {
    fn add_event(&mut self, event: Event);

    fn add_message_event<S: Into<String>>(&mut self, messages: impl IntoIterator<Item = S>, settings: EventSettings) {
        self.add_event(Event::message(messages, settings));
    }

    fn add_eat_event(&mut self, name: &str, settings: EventSettings) {
        self.add_event(Event::message(eat_messages(name), settings));
    }

    fn add_wield_event(&mut self, name: &str, settings: EventSettings) {
        self.add_event(Event::message(wield_messages(name), settings));
    }

    fn add_wear_event(&mut self, name: &str, settings: EventSettings) {
        self.add_event(Event::message(wear_messages(name), settings));
    }

    fn add_amulet_event(&mut self, settings: EventSettings) {
        self.add_event(Event::message(amulet_messages(), settings));
    }

    fn add_kill_event(&mut self, name: &str, settings: EventSettings) {
        self.add_event(Event::message(kill_messages(name), settings));
    }

    /// Taking `action_name` (e.g. "pray") while standing on `place_name`, then confirming.
    fn add_positional_event(&mut self, place_name: &str, action_name: &str, settings: EventSettings) -> Result<(), EngineError> {
        let action = Command::from_name(action_name)?;
        self.add_event(Event::loc_action(place_name.to_lowercase(), action, settings));
        Ok(())
    }

    fn add_coordinate_event(&mut self, coordinates: (i64, i64), settings: EventSettings) {
        self.add_event(Event::coordinates(coordinates, settings));
    }

    fn add_location_event(&mut self, location: &str, settings: EventSettings) {
        self.add_event(Event::location(location, settings));
    }
}
