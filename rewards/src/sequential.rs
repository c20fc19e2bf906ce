use minihack_core::{EngineError, GameView, Observation};
use tracing::debug;

use crate::builder::EventBuilder;
use crate::event::Event;
use crate::manager::EpisodeManager;

/// Events that must happen in the order they were added. Only the event at the
/// cursor is checked; required/sufficient flags are ignored.
#[derive(Debug, Default)]
pub struct SequentialRewardManager {
    events: Vec<Event>,
    current_event_idx: usize,
    curr_reward: f64,
}

impl SequentialRewardManager {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> &[Event] { &self.events }
    pub fn len(&self) -> usize { self.events.len() }
    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    /// Index of the event being waited on.
    pub fn cursor(&self) -> usize { self.current_event_idx }

    pub fn is_complete(&self) -> bool {
        self.current_event_idx >= self.events.len()
    }
}

impl EventBuilder for SequentialRewardManager {
    fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }
}

impl EpisodeManager for SequentialRewardManager {
    fn check_episode_end_call(
        &mut self,
        env: &dyn GameView,
        previous: &Observation,
        action: usize,
        observation: &Observation,
    ) -> Result<bool, EngineError> {
        let Some(event) = self.events.get_mut(self.current_event_idx) else {
            return Ok(true);
        };
        let reward = event.check(env, previous, action, observation)?;
        if event.achieved() {
            self.current_event_idx += 1;
            debug!(cursor = self.current_event_idx, total = self.events.len(), "sequence advanced");
        }
        self.curr_reward += reward;
        Ok(self.is_complete())
    }

    fn collect_reward(&mut self) -> f64 {
        std::mem::take(&mut self.curr_reward)
    }

    fn reset(&mut self) {
        self.current_event_idx = 0;
        self.curr_reward = 0.0;
        for event in &mut self.events {
            event.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSettings;
    use crate::testing::{obs_with_message, TestView};

    fn key_then_door() -> SequentialRewardManager {
        let mut m = SequentialRewardManager::new();
        m.add_message_event(["key"], EventSettings::default());
        m.add_message_event(["door"], EventSettings::default().with_reward(2.0));
        m
    }

    #[test]
    fn out_of_order_event_does_not_advance() {
        let view = TestView::default();
        let prev = obs_with_message("");
        let mut m = key_then_door();
        assert!(!m.check_episode_end_call(&view, &prev, 0, &obs_with_message("door")).unwrap());
        assert_eq!(m.cursor(), 0);
        assert!(!m.events()[1].achieved());
        assert_eq!(m.collect_reward(), 0.0);
    }

    #[test]
    fn in_order_events_complete() {
        let view = TestView::default();
        let prev = obs_with_message("");
        let mut m = key_then_door();
        assert!(!m.check_episode_end_call(&view, &prev, 0, &obs_with_message("key and door")).unwrap());
        assert_eq!(m.cursor(), 1);
        assert!(m.check_episode_end_call(&view, &prev, 0, &obs_with_message("door")).unwrap());
        assert_eq!(m.collect_reward(), 3.0);
        // Finished sequences stay finished and check nothing.
        assert!(m.check_episode_end_call(&view, &prev, 0, &obs_with_message("door")).unwrap());
        assert_eq!(m.collect_reward(), 0.0);
    }

    #[test]
    fn empty_sequence_is_done() {
        let view = TestView::default();
        let obs = obs_with_message("");
        let mut m = SequentialRewardManager::new();
        assert!(m.check_episode_end_call(&view, &obs, 0, &obs).unwrap());
    }

    #[test]
    fn repeatable_event_holds_the_cursor() {
        let view = TestView::default();
        let obs = obs_with_message("squeak");
        let mut m = SequentialRewardManager::new();
        m.add_message_event(["squeak"], EventSettings::default().with_reward(-1.0).with_repeatable(true));
        assert!(!m.check_episode_end_call(&view, &obs, 0, &obs).unwrap());
        assert!(!m.check_episode_end_call(&view, &obs, 0, &obs).unwrap());
        assert_eq!(m.cursor(), 0);
        assert_eq!(m.collect_reward(), -2.0);
    }

    #[test]
    fn reset_rewinds() {
        let view = TestView::default();
        let prev = obs_with_message("");
        let mut m = key_then_door();
        m.check_episode_end_call(&view, &prev, 0, &obs_with_message("key")).unwrap();
        m.reset();
        assert_eq!(m.cursor(), 0);
        assert_eq!(m.collect_reward(), 0.0);
        assert!(m.events().iter().all(|e| !e.achieved()));
    }
}
