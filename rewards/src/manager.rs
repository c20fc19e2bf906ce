use std::fmt;

use minihack_core::{EngineError, GameView, Observation};
use tracing::trace;

use crate::builder::EventBuilder;
use crate::event::Event;

/// Extra per-step reward computed from `(env, previous, action, observation)`.
pub type RewardFn = Box<dyn Fn(&dyn GameView, &Observation, usize, &Observation) -> f64 + Send + Sync>;

/// What the environment needs from a manager on every step.
pub trait EpisodeManager: Send + Sync {
    /// Evaluate the step, accumulate its reward and report whether the episode is over.
    fn check_episode_end_call(
        &mut self,
        env: &dyn GameView,
        previous: &Observation,
        action: usize,
        observation: &Observation,
    ) -> Result<bool, EngineError>;

    /// Return the accumulated reward and zero it.
    fn collect_reward(&mut self) -> f64;

    fn reset(&mut self);
}

impl<M: EpisodeManager + ?Sized> EpisodeManager for Box<M> {
    fn check_episode_end_call(
        &mut self,
        env: &dyn GameView,
        previous: &Observation,
        action: usize,
        observation: &Observation,
    ) -> Result<bool, EngineError> {
        (**self).check_episode_end_call(env, previous, action, observation)
    }
    fn collect_reward(&mut self) -> f64 { (**self).collect_reward() }
    fn reset(&mut self) { (**self).reset() }
}

/// Events plus custom reward functions, with required/sufficient termination.
#[derive(Default)]
pub struct RewardManager {
    events: Vec<Event>,
    custom_reward_functions: Vec<RewardFn>,
    curr_reward: f64,
}

impl fmt::Debug for RewardManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewardManager")
            .field("events", &self.events)
            .field("custom_reward_functions", &self.custom_reward_functions.len())
            .field("curr_reward", &self.curr_reward)
            .finish()
    }
}

impl RewardManager {
    pub fn new() -> Self { Self::default() }

    pub fn add_custom_reward_fn<F>(&mut self, reward_fn: F)
    where
        F: Fn(&dyn GameView, &Observation, usize, &Observation) -> f64 + Send + Sync + 'static,
    {
        self.custom_reward_functions.push(Box::new(reward_fn));
    }

    pub fn events(&self) -> &[Event] { &self.events }
    pub fn len(&self) -> usize { self.events.len() }
    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    /// Reward accumulated since the last `collect_reward`.
    pub fn pending_reward(&self) -> f64 { self.curr_reward }

    /// Done once any sufficient event is achieved, or once every required one is.
    /// A manager without events is done.
    pub fn check_complete(&self) -> bool {
        let mut done = true;
        for event in &self.events {
            if event.terminal_sufficient && event.achieved() {
                return true;
            }
            if event.terminal_required && !event.achieved() {
                done = false;
            }
        }
        done
    }
}

impl EventBuilder for RewardManager {
    fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }
}

impl EpisodeManager for RewardManager {
    fn check_episode_end_call(
        &mut self,
        env: &dyn GameView,
        previous: &Observation,
        action: usize,
        observation: &Observation,
    ) -> Result<bool, EngineError> {
        // A malformed message fails the step before any event changes state.
        observation.message_text()?;
        let mut reward = 0.0;
        for event in self.events.iter_mut().filter(|e| !e.achieved()) {
            reward += event.check(env, previous, action, observation)?;
        }
        for reward_fn in &self.custom_reward_functions {
            reward += reward_fn(env, previous, action, observation);
        }
        self.curr_reward += reward;
        let done = self.check_complete();
        trace!(step_reward = reward, pending = self.curr_reward, done, "reward manager step");
        Ok(done)
    }

    fn collect_reward(&mut self) -> f64 {
        std::mem::take(&mut self.curr_reward)
    }

    fn reset(&mut self) {
        self.curr_reward = 0.0;
        for event in &mut self.events {
            event.reset();
        }
    }
}
