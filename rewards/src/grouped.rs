use std::fmt;

use minihack_core::{EngineError, GameView, Observation};

use crate::manager::EpisodeManager;

/// A child manager together with the flags it carries inside a group.
pub struct Member {
    pub manager: Box<dyn EpisodeManager>,
    pub terminal_required: bool,
    pub terminal_sufficient: bool,
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("terminal_required", &self.terminal_required)
            .field("terminal_sufficient", &self.terminal_sufficient)
            .finish_non_exhaustive()
    }
}

/// Composite of managers of any kind, combined left to right.
#[derive(Debug, Default)]
pub struct GroupedRewardManager {
    members: Vec<Member>,
}

impl GroupedRewardManager {
    pub fn new() -> Self { Self::default() }

    pub fn add_reward_manager<M>(&mut self, manager: M, terminal_required: bool, terminal_sufficient: bool)
    where
        M: EpisodeManager + 'static,
    {
        self.add_boxed_reward_manager(Box::new(manager), terminal_required, terminal_sufficient);
    }

    pub fn add_boxed_reward_manager(
        &mut self,
        manager: Box<dyn EpisodeManager>,
        terminal_required: bool,
        terminal_sufficient: bool,
    ) {
        self.members.push(Member { manager, terminal_required, terminal_sufficient });
    }

    pub fn members(&self) -> &[Member] { &self.members }
    pub fn len(&self) -> usize { self.members.len() }
    pub fn is_empty(&self) -> bool { self.members.is_empty() }
}

impl EpisodeManager for GroupedRewardManager {
    /// Children after an early exit are not evaluated this step.
    fn check_episode_end_call(
        &mut self,
        env: &dyn GameView,
        previous: &Observation,
        action: usize,
        observation: &Observation,
    ) -> Result<bool, EngineError> {
        // Fail before any child changes state.
        observation.message_text()?;
        for member in &mut self.members {
            let done = member.manager.check_episode_end_call(env, previous, action, observation)?;
            if done && member.terminal_sufficient {
                return Ok(true);
            }
            if !done && member.terminal_required {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn collect_reward(&mut self) -> f64 {
        self.members.iter_mut().map(|m| m.manager.collect_reward()).sum()
    }

    fn reset(&mut self) {
        for member in &mut self.members {
            member.manager.reset();
        }
    }
}
