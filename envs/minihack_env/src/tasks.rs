//! Reward managers for the standard tasks.

use minihack_core::{EngineError, GameView, Observation};
use minihack_rewards::{EpisodeManager, EventBuilder, EventSettings, GroupedRewardManager, RewardManager, SequentialRewardManager};

pub const LEVITATION_MESSAGES: [&str; 5] = [
    "You float up",
    "You start to float in the air",
    "Up, up, and awaaaay!",
    "a ring of levitation (on left hand)",
    "a ring of levitation (on right hand)",
];

pub const INVISIBILITY_MESSAGES: [&str; 4] = [
    "All of a sudden, you can't see yourself",
    "a ring of invisibility (on left hand)",
    "a ring of invisibility (on right hand)",
    "You are now wearing a cloak of invisibility",
];

pub const TELEPORT_MESSAGES: [&str; 1] = ["Do you wish to teleport?"];

pub fn eat(name: &str) -> RewardManager {
    let mut m = RewardManager::new();
    m.add_eat_event(name, EventSettings::default());
    m
}

pub fn wield(name: &str) -> RewardManager {
    let mut m = RewardManager::new();
    m.add_wield_event(name, EventSettings::default());
    m
}

pub fn wear(name: &str) -> RewardManager {
    let mut m = RewardManager::new();
    m.add_wear_event(name, EventSettings::default());
    m
}

pub fn amulet() -> RewardManager {
    let mut m = RewardManager::new();
    m.add_amulet_event(EventSettings::default());
    m
}

/// Done as soon as any of `messages` appears.
pub fn message_task(messages: &[&str]) -> RewardManager {
    let mut m = RewardManager::new();
    m.add_message_event(messages.iter().copied(), EventSettings::default());
    m
}

pub fn levitate() -> RewardManager { message_task(&LEVITATION_MESSAGES) }
pub fn invisibility() -> RewardManager { message_task(&INVISIBILITY_MESSAGES) }
pub fn teleport() -> RewardManager { message_task(&TELEPORT_MESSAGES) }

pub fn wand_of_death() -> RewardManager {
    let mut m = RewardManager::new();
    m.add_kill_event("minotaur", EventSettings::default());
    m
}

/// Stepping on the squeaky board costs 1 and ends the episode; so does killing
/// the grid bug, which pays 1.
pub fn memento() -> RewardManager {
    let ends = EventSettings::default().with_terminal_sufficient(true).with_terminal_required(true);
    let mut m = RewardManager::new();
    m.add_message_event(["squeak"], ends.with_reward(-1.0));
    m.add_kill_event("grid bug", ends.with_reward(1.0));
    m
}

/// 1 while the agent stands on the down staircase.
pub fn stairs_reward(_env: &dyn GameView, _previous: &Observation, _action: usize, observation: &Observation) -> f64 {
    if observation.on_stairs_down() { 1.0 } else { 0.0 }
}

/// Apples pay 0.5 each time. The episode never completes through the manager;
/// it ends on the stairs or on the step limit.
pub fn explore_maze() -> RewardManager {
    let mut m = RewardManager::new();
    m.add_eat_event(
        "apple",
        EventSettings::default().with_reward(0.5).with_repeatable(true).with_terminal_required(false),
    );
    m.add_message_event(["Mission Complete."], EventSettings::default().with_terminal_sufficient(true));
    m.add_custom_reward_fn(stairs_reward);
    m
}

pub fn pray_at_altar() -> Result<RewardManager, EngineError> {
    let mut m = RewardManager::new();
    m.add_positional_event("altar", "pray", EventSettings::default())?;
    Ok(m)
}

/// Pick up the key, then get the door open.
pub fn key_then_door() -> SequentialRewardManager {
    let mut m = SequentialRewardManager::new();
    m.add_message_event(["- a key", "- a skeleton key"], EventSettings::default());
    m.add_message_event(["You succeed in unlocking the door", "The door opens."], EventSettings::default());
    m
}

/// Group `members`, each given as `(manager, terminal_required, terminal_sufficient)`.
pub fn group(members: Vec<(Box<dyn EpisodeManager>, bool, bool)>) -> GroupedRewardManager {
    let mut g = GroupedRewardManager::new();
    for (manager, required, sufficient) in members {
        g.add_boxed_reward_manager(manager, required, sufficient);
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use minihack_core::{move_actions, ActionCode, ScreenDescriptions};

    struct Blank(ScreenDescriptions);

    impl GameView for Blank {
        fn screen_contains(&self, name: &str) -> bool { self.0.contains(name) }
        fn action_code(&self, index: usize) -> Option<ActionCode> { move_actions().get(index).copied() }
    }

    fn msg(text: &str) -> Observation {
        let mut obs = Observation::with_screen(2, 2);
        obs.set_message(text);
        obs
    }

    #[test]
    fn memento_ends_on_either_outcome() {
        let view = Blank(ScreenDescriptions::new(2, 2));
        let prev = msg("");
        let mut m = memento();
        assert!(m.check_episode_end_call(&view, &prev, 0, &msg("A board beneath you squeaks loudly.")).unwrap());
        assert_eq!(m.collect_reward(), -1.0);
        let mut m = memento();
        assert!(m.check_episode_end_call(&view, &prev, 0, &msg("You kill the grid bug!")).unwrap());
        assert_eq!(m.collect_reward(), 1.0);
    }

    #[test]
    fn explore_maze_never_completes_and_pays_apples_and_stairs() {
        let view = Blank(ScreenDescriptions::new(2, 2));
        let prev = msg("");
        let mut m = explore_maze();
        for _ in 0..2 {
            assert!(!m.check_episode_end_call(&view, &prev, 0, &msg("This apple is delicious!")).unwrap());
        }
        assert_eq!(m.collect_reward(), 1.0);
        let mut on_stairs = msg("");
        on_stairs.internal[minihack_core::observation::INTERNAL_STAIRS_DOWN] = 1;
        assert!(!m.check_episode_end_call(&view, &prev, 0, &on_stairs).unwrap());
        assert_eq!(m.collect_reward(), 1.0);
    }

    #[test]
    fn message_tasks_complete_on_any_message() {
        let view = Blank(ScreenDescriptions::new(2, 2));
        let prev = msg("");
        let mut m = levitate();
        assert!(m.check_episode_end_call(&view, &prev, 0, &msg("Up, up, and awaaaay!")).unwrap());
        let mut m = invisibility();
        assert!(!m.check_episode_end_call(&view, &prev, 0, &msg("You feel hungry.")).unwrap());
        assert_eq!(pray_at_altar().unwrap().len(), 1);
        assert_eq!(key_then_door().len(), 2);
    }

    #[test]
    fn group_helper_keeps_flags() {
        let apple: Box<dyn EpisodeManager> = Box::new(eat("apple"));
        let robe: Box<dyn EpisodeManager> = Box::new(wear("robe"));
        let g = group(vec![(apple, true, false), (robe, false, true)]);
        assert_eq!(g.len(), 2);
        assert!(g.members()[0].terminal_required);
        assert!(g.members()[1].terminal_sufficient);
    }
}
