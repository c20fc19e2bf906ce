use minihack_core::{skill_actions, Command, CompassDirection, EngineError, GameEngine, GameView, YES};
use scripted_nethack::{preset_names, preset_scenario, Feature, Level, Rule, Scenario, ScriptedNetHack, NEVER_MIND, WELCOME_MESSAGE};

fn engine(name: &str) -> ScriptedNetHack {
    ScriptedNetHack::new(preset_scenario(name).unwrap(), skill_actions()).unwrap()
}

fn idx(env: &ScriptedNetHack, code: impl Into<minihack_core::ActionCode>) -> usize {
    env.action_index(code).unwrap()
}

#[test]
fn presets_load() {
    let names = preset_names();
    for expected in ["eat_apple", "lava_room", "maze_stairs", "memento", "pray_altar", "wear_robe", "wield_dagger"] {
        assert!(names.contains(&expected), "missing preset {expected}");
    }
    assert!(matches!(preset_scenario("nope"), Err(EngineError::NotFound(_))));
}

#[test]
fn reset_renders_start_state() {
    let mut env = engine("eat_apple");
    let obs = env.reset(None).unwrap();
    assert_eq!(obs.message_text().unwrap(), WELCOME_MESSAGE);
    assert_eq!(obs.position(), Some((1, 1)));
    assert_eq!(obs.time(), 1);
    assert!(env.screen_contains("apple"));
    assert!(env.screen_contains("called Agent"));
    assert_eq!(obs.screen_descriptions.description(0, 0).unwrap(), "floor of a room");
}

#[test]
fn seed_selects_level_variant() {
    let mut env = engine("eat_apple");
    env.reset(Some(1)).unwrap();
    assert_eq!(env.level_index(), 1);
    env.reset(Some(2)).unwrap();
    assert_eq!(env.level_index(), 0);
}

#[test]
fn moving_onto_an_object_hides_it() {
    let mut env = engine("eat_apple");
    env.reset(None).unwrap();
    let east = idx(&env, CompassDirection::E);
    let step = env.step(east).unwrap();
    assert_eq!(step.observation.position(), Some((2, 1)));
    assert_eq!(step.observation.message_text().unwrap(), "You see here an apple.");
    assert_eq!(step.observation.time(), 2);
    assert!(!env.screen_contains("apple"));
    assert!(!step.game_over);
}

#[test]
fn edges_and_walls_block_without_time() {
    let mut env = engine("maze_stairs");
    env.reset(None).unwrap();
    let north = idx(&env, CompassDirection::N);
    let step = env.step(north).unwrap();
    assert_eq!(step.observation.position(), Some((0, 0)));
    assert_eq!(step.observation.time(), 1);
    let se = idx(&env, CompassDirection::SE);
    let step = env.step(se).unwrap();
    assert_eq!(step.observation.position(), Some((0, 0)));
}

#[test]
fn eating_asks_then_consumes() {
    let mut env = engine("eat_apple");
    env.reset(None).unwrap();
    env.step(idx(&env, CompassDirection::E)).unwrap();
    let prompt = env.step(idx(&env, Command::Eat)).unwrap();
    assert_eq!(prompt.observation.message_text().unwrap(), "There is an apple here; eat it? [ynq] (n)");
    assert_eq!(prompt.observation.time(), 2);
    let done = env.step(idx(&env, YES)).unwrap();
    assert_eq!(done.observation.message_text().unwrap(), "This apple is delicious!  Core dumped.");
    // Yes answered the prompt instead of moving north-west.
    assert_eq!(done.observation.position(), Some((2, 1)));
    assert_eq!(done.observation.time(), 3);
    assert!(!env.screen_contains("apple"));
    env.step(idx(&env, CompassDirection::W)).unwrap();
    assert!(!env.screen_contains("apple"));
}

#[test]
fn other_keys_cancel_a_prompt() {
    let mut env = engine("pray_altar");
    env.reset(None).unwrap();
    env.step(idx(&env, Command::Pray)).unwrap();
    let cancel = env.step(idx(&env, CompassDirection::E)).unwrap();
    assert_eq!(cancel.observation.message_text().unwrap(), NEVER_MIND);
    assert_eq!(cancel.observation.position(), Some((1, 1)));
}

#[test]
fn eat_without_food_is_free() {
    let mut env = engine("eat_apple");
    env.reset(None).unwrap();
    let step = env.step(idx(&env, Command::Eat)).unwrap();
    assert_eq!(step.observation.message_text().unwrap(), "You don't have anything to eat.");
    assert_eq!(step.observation.time(), 1);
}

#[test]
fn pickup_then_wield_uses_inventory() {
    let mut env = engine("wield_dagger");
    env.reset(None).unwrap();
    let empty = env.step(idx(&env, Command::Wield)).unwrap();
    assert_eq!(empty.observation.message_text().unwrap(), "You are empty handed.");
    env.step(idx(&env, CompassDirection::E)).unwrap();
    let picked = env.step(idx(&env, Command::Pickup)).unwrap();
    assert_eq!(picked.observation.key_in_inventory("dagger").unwrap(), Some('a'));
    let wielded = env.step(idx(&env, Command::Wield)).unwrap();
    assert_eq!(wielded.observation.message_text().unwrap(), "a - a dagger (weapon in hand).");
    assert_eq!(env.inventory(), ["a dagger".to_string()]);
}

#[test]
fn stairs_set_internal_flag() {
    let mut env = engine("maze_stairs");
    env.reset(None).unwrap();
    let south = idx(&env, CompassDirection::S);
    let east = idx(&env, CompassDirection::E);
    for _ in 0..4 {
        assert!(!env.step(south).unwrap().observation.on_stairs_down());
    }
    for _ in 0..3 {
        env.step(east).unwrap();
    }
    let last = env.step(east).unwrap();
    assert_eq!(last.observation.position(), Some((4, 4)));
    assert!(last.observation.on_stairs_down());
}

#[test]
fn lava_ends_the_game() {
    let mut env = engine("lava_room");
    env.reset(None).unwrap();
    let step = env.step(idx(&env, CompassDirection::E)).unwrap();
    assert!(step.game_over);
    assert!(matches!(env.step(0), Err(EngineError::Validation(_))));
    env.reset(None).unwrap();
    assert!(env.step(0).is_ok());
}

#[test]
fn bad_action_index_is_rejected() {
    let mut env = engine("eat_apple");
    env.reset(None).unwrap();
    assert!(matches!(env.step(env.num_actions()), Err(EngineError::Validation(_))));
    assert!(env.history().is_empty());
}

#[test]
fn hand_built_scenario() {
    let level = Level::room("fountain", 3, 3, (0, 0)).with_feature(Feature::new((1, 1), "fountain"));
    let scenario = Scenario::new("quaff", level)
        .with_rule(Rule::new(Command::Quaff, "You drink from the fountain.").on("fountain").with_prompt("Drink from the fountain? [yn] (n)"));
    let mut env = ScriptedNetHack::new(scenario, skill_actions()).unwrap();
    env.reset(None).unwrap();
    env.step(idx(&env, CompassDirection::SE)).unwrap();
    env.step(idx(&env, Command::Quaff)).unwrap();
    let drink = env.step(idx(&env, YES)).unwrap();
    assert_eq!(drink.observation.message_text().unwrap(), "You drink from the fountain.");
    assert_eq!(env.history().len(), 3);
}

#[test]
fn empty_action_space_is_rejected() {
    let scenario = preset_scenario("eat_apple").unwrap();
    assert!(ScriptedNetHack::new(scenario, Vec::new()).is_err());
}
