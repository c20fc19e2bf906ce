use async_trait::async_trait;
use minihack_core::{EngineError, EngineStep, Environment, GameEngine, Observation, Snapshot, StepStatus, Transition};
use minihack_rewards::{EpisodeManager, ManagerSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use tracing::{info, trace, warn};

mod penalty;
mod rng;
pub mod tasks;

pub use penalty::{PenaltyMode, TimePenalty};
pub use rng::LcgRng;

pub const DEFAULT_MAX_EPISODE_STEPS: u32 = 200;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub max_episode_steps: Option<u32>,
    pub reward_win: Option<f64>,
    pub reward_lose: Option<f64>,
    pub penalty_step: Option<f64>,
    pub penalty_time: Option<f64>,
    pub penalty_mode: Option<PenaltyMode>,
    /// Level seeds to pick from on every reset.
    pub seeds: Option<Vec<u64>>,
    /// Seed of the generator that picks from `seeds`.
    pub rng_seed: Option<u64>,
    pub rewards: Option<ManagerSpec>,
}

impl Config {
    pub fn from_json(value: Option<Json>) -> Result<Self, EngineError> {
        match value {
            Some(v) => serde_json::from_value(v).map_err(|e| EngineError::Validation(format!("bad config: {e}"))),
            None => Ok(Config::default()),
        }
    }

    pub fn max_episode_steps(&self) -> u32 { self.max_episode_steps.unwrap_or(DEFAULT_MAX_EPISODE_STEPS) }
    pub fn reward_win(&self) -> f64 { self.reward_win.unwrap_or(1.0) }
    pub fn reward_lose(&self) -> f64 { self.reward_lose.unwrap_or(0.0) }
    pub fn penalty_step(&self) -> f64 { self.penalty_step.unwrap_or(-0.01) }
    pub fn penalty_time(&self) -> f64 { self.penalty_time.unwrap_or(0.0) }
    pub fn penalty_mode(&self) -> PenaltyMode { self.penalty_mode.unwrap_or_default() }
}

/// Drives one engine and an optional reward manager through episodes.
pub struct MiniHackEnvironment<E: GameEngine> {
    engine: E,
    config: Config,
    manager: Option<Box<dyn EpisodeManager>>,
    penalty: TimePenalty,
    rng: LcgRng,
    seed: Option<u64>,
    step_count: u32,
    total_reward: f64,
    reward_last: f64,
    status: StepStatus,
    done: bool,
}

impl<E: GameEngine> MiniHackEnvironment<E> {
    /// Build from `config`; a `rewards` spec in the config becomes the manager.
    pub fn new(engine: E, config: Config) -> Result<Self, EngineError> {
        let manager = match &config.rewards {
            Some(spec) => Some(spec.build()?),
            None => None,
        };
        Self::assemble(engine, config, manager)
    }

    pub fn from_config(engine: E, config: Option<Json>) -> Result<Self, EngineError> {
        Self::new(engine, Config::from_json(config)?)
    }

    /// Build with a hand-made manager. A `rewards` spec in `config` is ignored.
    pub fn with_manager<M>(engine: E, config: Config, manager: M) -> Result<Self, EngineError>
    where
        M: EpisodeManager + 'static,
    {
        if config.rewards.is_some() {
            warn!("config carries a rewards spec but an explicit manager was given; using the manager");
        }
        Self::assemble(engine, config, Some(Box::new(manager)))
    }

    fn assemble(engine: E, config: Config, manager: Option<Box<dyn EpisodeManager>>) -> Result<Self, EngineError> {
        if config.max_episode_steps() == 0 {
            return Err(EngineError::Validation("bad config: max_episode_steps must be positive".into()));
        }
        if matches!(&config.seeds, Some(s) if s.is_empty()) {
            warn!("config lists no seeds; levels will use the engine default");
        }
        let penalty = TimePenalty::new(config.penalty_mode(), config.penalty_step(), config.penalty_time());
        let rng = LcgRng::new(config.rng_seed.unwrap_or(0));
        Ok(Self {
            engine,
            config,
            manager,
            penalty,
            rng,
            seed: None,
            step_count: 0,
            total_reward: 0.0,
            reward_last: 0.0,
            status: StepStatus::Running,
            done: false,
        })
    }

    pub fn engine(&self) -> &E { &self.engine }
    pub fn config(&self) -> &Config { &self.config }
    pub fn step_count(&self) -> u32 { self.step_count }
    pub fn total_reward(&self) -> f64 { self.total_reward }
    pub fn status(&self) -> StepStatus { self.status }
    pub fn seed(&self) -> Option<u64> { self.seed }
    pub fn has_manager(&self) -> bool { self.manager.is_some() }

    fn end_status(&mut self, previous: &Observation, action: usize, step: &EngineStep) -> Result<StepStatus, EngineError> {
        // Going over the step limit overrides the task check; the manager is not consulted.
        if self.step_count >= self.config.max_episode_steps() {
            return Ok(if step.game_over { StepStatus::Death } else { StepStatus::Aborted });
        }
        let task_done = match self.manager.as_mut() {
            Some(m) => m.check_episode_end_call(&self.engine, previous, action, &step.observation)?,
            None => false,
        };
        Ok(if step.game_over {
            StepStatus::Death
        } else if task_done || step.observation.on_stairs_down() {
            StepStatus::TaskSuccessful
        } else {
            StepStatus::Running
        })
    }

    fn reward(&mut self, status: StepStatus, previous: &Observation, observation: &Observation) -> f64 {
        let base = match self.manager.as_mut() {
            Some(m) => m.collect_reward(),
            None => match status {
                StepStatus::TaskSuccessful => self.config.reward_win(),
                StepStatus::Running => 0.0,
                StepStatus::Death | StepStatus::Aborted => self.config.reward_lose(),
            },
        };
        base + self.penalty.apply(previous, observation)
    }
}

#[async_trait]
impl<E: GameEngine> Environment for MiniHackEnvironment<E> {
    async fn reset(&mut self) -> Result<Observation, EngineError> {
        if let Some(m) = self.manager.as_mut() {
            m.reset();
        }
        self.penalty.reset();
        self.seed = match self.config.seeds.as_deref() {
            Some(seeds) => self.rng.choose(seeds),
            None => None,
        };
        let observation = self.engine.reset(self.seed)?;
        self.step_count = 0;
        self.total_reward = 0.0;
        self.reward_last = 0.0;
        self.status = StepStatus::Running;
        self.done = false;
        info!(seed = ?self.seed, "episode reset");
        Ok(observation)
    }

    async fn step(&mut self, action: usize) -> Result<Transition, EngineError> {
        if self.done {
            return Err(EngineError::Validation("episode is over; call reset".into()));
        }
        let num_actions = self.engine.num_actions();
        if action >= num_actions {
            return Err(EngineError::Validation(format!("action index {action} outside 0..{num_actions}")));
        }
        let previous = self.engine.last_observation().clone();
        let step = self.engine.step(action)?;
        self.step_count += 1;

        let status = self.end_status(&previous, action, &step)?;
        let reward = self.reward(status, &previous, &step.observation);
        self.reward_last = reward;
        self.total_reward += reward;
        self.status = status;
        self.done = status.is_done();
        trace!(step = self.step_count, action, reward, status = ?status, "env step");
        if self.done {
            info!(steps = self.step_count, total_reward = self.total_reward, status = ?status, "episode finished");
        }
        Ok(Transition {
            observation: step.observation,
            reward,
            terminated: matches!(status, StepStatus::TaskSuccessful | StepStatus::Death),
            truncated: status == StepStatus::Aborted,
            status,
        })
    }

    async fn checkpoint(&self) -> Result<Snapshot, EngineError> {
        let last = self.engine.last_observation();
        let data = json!({
            "step_count": self.step_count,
            "max_episode_steps": self.config.max_episode_steps(),
            "total_reward": self.total_reward,
            "reward_last": self.reward_last,
            "status": self.status,
            "seed": self.seed,
            "frozen_steps": self.penalty.frozen_steps(),
            "message": last.message_text()?,
            "position": last.position().map(|(x, y)| [x, y]),
        });
        Ok(Snapshot { version: 1, engine: "minihack".into(), data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minihack_core::{skill_actions, Command, CompassDirection, YES};
    use minihack_rewards::{EventBuilder, EventSettings, RewardManager};
    use scripted_nethack::{preset_scenario, ScriptedNetHack};

    fn engine(name: &str) -> ScriptedNetHack {
        ScriptedNetHack::new(preset_scenario(name).unwrap(), skill_actions()).unwrap()
    }

    fn idx(env: &MiniHackEnvironment<ScriptedNetHack>, code: impl Into<minihack_core::ActionCode>) -> usize {
        env.engine().action_index(code).unwrap()
    }

    #[test]
    fn config_defaults() {
        let cfg = Config::from_json(None).unwrap();
        assert_eq!(cfg.max_episode_steps(), 200);
        assert_eq!(cfg.reward_win(), 1.0);
        assert_eq!(cfg.reward_lose(), 0.0);
        assert_eq!(cfg.penalty_step(), -0.01);
        assert_eq!(cfg.penalty_time(), 0.0);
        assert_eq!(cfg.penalty_mode(), PenaltyMode::Constant);
    }

    #[test]
    fn bad_config_is_a_validation_error() {
        let err = Config::from_json(Some(json!({ "penalty_mode": "cubic" }))).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ref m) if m.starts_with("bad config")));
        let zero = Config { max_episode_steps: Some(0), ..Config::default() };
        assert!(MiniHackEnvironment::new(engine("eat_apple"), zero).is_err());
    }

    #[tokio::test]
    async fn eat_apple_end_to_end() {
        let mut m = RewardManager::new();
        m.add_eat_event("apple", EventSettings::default());
        let cfg = Config { penalty_step: Some(0.0), ..Config::default() };
        let mut env = MiniHackEnvironment::with_manager(engine("eat_apple"), cfg, m).unwrap();
        env.reset().await.unwrap();

        let t1 = env.step(idx(&env, CompassDirection::E)).await.unwrap();
        assert_eq!((t1.terminated, t1.reward), (false, 0.0));
        let t2 = env.step(idx(&env, Command::Eat)).await.unwrap();
        assert_eq!((t2.terminated, t2.reward), (false, 0.0));
        let t3 = env.step(idx(&env, YES)).await.unwrap();
        assert!(t3.observation.message_text().unwrap().contains("This apple is delicious"));
        assert!(t3.terminated);
        assert_eq!(t3.reward, 1.0);
        assert_eq!(t3.status, StepStatus::TaskSuccessful);

        let again = env.step(0).await.unwrap_err();
        assert!(matches!(again, EngineError::Validation(ref m) if m.contains("call reset")));
    }

    #[tokio::test]
    async fn frozen_steps_are_penalised() {
        let mut env = MiniHackEnvironment::with_manager(engine("eat_apple"), Config::default(), tasks::eat("apple")).unwrap();
        env.reset().await.unwrap();
        let moved = env.step(idx(&env, CompassDirection::E)).await.unwrap();
        assert_eq!(moved.reward, 0.0);
        let prompt = env.step(idx(&env, Command::Eat)).await.unwrap();
        assert_eq!(prompt.reward, -0.01);
    }

    #[tokio::test]
    async fn step_limit_truncates() {
        let cfg = Config { max_episode_steps: Some(2), penalty_step: Some(0.0), reward_lose: Some(-1.0), ..Config::default() };
        let mut env = MiniHackEnvironment::new(engine("pray_altar"), cfg).unwrap();
        env.reset().await.unwrap();
        let north = idx(&env, CompassDirection::N);
        let south = idx(&env, CompassDirection::S);
        assert_eq!(env.step(north).await.unwrap().status, StepStatus::Running);
        let last = env.step(south).await.unwrap();
        assert_eq!(last.status, StepStatus::Aborted);
        assert!(last.truncated && !last.terminated);
        assert_eq!(last.reward, -1.0);
    }

    #[tokio::test]
    async fn step_limit_overrides_task_success() {
        let cfg = Config { max_episode_steps: Some(3), penalty_step: Some(0.0), ..Config::default() };
        let mut env = MiniHackEnvironment::with_manager(engine("eat_apple"), cfg, tasks::eat("apple")).unwrap();
        env.reset().await.unwrap();
        env.step(idx(&env, CompassDirection::E)).await.unwrap();
        env.step(idx(&env, Command::Eat)).await.unwrap();
        let last = env.step(idx(&env, YES)).await.unwrap();
        assert!(last.observation.message_text().unwrap().contains("This apple is delicious"));
        assert_eq!(last.status, StepStatus::Aborted);
        assert!(last.truncated && !last.terminated);
        assert_eq!(last.reward, 0.0);
    }

    #[tokio::test]
    async fn death_wins_over_everything() {
        let cfg = Config { penalty_step: Some(0.0), reward_lose: Some(-1.0), ..Config::default() };
        let mut env = MiniHackEnvironment::new(engine("lava_room"), cfg).unwrap();
        env.reset().await.unwrap();
        let t = env.step(idx(&env, CompassDirection::E)).await.unwrap();
        assert_eq!(t.status, StepStatus::Death);
        assert!(t.terminated);
        assert_eq!(t.reward, -1.0);
    }

    #[tokio::test]
    async fn unknown_action_index_is_rejected() {
        let mut env = MiniHackEnvironment::new(engine("eat_apple"), Config::default()).unwrap();
        env.reset().await.unwrap();
        let n = env.engine().num_actions();
        assert!(matches!(env.step(n).await, Err(EngineError::Validation(_))));
        assert_eq!(env.step_count(), 0);
    }

    #[tokio::test]
    async fn seeds_are_drawn_deterministically() {
        let cfg = || Config { seeds: Some(vec![0, 1]), rng_seed: Some(11), ..Config::default() };
        let mut a = MiniHackEnvironment::new(engine("eat_apple"), cfg()).unwrap();
        let mut b = MiniHackEnvironment::new(engine("eat_apple"), cfg()).unwrap();
        for _ in 0..4 {
            a.reset().await.unwrap();
            b.reset().await.unwrap();
            assert_eq!(a.seed(), b.seed());
            assert_eq!(a.engine().level_index() as u64, a.seed().unwrap());
        }
    }

    #[tokio::test]
    async fn checkpoint_reports_progress() {
        let mut env = MiniHackEnvironment::new(engine("eat_apple"), Config::default()).unwrap();
        env.reset().await.unwrap();
        env.step(idx(&env, CompassDirection::E)).await.unwrap();
        let snap = env.checkpoint().await.unwrap();
        assert_eq!(snap.engine, "minihack");
        assert_eq!(snap.version, 1);
        assert_eq!(snap.data["step_count"], json!(1));
        assert_eq!(snap.data["status"], json!("running"));
        assert_eq!(snap.data["message"], json!("You see here an apple."));
        assert_eq!(snap.data["position"], json!([2, 1]));
    }
}
