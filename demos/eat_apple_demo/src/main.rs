use minihack_core::{skill_actions, ActionCode, Command, CompassDirection, Environment, YES};
use minihack_env::{Config, MiniHackEnvironment};
use scripted_nethack::{preset_scenario, ScriptedNetHack};
use serde_json::json;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional first argument: seed to pick the level variant with.
    let seed: u64 = env::args().nth(1).map(|s| s.parse::<u64>()).transpose()?.unwrap_or(0);

    let engine = ScriptedNetHack::new(preset_scenario("eat_apple")?, skill_actions())?;
    let config = json!({
        "max_episode_steps": 20,
        "seeds": [seed],
        "rewards": { "type": "standard", "events": [ { "kind": "eat", "name": "apple" } ] }
    });
    let mut env = MiniHackEnvironment::from_config(engine, Some(config))?;
    let obs = env.reset().await?;
    println!("{}", obs.message_text()?);

    // Walk to the apple: it is east, or north-east on the second variant.
    let mut plan: Vec<ActionCode> = Vec::new();
    match obs.direction_of("apple")? {
        Some(dir) => plan.push(dir.code()),
        None => plan.push(CompassDirection::E.code()),
    }
    plan.extend([Command::Eat.code(), YES]);

    for code in plan {
        let action = env
            .engine()
            .action_index(code)
            .ok_or_else(|| format!("action {code:?} missing from the action space"))?;
        let t = env.step(action).await?;
        println!(
            "step {:>2}  reward {:>5.2}  status {:?}  message {:?}",
            env.step_count(),
            t.reward,
            t.status,
            t.observation.message_text()?
        );
        if t.terminated || t.truncated {
            break;
        }
    }

    let snapshot = env.checkpoint().await?;
    tracing::info!(total_reward = env.total_reward(), "final snapshot: {}", snapshot.data);
    Ok(())
}
