//! Random-policy rollout driver.
//!
//! Runs the environment with uniformly random focal actions and logs each
//! step's reward and per-episode totals. Useful for smoke-testing a game
//! server or a reward configuration.
//!
//! ```text
//! RUST_LOG=dice_gym=debug dice-gym-rollout --player Giant --steps 500
//! ```

use std::path::PathBuf;

use clap::Parser;
use dice_gym::{Character, GameAction, GameRng, GymConfig, ServerKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dice-gym-rollout")]
#[command(about = "Drive a Dice Adventure environment with random actions")]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Focal character (overrides the config file)
    #[arg(long)]
    player: Option<Character>,

    /// State provider: local or remote (overrides the config file)
    #[arg(long)]
    server: Option<ServerKind>,

    /// Number of focal steps to take
    #[arg(long, default_value = "200")]
    steps: u64,

    /// Seed for the action sampler and the local simulator
    #[arg(long, default_value = "0")]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GymConfig::from_path(path)?,
        None => GymConfig::default(),
    };
    let mut env_config = config.env.clone().with_seed(args.seed);
    if let Some(player) = args.player {
        env_config = env_config.with_player(player);
    }
    if let Some(server) = args.server {
        env_config = env_config.with_server(server);
    }
    let config = config.with_env(env_config);

    let mut env = config.build_env()?;
    let mut sampler = GameRng::new(args.seed).for_context("rollout");

    env.reset()?;
    tracing::info!(
        player = %env.player(),
        server = %config.env.server,
        reward = env.policy().name(),
        observation_size = env.observation_size(),
        "rollout started"
    );

    let mut episode_return = 0.0;
    let mut episodes = 0u64;
    for _ in 0..args.steps {
        let action = sampler.gen_range_usize(0..GameAction::COUNT);
        let result = env.step(action)?;
        episode_return += result.reward;
        tracing::debug!(
            step = result.info.step,
            action = %GameAction::ALL[action],
            reward = result.reward,
            fired = %result.info.reward.codes(),
            "step"
        );

        if result.terminated {
            episodes += 1;
            tracing::info!(
                episode = result.info.episode,
                steps = result.info.step,
                episode_return,
                "episode return"
            );
            episode_return = 0.0;
            if !result.info.auto_reset {
                env.reset()?;
            }
        }
    }

    tracing::info!(episodes, partial_return = episode_return, "rollout finished");
    Ok(())
}
