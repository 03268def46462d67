//! The multi-agent turn coordinator.
//!
//! One [`DiceAdventureEnv::step`] call:
//!
//! 1. captures the current state,
//! 2. applies the focal action and captures the result,
//! 3. scores the transition,
//! 4. drives every other player (if enabled),
//! 5. re-queries the state and encodes it.
//!
//! Terminal episodes either reset automatically (the fresh observation is
//! returned in place of the terminal one, with the fresh episode's info in
//! [`StepInfo::reset_info`]) or park the environment until the caller resets
//! it.

use serde::Serialize;

use crate::core::{Character, GameAction, GameRng, Position};
use crate::encoding::{EncodedState, StateEncoder};
use crate::error::{GymError, Result};
use crate::reward::{RewardBreakdown, RewardPolicy};
use crate::state::{GameStateDocument, Level, StateProvider};

use super::config::EnvConfig;

/// Lifecycle of an environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvPhase {
    /// Never reset.
    Uninitialized,
    /// Accepting steps.
    Ready,
    /// An episode ended and auto-reset is off.
    Terminal,
}

/// Side information for one reset or step.
///
/// On an auto-reset step every field describes the terminal state the
/// episode ended in; the returned observation belongs to the new episode,
/// whose own reset info is carried in `reset_info`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepInfo {
    /// Terms that fired this step. Empty after a reset.
    pub reward: RewardBreakdown,
    /// Level and phase of the state the step ended in.
    pub level: Level,
    pub phase: String,
    /// Zero-based episode index.
    pub episode: u64,
    /// Steps taken in the episode, including this one.
    pub step: u64,
    /// The episode ended and a new one was started in this call.
    pub auto_reset: bool,
    /// Info of the episode started by an auto-reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_info: Option<Box<StepInfo>>,
}

/// Result of one step.
#[derive(Clone, Debug)]
pub struct StepResult {
    pub observation: EncodedState,
    pub reward: f64,
    pub terminated: bool,
    /// Always false; episodes are never cut short.
    pub truncated: bool,
    pub info: StepInfo,
}

/// Reinforcement-learning environment around a [`StateProvider`].
pub struct DiceAdventureEnv<P: StateProvider> {
    provider: P,
    encoder: Box<dyn StateEncoder>,
    policy: RewardPolicy,
    config: EnvConfig,
    rng: GameRng,
    phase: EnvPhase,
    last_position: Option<Position>,
    episodes: u64,
    steps: u64,
}

impl<P: StateProvider> DiceAdventureEnv<P> {
    /// Create an environment. Call [`reset`](Self::reset) before stepping.
    pub fn new(
        provider: P,
        encoder: Box<dyn StateEncoder>,
        policy: RewardPolicy,
        config: EnvConfig,
    ) -> Self {
        Self {
            rng: GameRng::new(config.seed).for_context("automated-players"),
            provider,
            encoder,
            policy,
            config,
            phase: EnvPhase::Uninitialized,
            last_position: None,
            episodes: 0,
            steps: 0,
        }
    }

    #[must_use]
    pub fn player(&self) -> Character {
        self.config.player
    }

    #[must_use]
    pub fn phase(&self) -> EnvPhase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    #[must_use]
    pub fn policy(&self) -> &RewardPolicy {
        &self.policy
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Length of every observation.
    #[must_use]
    pub fn observation_size(&self) -> usize {
        self.encoder.observation_size(self.config.player)
    }

    /// Size of the action vocabulary.
    #[must_use]
    pub fn action_count(&self) -> usize {
        GameAction::COUNT
    }

    /// Start a new episode.
    ///
    /// On failure the environment is left uninitialized and the episode
    /// counters are untouched.
    pub fn reset(&mut self) -> Result<(EncodedState, StepInfo)> {
        self.phase = EnvPhase::Uninitialized;
        self.last_position = None;
        self.provider.reset()?;

        let state = self.query()?;
        let observation = self.encode(&state)?;
        self.episodes += 1;
        self.steps = 0;
        self.phase = EnvPhase::Ready;

        tracing::info!(
            episode = self.episodes - 1,
            provider = self.provider.name(),
            level = %state.level,
            "episode started"
        );
        let info = self.info(&state, RewardBreakdown::default());
        Ok((observation, info))
    }

    /// Apply `action` for the focal player and advance the game.
    pub fn step(&mut self, action: usize) -> Result<StepResult> {
        match self.phase {
            EnvPhase::Uninitialized => return Err(GymError::NotReset),
            EnvPhase::Terminal => return Err(GymError::EpisodeTerminated),
            EnvPhase::Ready => {}
        }
        let action = GameAction::from_index(action).ok_or(GymError::InvalidAction {
            index: action,
            count: GameAction::COUNT,
        })?;
        let player = self.config.player;

        let prev = self.query()?;
        let next = self.provider.execute_action(player, action)?;
        let breakdown = self.policy.score_states(player, &prev, &next)?;

        if self.config.automate_players && !next.is_done() {
            self.play_others(action, &prev, &next)?;
        }

        let state = self.query()?;
        self.steps += 1;
        let terminated = state.is_done();
        let reward = breakdown.total;

        tracing::debug!(
            %action,
            reward,
            fired = %breakdown.codes(),
            step = self.steps,
            "step"
        );

        let mut info = self.info(&state, breakdown);
        if terminated {
            tracing::info!(
                episode = self.episodes - 1,
                steps = self.steps,
                level = %state.level,
                "episode finished"
            );
            if self.config.auto_reset_on_terminal {
                let (observation, reset_info) = self.reset()?;
                info.auto_reset = true;
                info.reset_info = Some(Box::new(reset_info));
                return Ok(StepResult {
                    observation,
                    reward,
                    terminated,
                    truncated: false,
                    info,
                });
            }
            self.phase = EnvPhase::Terminal;
        }

        let observation = self.encode(&state)?;
        Ok(StepResult {
            observation,
            reward,
            terminated,
            truncated: false,
            info,
        })
    }

    /// Act for every non-focal player.
    ///
    /// After a focal submit that did not end the phase the others submit
    /// too; otherwise each picks a uniformly random action.
    fn play_others(
        &mut self,
        focal_action: GameAction,
        prev: &GameStateDocument,
        next: &GameStateDocument,
    ) -> Result<()> {
        let force_submit = focal_action == GameAction::Submit && prev.phase == next.phase;
        for other in self.config.player.others() {
            let action = if force_submit {
                GameAction::Submit
            } else {
                self.rng
                    .choose(&GameAction::ALL)
                    .copied()
                    .unwrap_or(GameAction::Wait)
            };
            tracing::trace!(player = %other, %action, "automated action");
            let state = self.provider.execute_action(other, action)?;
            if state.is_done() {
                break;
            }
        }
        Ok(())
    }

    fn query(&mut self) -> Result<GameStateDocument> {
        self.provider
            .get_state(self.config.player, self.config.visibility)
    }

    /// Encode, remembering the focal player's most recent position.
    fn encode(&mut self, state: &GameStateDocument) -> Result<EncodedState> {
        let player = self.config.player;
        if let Some(position) = state.player(player).and_then(|e| e.position()) {
            self.last_position = Some(position);
        }
        self.encoder.encode(state, player, self.last_position)
    }

    fn info(&self, state: &GameStateDocument, reward: RewardBreakdown) -> StepInfo {
        StepInfo {
            reward,
            level: state.level.clone(),
            phase: state.phase.clone(),
            episode: self.episodes.saturating_sub(1),
            step: self.steps,
            auto_reset: false,
            reset_info: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{GridEncoder, ObservationConfig};
    use crate::games::grid::GridGameBuilder;
    use crate::state::LocalProvider;

    fn local_env(config: EnvConfig) -> DiceAdventureEnv<LocalProvider> {
        let provider = LocalProvider::new(GridGameBuilder::new(), config.seed)
            .unwrap()
            .with_visibility(config.visibility);
        let encoder = GridEncoder::new(ObservationConfig::default()).unwrap();
        DiceAdventureEnv::new(provider, Box::new(encoder), RewardPolicy::standard(), config)
    }

    #[test]
    fn test_step_before_reset() {
        let mut env = local_env(EnvConfig::default());
        assert!(matches!(env.step(0), Err(GymError::NotReset)));
    }

    #[test]
    fn test_invalid_action() {
        let mut env = local_env(EnvConfig::default());
        env.reset().unwrap();
        assert!(matches!(
            env.step(11),
            Err(GymError::InvalidAction { index: 11, count: 11 })
        ));
    }

    #[test]
    fn test_reset_observation_size() {
        let mut env = local_env(EnvConfig::default());
        let (obs, info) = env.reset().unwrap();
        assert_eq!(obs.len(), env.observation_size());
        assert_eq!(info.episode, 0);
        assert_eq!(info.step, 0);
        assert!(info.reward.fired.is_empty());
        assert_eq!(env.phase(), EnvPhase::Ready);
    }

    #[test]
    fn test_step_counts() {
        let mut env = local_env(EnvConfig::default().with_automate_players(false));
        env.reset().unwrap();
        env.step(GameAction::Wait.index()).unwrap();
        let result = env.step(GameAction::Wait.index()).unwrap();
        assert_eq!(result.info.step, 2);
        assert!(!result.truncated);
        // Waiting is standing still.
        assert!((result.reward - -0.1).abs() < 1e-9);
    }

    #[test]
    fn test_forced_submit_flips_phase() {
        let mut env = local_env(EnvConfig::default());
        env.reset().unwrap();
        let result = env.step(GameAction::Submit.index()).unwrap();
        assert_eq!(result.info.phase, "PlayerPinning");
    }

    #[test]
    fn test_second_reset_increments_episode() {
        let mut env = local_env(EnvConfig::default());
        env.reset().unwrap();
        let (_, info) = env.reset().unwrap();
        assert_eq!(info.episode, 1);
    }
}
