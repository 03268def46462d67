//! Turn coordinator tests against a scripted provider.
//!
//! The provider replays a fixed list of documents: every executed action
//! advances one document (staying on the last), and `reset` rewinds to the
//! first. Executed actions are logged so the automated-player sequencing can
//! be checked exactly.

use dice_gym::core::{Character, Entity, GameAction, PlayerStats, Position};
use dice_gym::encoding::{GridEncoder, ObservationConfig, StateEncoder};
use dice_gym::env::{DiceAdventureEnv, EnvConfig, EnvPhase};
use dice_gym::error::{GymError, ProviderError, Result};
use dice_gym::reward::{RewardPolicy, RewardTerm};
use dice_gym::state::{GameStateDocument, Level, StateProvider, Status, Visibility};

struct ScriptedProvider {
    states: Vec<GameStateDocument>,
    cursor: usize,
    log: Vec<(Character, GameAction)>,
    resets: usize,
    fail_queries: bool,
    fail_after_reset: bool,
}

impl ScriptedProvider {
    fn new(states: Vec<GameStateDocument>) -> Self {
        Self {
            states,
            cursor: 0,
            log: Vec::new(),
            resets: 0,
            fail_queries: false,
            fail_after_reset: false,
        }
    }
}

impl StateProvider for ScriptedProvider {
    fn get_state(&mut self, _player: Character, _visibility: Visibility) -> Result<GameStateDocument> {
        if self.fail_queries {
            return Err(ProviderError::Simulator("scripted outage".into()).into());
        }
        Ok(self.states[self.cursor].clone())
    }

    fn execute_action(&mut self, player: Character, action: GameAction) -> Result<GameStateDocument> {
        self.log.push((player, action));
        if self.cursor + 1 < self.states.len() {
            self.cursor += 1;
        }
        Ok(self.states[self.cursor].clone())
    }

    fn reset(&mut self) -> Result<()> {
        self.resets += 1;
        self.cursor = 0;
        self.fail_queries = self.fail_after_reset;
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn dwarf(x: i32, y: i32, health: i64) -> Entity {
    let stats = PlayerStats {
        action_points: Some(4),
        health: Some(health),
        ..PlayerStats::default()
    };
    Entity::player(Character::Dwarf, Some(Position::new(x, y)), stats)
}

fn doc(phase: &str, status: Status, dwarf: Entity) -> GameStateDocument {
    GameStateDocument::new(
        Level::Number(1),
        phase,
        status,
        vec![
            dwarf,
            Entity::shrine(Character::Dwarf, Position::new(8, 8), false),
            Entity::object("monster", Position::new(2, 2)),
        ],
    )
    .unwrap()
}

fn active(x: i32, y: i32) -> GameStateDocument {
    doc("PlayerPlanning", Status::Active, dwarf(x, y, 3))
}

fn env_with(states: Vec<GameStateDocument>, config: EnvConfig) -> DiceAdventureEnv<ScriptedProvider> {
    let encoder = GridEncoder::new(ObservationConfig::default()).unwrap();
    DiceAdventureEnv::new(
        ScriptedProvider::new(states),
        Box::new(encoder),
        RewardPolicy::standard(),
        config,
    )
}

fn encode(state: &GameStateDocument) -> Vec<f32> {
    let encoder = GridEncoder::new(ObservationConfig::default()).unwrap();
    encoder
        .encode(state, Character::Dwarf, None)
        .unwrap()
        .tensor
}

// =============================================================================
// Terminal handling
// =============================================================================

/// A terminal step returns the fresh episode's observation, not the
/// terminal one.
#[test]
fn test_terminal_step_returns_reset_observation() {
    let start = active(1, 1);
    let finished = doc("PlayerPinning", Status::Done, dwarf(5, 5, 3));
    let mut env = env_with(
        vec![start.clone(), finished.clone()],
        EnvConfig::default().with_automate_players(false),
    );

    let (reset_obs, _) = env.reset().unwrap();
    let result = env.step(GameAction::Right.index()).unwrap();

    assert!(result.terminated);
    assert!(!result.truncated);
    assert!(result.info.auto_reset);

    // The step's own info describes the terminal state; the new episode's
    // info rides along.
    assert_eq!(result.info.phase, "PlayerPinning");
    assert_eq!(result.info.episode, 0);
    let fresh = result.info.reset_info.as_deref().unwrap();
    assert_eq!(fresh.phase, "PlayerPlanning");
    assert_eq!(fresh.level, Level::Number(1));
    assert_eq!(fresh.episode, 1);
    assert_eq!(fresh.step, 0);
    assert!(fresh.reset_info.is_none());

    assert_eq!(result.observation.tensor, reset_obs.tensor);
    assert_eq!(result.observation.tensor, encode(&start));
    assert_ne!(result.observation.tensor, encode(&finished));
    assert_eq!(env.provider().resets, 2);
    assert_eq!(env.phase(), EnvPhase::Ready);

    // The next episode is numbered and counted from scratch.
    let result = env.step(GameAction::Wait.index()).unwrap();
    assert_eq!(result.info.episode, 1);
    assert_eq!(result.info.step, 1);
}

/// With auto-reset off the terminal observation is returned and further
/// steps are refused until an explicit reset.
#[test]
fn test_terminal_step_without_auto_reset() {
    let finished = doc("PlayerPlanning", Status::Done, dwarf(5, 5, 3));
    let mut env = env_with(
        vec![active(1, 1), finished.clone()],
        EnvConfig::default()
            .with_automate_players(false)
            .with_auto_reset(false),
    );

    env.reset().unwrap();
    let result = env.step(GameAction::Right.index()).unwrap();
    assert!(result.terminated);
    assert!(!result.info.auto_reset);
    assert_eq!(result.observation.tensor, encode(&finished));
    assert_eq!(env.phase(), EnvPhase::Terminal);

    assert!(matches!(
        env.step(GameAction::Wait.index()),
        Err(GymError::EpisodeTerminated)
    ));

    env.reset().unwrap();
    assert_eq!(env.phase(), EnvPhase::Ready);
    assert!(env.step(GameAction::Wait.index()).is_ok());
}

/// A failed auto-reset leaves the environment needing a reset, with the
/// episode count unchanged.
#[test]
fn test_failed_auto_reset_leaves_env_uninitialized() {
    let finished = doc("PlayerPlanning", Status::Done, dwarf(5, 5, 3));
    let mut env = env_with(
        vec![active(1, 1), finished],
        EnvConfig::default().with_automate_players(false),
    );
    env.reset().unwrap();
    env.provider_mut().fail_after_reset = true;

    let err = env.step(GameAction::Right.index()).unwrap_err();
    assert!(matches!(err, GymError::StateUnavailable(_)));
    assert_eq!(env.phase(), EnvPhase::Uninitialized);
    assert!(matches!(env.step(GameAction::Wait.index()), Err(GymError::NotReset)));

    env.provider_mut().fail_after_reset = false;
    let (_, info) = env.reset().unwrap();
    assert_eq!(info.episode, 1);
    assert_eq!(env.phase(), EnvPhase::Ready);
}

/// The reward of the terminal transition is still reported.
#[test]
fn test_terminal_step_keeps_reward() {
    let finished = GameStateDocument::new(
        Level::Number(1),
        "PlayerPlanning",
        Status::Done,
        vec![
            dwarf(8, 8, 3),
            Entity::shrine(Character::Dwarf, Position::new(8, 8), true),
        ],
    )
    .unwrap();
    let mut env = env_with(
        vec![active(7, 8), finished],
        EnvConfig::default().with_automate_players(false),
    );

    env.reset().unwrap();
    let result = env.step(GameAction::Right.index()).unwrap();
    assert!(result.terminated);
    assert!((result.reward - 1.0).abs() < 1e-9);
    assert_eq!(result.info.reward.fired.as_slice(), &[RewardTerm::GoalReached]);
}

// =============================================================================
// Automated players
// =============================================================================

/// A focal submit that leaves the phase unchanged makes everyone submit.
#[test]
fn test_partial_submit_forces_others_to_submit() {
    let mut env = env_with(vec![active(1, 1)], EnvConfig::default());
    env.reset().unwrap();
    env.step(GameAction::Submit.index()).unwrap();

    assert_eq!(
        env.provider().log,
        vec![
            (Character::Dwarf, GameAction::Submit),
            (Character::Giant, GameAction::Submit),
            (Character::Human, GameAction::Submit),
        ]
    );
}

/// A focal submit that already ended the phase does not force anything.
#[test]
fn test_phase_ending_submit_does_not_force() {
    let pinning = doc("PlayerPinning", Status::Active, dwarf(1, 1, 3));
    let mut env = env_with(
        vec![active(1, 1), pinning.clone(), pinning.clone(), pinning],
        EnvConfig::default().with_seed(5),
    );
    env.reset().unwrap();
    env.step(GameAction::Submit.index()).unwrap();

    let log = &env.provider().log;
    assert_eq!(log.len(), 3);
    assert_eq!(log[1].0, Character::Giant);
    assert_eq!(log[2].0, Character::Human);
}

/// Other players act in roster order after the focal player.
#[test]
fn test_others_act_in_roster_order() {
    let encoder = GridEncoder::new(ObservationConfig::default()).unwrap();
    let human = Entity::player(
        Character::Human,
        Some(Position::new(4, 4)),
        PlayerStats::default(),
    );
    let mut state = active(1, 1);
    state.scene.push(human);
    state
        .scene
        .push(Entity::shrine(Character::Human, Position::new(0, 8), false));

    let mut env = DiceAdventureEnv::new(
        ScriptedProvider::new(vec![state]),
        Box::new(encoder),
        RewardPolicy::standard(),
        EnvConfig::default().with_player(Character::Human),
    );
    env.reset().unwrap();
    env.step(GameAction::Wait.index()).unwrap();

    let players: Vec<Character> = env.provider().log.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        players,
        vec![Character::Human, Character::Dwarf, Character::Giant]
    );
}

/// Automated players stop as soon as one of their actions ends the game.
#[test]
fn test_automation_stops_when_game_ends() {
    let finished = doc("PlayerPlanning", Status::Done, dwarf(1, 1, 3));
    let mut env = env_with(
        vec![active(1, 1), active(1, 1), finished],
        EnvConfig::default().with_auto_reset(false),
    );
    env.reset().unwrap();
    let result = env.step(GameAction::Wait.index()).unwrap();

    assert_eq!(env.provider().log.len(), 2);
    assert!(result.terminated);
}

/// A provider that keeps accepting actions after the game ends receives
/// none from the automated players once the focal action has ended it.
#[test]
fn test_no_automated_actions_after_focal_ends_game() {
    let finished = doc("PlayerPlanning", Status::Done, dwarf(1, 1, 3));
    let mut env = env_with(
        vec![active(1, 1), finished.clone(), finished],
        EnvConfig::default().with_auto_reset(false),
    );
    env.reset().unwrap();
    let result = env.step(GameAction::Submit.index()).unwrap();

    assert!(result.terminated);
    assert_eq!(env.provider().log, vec![(Character::Dwarf, GameAction::Submit)]);
}

#[test]
fn test_automation_disabled() {
    let mut env = env_with(
        vec![active(1, 1)],
        EnvConfig::default().with_automate_players(false),
    );
    env.reset().unwrap();
    env.step(GameAction::Submit.index()).unwrap();
    assert_eq!(env.provider().log, vec![(Character::Dwarf, GameAction::Submit)]);
}

/// Same seed, same automated actions.
#[test]
fn test_automated_actions_are_seeded() {
    let run = |seed| {
        let mut env = env_with(vec![active(1, 1)], EnvConfig::default().with_seed(seed));
        env.reset().unwrap();
        for _ in 0..10 {
            env.step(GameAction::Wait.index()).unwrap();
        }
        env.provider().log.clone()
    };
    assert_eq!(run(3), run(3));
    assert_ne!(run(3), run(4));
}

// =============================================================================
// Rewards and errors
// =============================================================================

/// Only the focal transition is scored.
#[test]
fn test_only_focal_transition_is_scored() {
    // The dwarf is hurt by the automated players' actions, after the
    // focal move.
    let hurt = doc("PlayerPlanning", Status::Active, dwarf(2, 1, 1));
    let mut env = env_with(
        vec![active(1, 1), active(2, 1), hurt.clone(), hurt],
        EnvConfig::default(),
    );
    env.reset().unwrap();
    let result = env.step(GameAction::Right.index()).unwrap();
    assert_eq!(result.reward, 0.0);
    assert!(result.info.reward.fired.is_empty());
}

#[test]
fn test_idle_step_penalty() {
    let mut env = env_with(
        vec![active(1, 1)],
        EnvConfig::default().with_automate_players(false),
    );
    env.reset().unwrap();
    let result = env.step(GameAction::Wait.index()).unwrap();
    assert!((result.reward + 0.1).abs() < 1e-9);
    assert_eq!(result.info.reward.fired.as_slice(), &[RewardTerm::NotMoved]);
}

#[test]
fn test_provider_fault_propagates() {
    let mut env = env_with(vec![active(1, 1)], EnvConfig::default());
    env.reset().unwrap();
    env.provider_mut().fail_queries = true;

    let err = env.step(GameAction::Wait.index()).unwrap_err();
    assert!(matches!(
        err,
        GymError::StateUnavailable(ProviderError::Simulator(_))
    ));
    assert!(env.provider().log.is_empty());
}

#[test]
fn test_missing_shrine_fails_reset() {
    let orphan = GameStateDocument::new(
        Level::Number(1),
        "PlayerPlanning",
        Status::Active,
        vec![dwarf(1, 1, 3)],
    )
    .unwrap();
    let mut env = env_with(vec![orphan], EnvConfig::default());
    assert!(matches!(env.reset(), Err(GymError::MalformedState(_))));
    assert_eq!(env.phase(), EnvPhase::Uninitialized);
}

#[test]
fn test_invalid_action_touches_nothing() {
    let mut env = env_with(vec![active(1, 1)], EnvConfig::default());
    env.reset().unwrap();
    assert!(matches!(
        env.step(GameAction::COUNT),
        Err(GymError::InvalidAction { .. })
    ));
    assert!(env.provider().log.is_empty());
}

/// The encoder keeps centring on the last known position while the focal
/// player has no coordinates.
#[test]
fn test_unpositioned_player_uses_last_known_position() {
    let mut ghost = dwarf(0, 0, 3);
    ghost.set_position(None);
    let unpositioned = doc("PlayerPlanning", Status::Active, ghost);
    let mut env = env_with(
        vec![active(1, 1), unpositioned],
        EnvConfig::default().with_automate_players(false),
    );

    env.reset().unwrap();
    let result = env.step(GameAction::Wait.index()).unwrap();

    // Window still centred on (1, 1): the monster at (2, 2) is one cell
    // right and one cell down of the centre.
    let encoder = GridEncoder::new(ObservationConfig::default()).unwrap();
    let [window, _, channels, variants] = encoder.grid_shape(Character::Dwarf);
    let radius = (window - 1) / 2;
    let monster_channel = encoder.config().channels["monster"];
    let monster_variant = encoder.config().size_variants["monster"];
    let index = (((radius + 1) * window + radius + 1) * channels + monster_channel) * variants
        + monster_variant;
    assert_eq!(result.observation.get(index), Some(1.0));

    // The unpositioned dwarf itself is not drawn.
    let grid = result.observation.len() - dice_gym::encoding::PLAYER_INFO_LEN;
    let drawn = result.observation.tensor[..grid]
        .iter()
        .filter(|&&v| v != 0.0)
        .count();
    assert_eq!(drawn, 1);
}
