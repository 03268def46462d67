//! In-process provider backed by the grid simulator.

use crate::core::{Character, GameAction, GameRng};
use crate::error::Result;
use crate::games::grid::{GridGame, GridGameBuilder};

use super::document::GameStateDocument;
use super::provider::{StateProvider, Visibility};

/// Provider that runs the game locally.
pub struct LocalProvider {
    builder: GridGameBuilder,
    visibility: Visibility,
    rng: GameRng,
    game: GridGame,
}

impl LocalProvider {
    /// Create a provider; the first game is built from the first fork of
    /// `seed`.
    pub fn new(builder: GridGameBuilder, seed: u64) -> Result<Self> {
        let mut rng = GameRng::new(seed);
        let game = builder.clone().build(rng.fork().seed())?;
        Ok(Self {
            builder,
            visibility: Visibility::default(),
            rng,
            game,
        })
    }

    /// Visibility of the state returned by `execute_action`.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// The running game.
    #[must_use]
    pub fn game(&self) -> &GridGame {
        &self.game
    }

    /// Mutable access, for scripting scenarios.
    pub fn game_mut(&mut self) -> &mut GridGame {
        &mut self.game
    }
}

impl StateProvider for LocalProvider {
    fn get_state(&mut self, player: Character, visibility: Visibility) -> Result<GameStateDocument> {
        Ok(self.game.state(player, visibility))
    }

    fn execute_action(&mut self, player: Character, action: GameAction) -> Result<GameStateDocument> {
        self.game.apply(player, action)?;
        Ok(self.game.state(player, self.visibility))
    }

    fn reset(&mut self) -> Result<()> {
        let seed = self.rng.fork().seed();
        tracing::debug!(seed, "rebuilding local game");
        self.game = self.builder.clone().build(seed)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "local"
    }
}
