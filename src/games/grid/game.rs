//! Grid game implementation.

use std::fmt;

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Character, CharacterMap, Entity, GameAction, GameRng, PinColor, PlayerStats, Position};
use crate::encoding::MAX_SIGHT_RADIUS;
use crate::error::{GymError, ProviderError, Result};
use crate::state::{GameStateDocument, Level, Status, Visibility};

/// Entity type of the level exit.
pub const TOWER: &str = "tower";
/// Entity type of wandering enemies.
pub const MONSTER: &str = "monster";
/// Entity type of static enemies.
pub const TRAP: &str = "trap";
/// Entity type of impassable blocks.
pub const STONE: &str = "stone";

const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];

/// Turn phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    PlayerPlanning,
    PlayerPinning,
}

impl Phase {
    /// Wire name, as reported in `currentPhase`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::PlayerPlanning => "PlayerPlanning",
            Phase::PlayerPinning => "PlayerPinning",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for creating a [`GridGame`].
///
/// Also the `game` section of the configuration file, so every field has a
/// default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridGameBuilder {
    pub width: i32,
    pub height: i32,
    pub max_levels: i64,
    pub action_points: i64,
    pub starting_health: i64,
    pub monsters: usize,
    pub traps: usize,
    pub stones: usize,
    /// Shared with the observation settings, so not read from the `game`
    /// section.
    #[serde(skip, default = "default_sight_radii")]
    pub sight_radii: CharacterMap<u32>,
}

fn default_sight_radii() -> CharacterMap<u32> {
    CharacterMap::new(Character::default_sight_radius)
}

impl Default for GridGameBuilder {
    fn default() -> Self {
        Self {
            width: 9,
            height: 9,
            max_levels: 3,
            action_points: 4,
            starting_health: 3,
            monsters: 2,
            traps: 2,
            stones: 3,
            sight_radii: default_sight_radii(),
        }
    }
}

impl GridGameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn width(mut self, width: i32) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn max_levels(mut self, levels: i64) -> Self {
        self.max_levels = levels;
        self
    }

    #[must_use]
    pub fn action_points(mut self, points: i64) -> Self {
        self.action_points = points;
        self
    }

    #[must_use]
    pub fn starting_health(mut self, health: i64) -> Self {
        self.starting_health = health;
        self
    }

    #[must_use]
    pub fn monsters(mut self, count: usize) -> Self {
        self.monsters = count;
        self
    }

    #[must_use]
    pub fn traps(mut self, count: usize) -> Self {
        self.traps = count;
        self
    }

    #[must_use]
    pub fn stones(mut self, count: usize) -> Self {
        self.stones = count;
        self
    }

    #[must_use]
    pub fn sight_radii(mut self, radii: CharacterMap<u32>) -> Self {
        self.sight_radii = radii;
        self
    }

    /// Check that a layout fits on the board.
    pub fn validate(&self) -> Result<()> {
        if self.width < 3 || self.height < 3 {
            return Err(GymError::Config(format!(
                "board must be at least 3x3, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_levels < 1 {
            return Err(GymError::Config("max_levels must be at least 1".into()));
        }
        if self.action_points < 1 || self.starting_health < 1 {
            return Err(GymError::Config(
                "action_points and starting_health must be positive".into(),
            ));
        }
        if self.sight_radii.values().any(|&r| r > MAX_SIGHT_RADIUS) {
            return Err(GymError::Config(format!(
                "sight radii must not exceed {MAX_SIGHT_RADIUS}"
            )));
        }
        let cells = (self.width as usize) * (self.height as usize);
        let needed = self.required_cells();
        if needed > cells {
            return Err(GymError::Config(format!(
                "layout needs {needed} cells but the board has {cells}"
            )));
        }
        Ok(())
    }

    /// Players, shrines, the tower and every obstacle each take one cell.
    fn required_cells(&self) -> usize {
        2 * Character::COUNT + 1 + self.monsters + self.traps + self.stones
    }

    /// Build the game and generate the first level.
    pub fn build(self, seed: u64) -> Result<GridGame> {
        self.validate()?;
        let rng = GameRng::new(seed);
        let starting_health = self.starting_health;
        let mut game = GridGame {
            layout_rng: rng.for_context("layout"),
            monster_rng: rng.for_context("monsters"),
            config: self,
            level: 1,
            phase: Phase::PlayerPlanning,
            status: Status::Active,
            scene: Character::ALL
                .into_iter()
                .map(|c| {
                    let stats = PlayerStats {
                        health: Some(starting_health),
                        ..PlayerStats::default()
                    };
                    Entity::player(c, None, stats)
                })
                .collect(),
            submitted: CharacterMap::with_value(false),
            history: CharacterMap::with_default(),
            pins: CharacterMap::with_value(None),
            seen: CharacterMap::with_default(),
        };
        game.generate_layout();
        Ok(game)
    }
}

/// The running game.
///
/// The first [`Character::COUNT`] scene entries are the players in roster
/// order; everything after them is a board object.
#[derive(Clone, Debug)]
pub struct GridGame {
    config: GridGameBuilder,
    layout_rng: GameRng,
    monster_rng: GameRng,
    level: i64,
    phase: Phase,
    status: Status,
    scene: Vector<Entity>,
    submitted: CharacterMap<bool>,
    /// Positions before each move this planning phase, for undo.
    history: CharacterMap<SmallVec<[Position; 8]>>,
    pins: CharacterMap<Option<(PinColor, Position)>>,
    seen: CharacterMap<FxHashSet<Position>>,
}

impl GridGame {
    #[must_use]
    pub fn config(&self) -> &GridGameBuilder {
        &self.config
    }

    #[must_use]
    pub fn level(&self) -> i64 {
        self.level
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.status == Status::Done
    }

    /// Players followed by board objects. Pins are not included.
    #[must_use]
    pub fn scene(&self) -> &Vector<Entity> {
        &self.scene
    }

    /// A character's player entity.
    #[must_use]
    pub fn player(&self, character: Character) -> &Entity {
        &self.scene[character.index()]
    }

    /// A character's pin, if placed.
    #[must_use]
    pub fn pin_of(&self, character: Character) -> Option<(PinColor, Position)> {
        self.pins[character]
    }

    #[must_use]
    pub fn has_submitted(&self, character: Character) -> bool {
        self.submitted[character]
    }

    #[must_use]
    pub fn is_dead(&self, character: Character) -> bool {
        self.player(character).player_stats().map_or(true, |s| s.dead)
    }

    /// Move a player directly, for scripted scenarios.
    pub fn place_player(&mut self, character: Character, position: Position) {
        self.scene[character.index()].set_position(Some(position));
        self.refresh_sight();
    }

    /// Replace every board object, for scripted scenarios.
    pub fn set_objects(&mut self, objects: impl IntoIterator<Item = Entity>) {
        self.scene.truncate(Character::COUNT);
        self.scene.extend(objects);
        self.refresh_sight();
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Apply one action for one player.
    ///
    /// Actions from dead players, from players who already submitted this
    /// phase, and actions that do not apply to the current phase are ignored.
    pub fn apply(&mut self, player: Character, action: GameAction) -> std::result::Result<(), ProviderError> {
        if self.is_over() {
            return Err(ProviderError::Simulator(format!(
                "game is over; `{action}` from {player} rejected"
            )));
        }
        if self.is_dead(player) || self.submitted[player] {
            return Ok(());
        }

        match action {
            GameAction::Submit => self.submit(player),
            GameAction::Wait => {}
            GameAction::Undo => match self.phase {
                Phase::PlayerPlanning => self.undo_move(player),
                Phase::PlayerPinning => self.pins[player] = None,
            },
            _ => {
                if let Some((dx, dy)) = action.direction() {
                    match self.phase {
                        Phase::PlayerPlanning => self.try_move(player, dx, dy),
                        Phase::PlayerPinning => self.move_cursor(player, dx, dy),
                    }
                } else if let Some(color) = action.ping_color() {
                    if self.phase == Phase::PlayerPinning {
                        self.place_pin(player, color);
                    }
                }
            }
        }

        self.refresh_sight();
        Ok(())
    }

    fn try_move(&mut self, player: Character, dx: i32, dy: i32) {
        let entity = self.player(player);
        let Some(from) = entity.position() else {
            return;
        };
        let points = entity
            .player_stats()
            .and_then(|s| s.action_points)
            .unwrap_or(0);
        if points <= 0 {
            return;
        }
        let to = from.offset(dx, dy);
        if !self.in_bounds(to) || self.object_at(to, |e| e.entity_type == STONE).is_some() {
            return;
        }

        self.history[player].push(from);
        let entity = &mut self.scene[player.index()];
        entity.set_position(Some(to));
        if let Some(stats) = entity.player_stats_mut() {
            stats.action_points = Some(points - 1);
        }
    }

    fn undo_move(&mut self, player: Character) {
        let Some(previous) = self.history[player].pop() else {
            return;
        };
        let entity = &mut self.scene[player.index()];
        entity.set_position(Some(previous));
        if let Some(stats) = entity.player_stats_mut() {
            stats.action_points = Some(stats.action_points.unwrap_or(0) + 1);
        }
    }

    fn move_cursor(&mut self, player: Character, dx: i32, dy: i32) {
        let max_x = i64::from(self.config.width - 1);
        let max_y = i64::from(self.config.height - 1);
        if let Some(stats) = self.scene[player.index()].player_stats_mut() {
            if let (Some(x), Some(y)) = (stats.pin_cursor_x, stats.pin_cursor_y) {
                stats.pin_cursor_x = Some((x + i64::from(dx)).clamp(0, max_x));
                stats.pin_cursor_y = Some((y + i64::from(dy)).clamp(0, max_y));
            }
        }
    }

    fn place_pin(&mut self, player: Character, color: PinColor) {
        let cursor = self
            .player(player)
            .player_stats()
            .and_then(|s| Some((s.pin_cursor_x?, s.pin_cursor_y?)));
        if let Some((x, y)) = cursor {
            // Cursor is clamped to the board, so it always fits in i32.
            let position = Position::new(x as i32, y as i32);
            self.pins[player] = Some((color, position));
        }
    }

    fn submit(&mut self, player: Character) {
        self.submitted[player] = true;
        let everyone_done = Character::ALL
            .into_iter()
            .all(|c| self.submitted[c] || self.is_dead(c));
        if everyone_done {
            self.end_phase();
        }
    }

    // =========================================================================
    // Phase transitions
    // =========================================================================

    fn end_phase(&mut self) {
        self.submitted = CharacterMap::with_value(false);
        match self.phase {
            Phase::PlayerPlanning => {
                let new_level = self.resolve_planning();
                if self.is_over() || new_level {
                    self.begin_planning();
                } else {
                    self.begin_pinning();
                }
            }
            Phase::PlayerPinning => self.begin_planning(),
        }
    }

    fn begin_planning(&mut self) {
        self.phase = Phase::PlayerPlanning;
        for character in Character::ALL {
            if let Some(stats) = self.scene[character.index()].player_stats_mut() {
                stats.pin_cursor_x = None;
                stats.pin_cursor_y = None;
            }
        }
    }

    fn begin_pinning(&mut self) {
        self.phase = Phase::PlayerPinning;
        self.pins = CharacterMap::with_value(None);
        for character in Character::ALL {
            let entity = &mut self.scene[character.index()];
            let position = entity.position();
            if let Some(stats) = entity.player_stats_mut() {
                stats.pin_cursor_x = position.map(|p| i64::from(p.x));
                stats.pin_cursor_y = position.map(|p| i64::from(p.y));
            }
        }
    }

    /// Resolve the end of a planning phase. Returns true if a new level
    /// started.
    fn resolve_planning(&mut self) -> bool {
        self.history = CharacterMap::with_default();

        // Players fight what they stand on and claim their shrine.
        for character in Character::ALL {
            if self.is_dead(character) {
                continue;
            }
            let Some(position) = self.player(character).position() else {
                continue;
            };
            if let Some(index) = self.object_at(position, |e| {
                e.entity_type == MONSTER || e.entity_type == TRAP
            }) {
                self.scene.remove(index);
                self.damage(character, 1);
            }
            if let Some(index) =
                self.object_at(position, |e| e.shrine_owner() == Some(character))
            {
                self.scene[index] = Entity::shrine(character, position, true);
            }
        }

        self.move_monsters();

        for character in Character::ALL {
            let entity = &mut self.scene[character.index()];
            let Some(stats) = entity.player_stats_mut() else {
                continue;
            };
            if stats.dead {
                continue;
            }
            if stats.health.unwrap_or(0) <= 0 {
                stats.dead = true;
                stats.action_points = Some(0);
                entity.set_position(None);
            } else {
                stats.action_points = Some(self.config.action_points);
            }
        }

        if Character::ALL.into_iter().all(|c| self.is_dead(c)) {
            self.status = Status::Done;
            return false;
        }

        if self.level_complete() {
            self.level += 1;
            if self.level > self.config.max_levels {
                self.status = Status::Done;
                return false;
            }
            self.generate_layout();
            return true;
        }
        false
    }

    fn move_monsters(&mut self) {
        let monsters: Vec<usize> = self
            .scene
            .iter()
            .enumerate()
            .filter(|(_, e)| e.entity_type == MONSTER)
            .map(|(i, _)| i)
            .collect();

        // Highest index first so removals never shift a pending monster.
        for index in monsters.into_iter().rev() {
            let Some(from) = self.scene[index].position() else {
                continue;
            };
            let free: SmallVec<[Position; 4]> = ORTHOGONAL
                .into_iter()
                .map(|(dx, dy)| from.offset(dx, dy))
                .filter(|&p| self.in_bounds(p) && self.object_at(p, |_| true).is_none())
                .collect();
            let Some(&to) = self.monster_rng.choose(&free) else {
                continue;
            };

            let victim = Character::ALL
                .into_iter()
                .find(|&c| !self.is_dead(c) && self.player(c).position() == Some(to));
            match victim {
                Some(character) => {
                    self.damage(character, 1);
                    self.scene.remove(index);
                }
                None => self.scene[index].set_position(Some(to)),
            }
        }
    }

    fn level_complete(&self) -> bool {
        let shrines_reached = Character::ALL.into_iter().all(|c| {
            self.scene
                .iter()
                .any(|e| e.shrine_owner() == Some(c) && e.is_reached())
        });
        if !shrines_reached {
            return false;
        }
        let Some(tower) = self
            .scene
            .iter()
            .find(|e| e.entity_type == TOWER)
            .and_then(Entity::position)
        else {
            return false;
        };
        Character::ALL
            .into_iter()
            .filter(|&c| !self.is_dead(c))
            .all(|c| self.player(c).position() == Some(tower))
    }

    fn damage(&mut self, character: Character, amount: i64) {
        if let Some(stats) = self.scene[character.index()].player_stats_mut() {
            stats.health = Some(stats.health.unwrap_or(0) - amount);
        }
    }

    // =========================================================================
    // Board
    // =========================================================================

    fn in_bounds(&self, position: Position) -> bool {
        (0..self.config.width).contains(&position.x) && (0..self.config.height).contains(&position.y)
    }

    /// Index of the first board object at `position` matching `pred`.
    fn object_at(&self, position: Position, pred: impl Fn(&Entity) -> bool) -> Option<usize> {
        self.scene
            .iter()
            .enumerate()
            .skip(Character::COUNT)
            .find(|(_, e)| e.position() == Some(position) && pred(e))
            .map(|(i, _)| i)
    }

    /// Lay out a fresh level. Living players keep their health; dead
    /// players stay off the board.
    fn generate_layout(&mut self) {
        let mut cells: Vec<Position> = (0..self.config.width)
            .flat_map(|x| (0..self.config.height).map(move |y| Position::new(x, y)))
            .collect();
        self.layout_rng.shuffle(&mut cells);
        let mut cells = cells.into_iter();
        let mut next_cell = move || cells.next().unwrap_or_default();

        for character in Character::ALL {
            let position = next_cell();
            let entity = &mut self.scene[character.index()];
            let Some(stats) = entity.player_stats_mut() else {
                continue;
            };
            if stats.dead {
                continue;
            }
            stats.action_points = Some(self.config.action_points);
            stats.pin_cursor_x = None;
            stats.pin_cursor_y = None;
            entity.set_position(Some(position));
        }

        self.scene.truncate(Character::COUNT);
        for character in Character::ALL {
            self.scene
                .push_back(Entity::shrine(character, next_cell(), false));
        }
        self.scene.push_back(Entity::object(TOWER, next_cell()));
        for (kind, count) in [
            (STONE, self.config.stones),
            (MONSTER, self.config.monsters),
            (TRAP, self.config.traps),
        ] {
            for _ in 0..count {
                self.scene.push_back(Entity::object(kind, next_cell()));
            }
        }

        self.phase = Phase::PlayerPlanning;
        self.submitted = CharacterMap::with_value(false);
        self.history = CharacterMap::with_default();
        self.pins = CharacterMap::with_value(None);
        self.seen = CharacterMap::with_default();
        self.refresh_sight();
    }

    fn refresh_sight(&mut self) {
        for character in Character::ALL {
            let Some(center) = self.player(character).position() else {
                continue;
            };
            let radius = self.config.sight_radii[character] as i32;
            let (width, height) = (self.config.width, self.config.height);
            let seen = &mut self.seen[character];
            for x in center.x.saturating_sub(radius).max(0)..=center.x.saturating_add(radius).min(width - 1) {
                for y in center.y.saturating_sub(radius).max(0)..=center.y.saturating_add(radius).min(height - 1) {
                    seen.insert(Position::new(x, y));
                }
            }
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// The game as `viewer` sees it.
    #[must_use]
    pub fn state(&self, viewer: Character, visibility: Visibility) -> GameStateDocument {
        let center = self.player(viewer).position();
        let radius = self.config.sight_radii[viewer];
        let seen = &self.seen[viewer];

        let pins = self
            .pins
            .values()
            .flatten()
            .map(|&(color, position)| Entity::pin(color, position));

        let scene = self
            .scene
            .iter()
            .cloned()
            .chain(pins)
            .filter(|e| match visibility {
                Visibility::Full => true,
                Visibility::Player | Visibility::Fow => {
                    if e.character() == Some(viewer) || e.shrine_owner() == Some(viewer) {
                        return true;
                    }
                    let Some(position) = e.position() else {
                        return false;
                    };
                    let in_sight = center.is_some_and(|c| position.within(c, radius));
                    in_sight
                        || (visibility == Visibility::Fow && is_static(e) && seen.contains(&position))
                }
            })
            .collect();

        GameStateDocument {
            level: Level::Number(self.level),
            phase: self.phase.as_str().to_string(),
            status: self.status,
            scene,
        }
    }
}

/// Objects that never move once a level is laid out.
fn is_static(entity: &Entity) -> bool {
    entity.shrine_owner().is_some()
        || matches!(entity.entity_type.as_str(), TOWER | STONE | TRAP)
}
