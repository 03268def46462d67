//! Scene entities.
//!
//! A state document's scene is a list of loosely structured records tagged by
//! `entityType`. They are validated once at the document boundary and turned
//! into [`Entity`] values whose [`EntityKind`] carries the per-kind fields, so
//! the encoder and reward code never probe for optional keys.
//!
//! ## Kinds
//!
//! - `Dwarf` / `Giant` / `Human`: players, with [`PlayerStats`]
//! - `shrine`: a per-character goal with a `reached` flag
//! - `pin`: a coloured marker (colour in the `objectCode` suffix)
//! - `monster*` / `trap*` / `stone*`: size-variant enemies
//! - anything else: an inert object

use serde::{Deserialize, Serialize};

use super::player::Character;

/// Integer grid coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Planar Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Position) -> f64 {
        let dx = (i64::from(self.x) - i64::from(other.x)) as f64;
        let dy = (i64::from(self.y) - i64::from(other.y)) as f64;
        dx.hypot(dy)
    }

    /// True if `self` lies in the square window of half-width `radius`
    /// centred on `center` (bounds inclusive).
    #[must_use]
    pub fn within(self, center: Position, radius: u32) -> bool {
        self.x.abs_diff(center.x) <= radius && self.y.abs_diff(center.y) <= radius
    }

    /// Shift by an offset.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Pin colour. Encoded as the second character of a pin's `objectCode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinColor {
    A,
    B,
    C,
    D,
}

impl PinColor {
    /// Colour letter.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PinColor::A => 'A',
            PinColor::B => 'B',
            PinColor::C => 'C',
            PinColor::D => 'D',
        }
    }

    /// Object code used for a pin of this colour (`"PA"`, `"PB"`, ...).
    #[must_use]
    pub fn object_code(self) -> String {
        format!("P{}", self.as_char())
    }
}

/// Player-only fields.
///
/// Numeric fields may be absent on the wire (e.g. a pin cursor that has not
/// been placed); absence is preserved as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub action_points: Option<i64>,
    pub health: Option<i64>,
    pub dead: bool,
    pub pin_cursor_x: Option<i64>,
    pub pin_cursor_y: Option<i64>,
}

/// Entity category with per-kind fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player {
        character: Character,
        stats: PlayerStats,
    },
    Shrine {
        owner: Character,
        reached: bool,
    },
    Pin,
    Enemy,
    Other,
}

impl EntityKind {
    /// Classify a type tag that is neither a player nor a shrine.
    #[must_use]
    pub fn classify_object(entity_type: &str) -> Self {
        if entity_type == "pin" {
            return EntityKind::Pin;
        }
        let lower = entity_type.to_ascii_lowercase();
        if ["monster", "trap", "stone"].iter().any(|p| lower.starts_with(p)) {
            EntityKind::Enemy
        } else {
            EntityKind::Other
        }
    }
}

/// A validated scene entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Raw type tag, used for channel lookup and substring matching.
    pub entity_type: String,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub object_code: Option<String>,
    pub kind: EntityKind,
}

impl Entity {
    /// Create a player entity.
    #[must_use]
    pub fn player(character: Character, position: Option<Position>, stats: PlayerStats) -> Self {
        Self::with_kind(
            character.as_str(),
            position,
            EntityKind::Player { character, stats },
        )
    }

    /// Create a shrine owned by `owner`.
    #[must_use]
    pub fn shrine(owner: Character, position: Position, reached: bool) -> Self {
        Self::with_kind("shrine", Some(position), EntityKind::Shrine { owner, reached })
    }

    /// Create a pin of the given colour.
    #[must_use]
    pub fn pin(color: PinColor, position: Position) -> Self {
        Self::object("pin", position).with_object_code(color.object_code())
    }

    /// Create any non-player, non-shrine object; its kind is derived from
    /// the type tag.
    #[must_use]
    pub fn object(entity_type: impl Into<String>, position: Position) -> Self {
        let entity_type = entity_type.into();
        let kind = EntityKind::classify_object(&entity_type);
        Self {
            entity_type,
            x: Some(position.x),
            y: Some(position.y),
            object_code: None,
            kind,
        }
    }

    fn with_kind(entity_type: &str, position: Option<Position>, kind: EntityKind) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            x: position.map(|p| p.x),
            y: position.map(|p| p.y),
            object_code: None,
            kind,
        }
    }

    /// Set the object code.
    #[must_use]
    pub fn with_object_code(mut self, code: impl Into<String>) -> Self {
        self.object_code = Some(code.into());
        self
    }

    /// Position, if both coordinates are present.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        Some(Position::new(self.x?, self.y?))
    }

    /// Move the entity (or clear its position with `None`).
    pub fn set_position(&mut self, position: Option<Position>) {
        self.x = position.map(|p| p.x);
        self.y = position.map(|p| p.y);
    }

    /// Player stats, if this is a player.
    #[must_use]
    pub fn player_stats(&self) -> Option<&PlayerStats> {
        match &self.kind {
            EntityKind::Player { stats, .. } => Some(stats),
            _ => None,
        }
    }

    /// Mutable player stats, if this is a player.
    pub fn player_stats_mut(&mut self) -> Option<&mut PlayerStats> {
        match &mut self.kind {
            EntityKind::Player { stats, .. } => Some(stats),
            _ => None,
        }
    }

    /// Character, if this is a player.
    #[must_use]
    pub fn character(&self) -> Option<Character> {
        match self.kind {
            EntityKind::Player { character, .. } => Some(character),
            _ => None,
        }
    }

    /// Owner, if this is a shrine.
    #[must_use]
    pub fn shrine_owner(&self) -> Option<Character> {
        match self.kind {
            EntityKind::Shrine { owner, .. } => Some(owner),
            _ => None,
        }
    }

    /// `reached` flag for shrines; `false` for everything else.
    #[must_use]
    pub fn is_reached(&self) -> bool {
        matches!(self.kind, EntityKind::Shrine { reached: true, .. })
    }

    #[must_use]
    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy)
    }

    #[must_use]
    pub fn is_pin(&self) -> bool {
        matches!(self.kind, EntityKind::Pin)
    }

    /// Type tag up to the first `_` (`"monster_small"` → `"monster"`).
    #[must_use]
    pub fn base_type(&self) -> &str {
        self.entity_type
            .split('_')
            .next()
            .unwrap_or(&self.entity_type)
    }

    /// Pin colour code: the second character of the object code.
    #[must_use]
    pub fn pin_code(&self) -> Option<char> {
        self.object_code.as_deref()?.chars().nth(1)
    }

    /// Case-insensitive substring match on the type tag.
    #[must_use]
    pub fn type_contains(&self, needle: &str) -> bool {
        self.entity_type
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }
}
