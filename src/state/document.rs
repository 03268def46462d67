//! Game state documents.
//!
//! Providers hand back a fresh [`GameStateDocument`] on every query. On the
//! wire it is JSON shaped like:
//!
//! ```json
//! {
//!   "status": "Active",
//!   "content": {
//!     "gameData": { "level": 1, "currentPhase": "PlayerPlanning" },
//!     "scene": [ { "entityType": "Dwarf", "x": 2, "y": 3, "health": 3 } ]
//!   }
//! }
//! ```
//!
//! Parsing validates per-kind fields once (see [`crate::core::entity`]) and
//! enforces that each character has at most one player entity and at most
//! one shrine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Character, Entity, EntityKind, PlayerStats};
use crate::error::{GymError, Result};

/// Level ordinal. Servers send either a number or a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Level {
    Number(i64),
    Name(String),
}

impl Default for Level {
    fn default() -> Self {
        Level::Number(1)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Number(n) => write!(f, "{n}"),
            Level::Name(s) => f.write_str(s),
        }
    }
}

/// Game lifecycle flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    /// Terminal.
    Done,
}

impl Status {
    /// `"Done"` is terminal; every other wire value is active.
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        if status == "Done" {
            Status::Done
        } else {
            Status::Active
        }
    }
}

/// One snapshot of the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument", into = "RawDocument")]
pub struct GameStateDocument {
    pub level: Level,
    pub phase: String,
    pub status: Status,
    pub scene: Vec<Entity>,
}

impl GameStateDocument {
    /// Create a document, validating the scene invariants.
    pub fn new(level: Level, phase: impl Into<String>, status: Status, scene: Vec<Entity>) -> Result<Self> {
        check_unique_roles(&scene)?;
        Ok(Self {
            level,
            phase: phase.into(),
            status,
            scene,
        })
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GymError::malformed(e.to_string()))
    }

    /// Parse an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GymError::malformed(e.to_string()))
    }

    /// Render back to the wire format.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(RawDocument::from(self.clone())).unwrap_or(serde_json::Value::Null)
    }

    /// True when the game has ended.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    /// First entity with exactly this type tag.
    #[must_use]
    pub fn find_by_type(&self, entity_type: &str) -> Option<&Entity> {
        self.scene.iter().find(|e| e.entity_type == entity_type)
    }

    /// First entity whose type tag equals `name`, ignoring case.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.scene
            .iter()
            .find(|e| e.entity_type.eq_ignore_ascii_case(name))
    }

    /// The player entity for a character.
    #[must_use]
    pub fn player(&self, character: Character) -> Option<&Entity> {
        self.scene.iter().find(|e| e.character() == Some(character))
    }

    /// The shrine owned by a character.
    #[must_use]
    pub fn shrine_of(&self, character: Character) -> Option<&Entity> {
        self.scene
            .iter()
            .find(|e| e.shrine_owner() == Some(character))
    }

    /// Locate a character's player entity and shrine in one pass, stopping
    /// as soon as both are found.
    pub fn player_and_shrine(&self, character: Character) -> Result<(&Entity, &Entity)> {
        let mut player = None;
        let mut shrine = None;
        for entity in &self.scene {
            if player.is_some() && shrine.is_some() {
                break;
            }
            if entity.character() == Some(character) {
                player = Some(entity);
            } else if entity.shrine_owner() == Some(character) {
                shrine = Some(entity);
            }
        }
        match (player, shrine) {
            (Some(p), Some(s)) => Ok((p, s)),
            (None, _) => Err(GymError::malformed(format!("no `{character}` entity in scene"))),
            (_, None) => Err(GymError::malformed(format!("no shrine for `{character}` in scene"))),
        }
    }

    /// Player entity for a character, or a malformed-state error.
    pub fn require_player(&self, character: Character) -> Result<&Entity> {
        self.player(character)
            .ok_or_else(|| GymError::malformed(format!("no `{character}` entity in scene")))
    }

    /// Shrine for a character, or a malformed-state error.
    pub fn require_shrine(&self, character: Character) -> Result<&Entity> {
        self.shrine_of(character)
            .ok_or_else(|| GymError::malformed(format!("no shrine for `{character}` in scene")))
    }

    /// Number of entities whose type contains `needle` (case-insensitive).
    #[must_use]
    pub fn count_containing(&self, needle: &str) -> usize {
        self.scene.iter().filter(|e| e.type_contains(needle)).count()
    }
}

fn check_unique_roles(scene: &[Entity]) -> Result<()> {
    let mut players = [false; Character::COUNT];
    let mut shrines = [false; Character::COUNT];
    for entity in scene {
        let (seen, role, character) = match entity.kind {
            EntityKind::Player { character, .. } => (&mut players, "player", character),
            EntityKind::Shrine { owner, .. } => (&mut shrines, "shrine", owner),
            _ => continue,
        };
        if std::mem::replace(&mut seen[character.index()], true) {
            return Err(GymError::malformed(format!(
                "duplicate {role} entity for `{character}`"
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawDocument {
    #[serde(default)]
    status: String,
    content: RawContent,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContent {
    game_data: RawGameData,
    #[serde(default)]
    scene: Vec<RawEntity>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGameData {
    #[serde(default)]
    level: Level,
    #[serde(default)]
    current_phase: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntity {
    entity_type: String,
    #[serde(default)]
    x: Option<i32>,
    #[serde(default)]
    y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    health: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dead: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pin_cursor_x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pin_cursor_y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    character: Option<String>,
}

impl TryFrom<RawEntity> for Entity {
    type Error = GymError;

    fn try_from(raw: RawEntity) -> Result<Self> {
        let kind = if let Some(character) = Character::from_entity_type(&raw.entity_type) {
            EntityKind::Player {
                character,
                stats: PlayerStats {
                    action_points: raw.action_points,
                    health: raw.health,
                    dead: raw.dead.unwrap_or(false),
                    pin_cursor_x: raw.pin_cursor_x,
                    pin_cursor_y: raw.pin_cursor_y,
                },
            }
        } else if raw.entity_type == "shrine" {
            let owner = raw
                .character
                .as_deref()
                .and_then(Character::from_entity_type)
                .ok_or_else(|| {
                    GymError::malformed(format!(
                        "shrine has missing or unknown owner {:?}",
                        raw.character
                    ))
                })?;
            EntityKind::Shrine {
                owner,
                reached: raw.reached.unwrap_or(false),
            }
        } else {
            EntityKind::classify_object(&raw.entity_type)
        };

        Ok(Entity {
            entity_type: raw.entity_type,
            x: raw.x,
            y: raw.y,
            object_code: raw.object_code,
            kind,
        })
    }
}

impl From<Entity> for RawEntity {
    fn from(entity: Entity) -> Self {
        let mut raw = RawEntity {
            entity_type: entity.entity_type,
            x: entity.x,
            y: entity.y,
            object_code: entity.object_code,
            ..RawEntity::default()
        };
        match entity.kind {
            EntityKind::Player { stats, .. } => {
                raw.action_points = stats.action_points;
                raw.health = stats.health;
                raw.dead = Some(stats.dead);
                raw.pin_cursor_x = stats.pin_cursor_x;
                raw.pin_cursor_y = stats.pin_cursor_y;
            }
            EntityKind::Shrine { owner, reached } => {
                raw.character = Some(owner.as_str().to_string());
                raw.reached = Some(reached);
            }
            EntityKind::Pin | EntityKind::Enemy | EntityKind::Other => {}
        }
        raw
    }
}

impl TryFrom<RawDocument> for GameStateDocument {
    type Error = GymError;

    fn try_from(raw: RawDocument) -> Result<Self> {
        let scene = raw
            .content
            .scene
            .into_iter()
            .map(Entity::try_from)
            .collect::<Result<Vec<_>>>()?;
        GameStateDocument::new(
            raw.content.game_data.level,
            raw.content.game_data.current_phase,
            Status::from_wire(&raw.status),
            scene,
        )
    }
}

impl From<GameStateDocument> for RawDocument {
    fn from(doc: GameStateDocument) -> Self {
        RawDocument {
            status: match doc.status {
                Status::Active => "Active".to_string(),
                Status::Done => "Done".to_string(),
            },
            content: RawContent {
                game_data: RawGameData {
                    level: doc.level,
                    current_phase: doc.phase,
                },
                scene: doc.scene.into_iter().map(RawEntity::from).collect(),
            },
        }
    }
}
