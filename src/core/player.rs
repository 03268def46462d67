//! Character identification and per-character data storage.
//!
//! ## Character
//!
//! The game has a fixed roster of three player archetypes. Each appears in
//! state documents as an entity whose `entityType` is the character name.
//!
//! ## CharacterMap
//!
//! Per-character storage backed by a fixed array for O(1) access.
//! Supports iteration and indexing by `Character`.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Player archetype.
///
/// Declaration order is the fixed iteration order used whenever the
/// environment drives every character in turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Character {
    Dwarf,
    Giant,
    Human,
}

impl Character {
    /// All characters in roster order.
    pub const ALL: [Character; 3] = [Character::Dwarf, Character::Giant, Character::Human];

    /// Number of characters in the roster.
    pub const COUNT: usize = Self::ALL.len();

    /// Index of this character in roster order (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Character::Dwarf => 0,
            Character::Giant => 1,
            Character::Human => 2,
        }
    }

    /// The entity type tag used for this character in state documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Character::Dwarf => "Dwarf",
            Character::Giant => "Giant",
            Character::Human => "Human",
        }
    }

    /// Default sight radius: Dwarf 2, Giant 3, Human 4.
    #[must_use]
    pub const fn default_sight_radius(self) -> u32 {
        match self {
            Character::Dwarf => 2,
            Character::Giant => 3,
            Character::Human => 4,
        }
    }

    /// Resolve an entity type tag to a character (exact match).
    #[must_use]
    pub fn from_entity_type(entity_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == entity_type)
    }

    /// Iterate over every character except `self`, in roster order.
    pub fn others(self) -> impl Iterator<Item = Character> {
        Self::ALL.into_iter().filter(move |&c| c != self)
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Character {
    type Err = String;

    /// Case-insensitive parse, so CLI and config input may use `dwarf`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown character `{s}`"))
    }
}

/// Per-character data storage with O(1) access.
///
/// Always holds exactly one entry per character. Serializes as a JSON object
/// keyed by character name.
///
/// ## Example
///
/// ```
/// use dice_gym::core::{Character, CharacterMap};
///
/// let mut radii: CharacterMap<u32> = CharacterMap::with_value(3);
/// radii[Character::Giant] = 4;
///
/// assert_eq!(radii[Character::Dwarf], 3);
/// assert_eq!(radii[Character::Giant], 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CharacterMap<T> {
    data: [T; Character::COUNT],
}

impl<T> CharacterMap<T> {
    /// Create a new map with values from a factory function.
    pub fn new(factory: impl Fn(Character) -> T) -> Self {
        Self {
            data: Character::ALL.map(factory),
        }
    }

    /// Create a new map with all entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Create a new map with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Get a reference to a character's data.
    #[must_use]
    pub fn get(&self, character: Character) -> &T {
        &self.data[character.index()]
    }

    /// Get a mutable reference to a character's data.
    pub fn get_mut(&mut self, character: Character) -> &mut T {
        &mut self.data[character.index()]
    }

    /// Iterate over (Character, &T) pairs in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (Character, &T)> {
        Character::ALL.into_iter().zip(self.data.iter())
    }

    /// Iterate over values in roster order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<Character> for CharacterMap<T> {
    type Output = T;

    fn index(&self, character: Character) -> &Self::Output {
        self.get(character)
    }
}

impl<T> IndexMut<Character> for CharacterMap<T> {
    fn index_mut(&mut self, character: Character) -> &mut Self::Output {
        self.get_mut(character)
    }
}

impl<T: Serialize> Serialize for CharacterMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for CharacterMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries: FxHashMap<Character, T> = FxHashMap::deserialize(deserializer)?;
        let mut take = |c: Character| {
            entries
                .remove(&c)
                .ok_or_else(|| D::Error::custom(format!("missing entry for {c}")))
        };
        Ok(Self {
            data: [
                take(Character::Dwarf)?,
                take(Character::Giant)?,
                take(Character::Human)?,
            ],
        })
    }
}
