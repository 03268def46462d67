//! Observation configuration.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::core::{Character, CharacterMap};
use crate::error::{GymError, Result};

/// Largest accepted sight radius.
pub const MAX_SIGHT_RADIUS: u32 = 64;

/// Tracked channels, variant mappings and sight radii.
///
/// Defaults track the three characters, shrines, the tower, pins and the
/// three enemy kinds, each in its own channel, with four variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationConfig {
    /// Half-width of each character's observation window.
    pub sight_radii: CharacterMap<u32>,
    /// Entity type → channel index.
    pub channels: FxHashMap<String, usize>,
    /// Size of the fourth tensor dimension.
    pub variant_count: usize,
    /// Pin colour letter → variant.
    pub pin_variants: FxHashMap<String, usize>,
    /// Enemy base type (text before the first `_`) → variant.
    pub size_variants: FxHashMap<String, usize>,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        let channels = [
            "Dwarf", "Giant", "Human", "shrine", "tower", "pin", "monster", "trap", "stone",
        ]
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), i))
        .collect();
        let pin_variants = ["A", "B", "C", "D"]
            .into_iter()
            .enumerate()
            .map(|(i, code)| (code.to_string(), i))
            .collect();
        let size_variants = [("monster", 1), ("trap", 2), ("stone", 3)]
            .into_iter()
            .map(|(name, v)| (name.to_string(), v))
            .collect();

        Self {
            sight_radii: CharacterMap::new(Character::default_sight_radius),
            channels,
            variant_count: 4,
            pin_variants,
            size_variants,
        }
    }
}

impl ObservationConfig {
    /// An empty configuration: no channels, no variant mappings.
    #[must_use]
    pub fn empty(variant_count: usize) -> Self {
        Self {
            channels: FxHashMap::default(),
            variant_count,
            pin_variants: FxHashMap::default(),
            size_variants: FxHashMap::default(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sight_radius(mut self, character: Character, radius: u32) -> Self {
        self.sight_radii[character] = radius;
        self
    }

    #[must_use]
    pub fn with_channel(mut self, entity_type: impl Into<String>, index: usize) -> Self {
        self.channels.insert(entity_type.into(), index);
        self
    }

    #[must_use]
    pub fn with_variant_count(mut self, count: usize) -> Self {
        self.variant_count = count;
        self
    }

    #[must_use]
    pub fn with_pin_variant(mut self, color: impl Into<String>, variant: usize) -> Self {
        self.pin_variants.insert(color.into(), variant);
        self
    }

    #[must_use]
    pub fn with_size_variant(mut self, base_type: impl Into<String>, variant: usize) -> Self {
        self.size_variants.insert(base_type.into(), variant);
        self
    }

    /// Number of distinct channel indices.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.values().collect::<FxHashSet<_>>().len()
    }

    /// Sight radius for a character.
    #[must_use]
    pub fn sight_radius(&self, character: Character) -> u32 {
        self.sight_radii[character]
    }

    /// Reject configurations that cannot produce a well-formed tensor.
    pub fn validate(&self) -> Result<()> {
        if self.variant_count == 0 {
            return Err(GymError::Config("variant_count must be at least 1".into()));
        }
        if let Some((character, radius)) = self.sight_radii.iter().find(|&(_, &r)| r > MAX_SIGHT_RADIUS) {
            return Err(GymError::Config(format!(
                "sight radius for `{character}` is {radius}, above the maximum of {MAX_SIGHT_RADIUS}"
            )));
        }
        let count = self.channel_count();
        if let Some((name, &index)) = self.channels.iter().find(|(_, index)| **index >= count) {
            return Err(GymError::Config(format!(
                "channel indices must be contiguous from 0; `{name}` uses {index} but only {count} distinct channels exist"
            )));
        }
        Ok(())
    }
}
