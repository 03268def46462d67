//! Observation encoding.
//!
//! Projects a state document onto an egocentric grid around the focal player
//! and appends a short vector of the player's own stats.

use crate::core::{Character, Entity, Position};
use crate::error::{GymError, Result};
use crate::state::GameStateDocument;

use super::config::ObservationConfig;
use super::tensor::EncodedState;

/// Length of the player-info vector appended after the grid: action points,
/// health, dead flag, shrine-reached flag, pin cursor x, pin cursor y.
pub const PLAYER_INFO_LEN: usize = 6;

/// Encodes state documents into tensors.
pub trait StateEncoder: Send + Sync {
    /// Encode `state` from `focal`'s perspective.
    ///
    /// `last_known` anchors the window when the focal player's entity has
    /// no coordinates.
    fn encode(
        &self,
        state: &GameStateDocument,
        focal: Character,
        last_known: Option<Position>,
    ) -> Result<EncodedState>;

    /// Shape of encoded states for `focal`, without encoding anything.
    fn output_shape(&self, focal: Character) -> Vec<usize>;

    /// Total number of elements.
    fn observation_size(&self, focal: Character) -> usize {
        self.output_shape(focal).iter().product()
    }
}

/// Egocentric multi-channel grid encoder.
///
/// The grid has shape `(2R+1, 2R+1, channels, variants)` and is flattened
/// row-major over `(x, y, channel, variant)`. Cell `(rx, ry)` holds entities
/// at `(px - R + rx, py - R + ry)`. Every tracked entity in the window sets
/// its one-hot variant slot to 1; overlapping entities do not accumulate.
#[derive(Clone, Debug)]
pub struct GridEncoder {
    config: ObservationConfig,
    channel_count: usize,
}

impl GridEncoder {
    /// Create an encoder, validating the configuration.
    pub fn new(config: ObservationConfig) -> Result<Self> {
        config.validate()?;
        let channel_count = config.channel_count();
        Ok(Self {
            config,
            channel_count,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ObservationConfig {
        &self.config
    }

    /// `(window, window, channels, variants)` for `focal`.
    #[must_use]
    pub fn grid_shape(&self, focal: Character) -> [usize; 4] {
        let window = 2 * self.config.sight_radius(focal) as usize + 1;
        [window, window, self.channel_count, self.config.variant_count]
    }

    /// Variant slot for a tracked entity.
    fn variant_of(&self, entity: &Entity) -> Result<usize> {
        let lookup = |table: &rustc_hash::FxHashMap<String, usize>, key: String| {
            table
                .get(&key)
                .copied()
                .ok_or_else(|| GymError::UnmappedVariant {
                    entity_type: entity.entity_type.clone(),
                    key,
                })
        };

        let variant = if entity.is_pin() {
            let code = entity.pin_code().map(String::from).unwrap_or_default();
            lookup(&self.config.pin_variants, code)?
        } else if entity.is_enemy() {
            lookup(&self.config.size_variants, entity.base_type().to_string())?
        } else {
            0
        };

        if variant >= self.config.variant_count {
            return Err(GymError::UnmappedVariant {
                entity_type: entity.entity_type.clone(),
                key: format!("variant {variant} >= {}", self.config.variant_count),
            });
        }
        Ok(variant)
    }
}

impl StateEncoder for GridEncoder {
    fn encode(
        &self,
        state: &GameStateDocument,
        focal: Character,
        last_known: Option<Position>,
    ) -> Result<EncodedState> {
        let (player, shrine) = state.player_and_shrine(focal)?;
        let center = player.position().or(last_known).ok_or_else(|| {
            GymError::malformed(format!(
                "`{focal}` has no coordinates and no last known position"
            ))
        })?;

        let [window, _, channels, variants] = self.grid_shape(focal);
        let radius = self.config.sight_radius(focal);
        let mut encoded = EncodedState::zeros(self.output_shape(focal));

        for entity in &state.scene {
            let Some(&channel) = self.config.channels.get(&entity.entity_type) else {
                continue;
            };
            let Some(position) = entity.position() else {
                continue;
            };
            if !position.within(center, radius) {
                continue;
            }
            let variant = self.variant_of(entity)?;
            let rx = window_offset(center.x, position.x, radius);
            let ry = window_offset(center.y, position.y, radius);
            let index = ((rx * window + ry) * channels + channel) * variants + variant;
            encoded.set(index, 1.0);
        }

        let info = player_info(player, shrine);
        let offset = encoded.len() - PLAYER_INFO_LEN;
        encoded.tensor[offset..].copy_from_slice(&info);
        Ok(encoded)
    }

    fn output_shape(&self, focal: Character) -> Vec<usize> {
        let grid: usize = self.grid_shape(focal).iter().product();
        vec![grid + PLAYER_INFO_LEN]
    }
}

/// Cell index along one axis of a window of half-width `radius` centred on
/// `center`. `coord` must lie inside the window.
fn window_offset(center: i32, coord: i32, radius: u32) -> usize {
    (i64::from(radius) + i64::from(coord) - i64::from(center)) as usize
}

/// The focal player's own stats; missing values encode as 0.
fn player_info(player: &Entity, shrine: &Entity) -> [f32; PLAYER_INFO_LEN] {
    let stats = player.player_stats().cloned().unwrap_or_default();
    let num = |v: Option<i64>| v.map_or(0.0, |v| v as f32);
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    [
        num(stats.action_points),
        num(stats.health),
        flag(stats.dead),
        flag(shrine.is_reached()),
        num(stats.pin_cursor_x),
        num(stats.pin_cursor_y),
    ]
}
