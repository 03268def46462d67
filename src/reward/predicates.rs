//! Reward predicates.
//!
//! Each predicate compares two temporally adjacent snapshots (or the focal
//! player's entity in each) and is pure.

use crate::core::Entity;
use crate::state::GameStateDocument;

/// Type substring counted as an enemy by [`enemy_count_reduced`].
pub const ENEMY_TYPE: &str = "monster";

/// The focal shrine became reached, or it was unreached and the level
/// changed (the level was completed with it).
#[must_use]
pub fn goal_reached(
    prev_shrine: &Entity,
    next_shrine: &Entity,
    prev: &GameStateDocument,
    next: &GameStateDocument,
) -> bool {
    !prev_shrine.is_reached() && (next_shrine.is_reached() || level_advanced(prev, next))
}

/// The level changed.
#[must_use]
pub fn level_advanced(prev: &GameStateDocument, next: &GameStateDocument) -> bool {
    prev.level != next.level
}

/// Health went down, or the player is now dead.
///
/// A missing health value on either side never counts as a decrease.
#[must_use]
pub fn health_lost_or_dead(prev_player: &Entity, next_player: &Entity) -> bool {
    let prev = prev_player.player_stats();
    let next = next_player.player_stats();
    let dead = next.is_some_and(|s| s.dead);
    let lost = match (prev.and_then(|s| s.health), next.and_then(|s| s.health)) {
        (Some(before), Some(after)) => after < before,
        _ => false,
    };
    lost || dead
}

/// `(x, y)` differ. Absent coordinates compare like values.
#[must_use]
pub fn has_moved(prev_player: &Entity, next_player: &Entity) -> bool {
    prev_player.x != next_player.x || prev_player.y != next_player.y
}

/// Fewer monsters than before.
#[must_use]
pub fn enemy_count_reduced(prev: &GameStateDocument, next: &GameStateDocument) -> bool {
    next.count_containing(ENEMY_TYPE) < prev.count_containing(ENEMY_TYPE)
}

/// Distance from `source` (matched by case-insensitive type equality) to the
/// nearest entity whose type contains `target` (case-insensitive).
///
/// `None` if the source is missing or unpositioned, or there are no
/// positioned targets.
#[must_use]
pub fn nearest_distance(state: &GameStateDocument, source: &str, target: &str) -> Option<f64> {
    let origin = state.find_by_name(source)?.position()?;
    state
        .scene
        .iter()
        .filter(|e| e.type_contains(target))
        .filter_map(Entity::position)
        .map(|p| origin.distance(p))
        .min_by(f64::total_cmp)
}

/// The nearest `target` is strictly closer to `source` than before.
///
/// Holds whenever either state has no distance: a target that was killed,
/// left sight or has not appeared yet is not a regression.
#[must_use]
pub fn closer_to_nearest(
    prev: &GameStateDocument,
    next: &GameStateDocument,
    source: &str,
    target: &str,
) -> bool {
    match (
        nearest_distance(prev, source, target),
        nearest_distance(next, source, target),
    ) {
        (Some(before), Some(after)) => before > after,
        _ => true,
    }
}

/// The pin cursor moved onto a cell holding another object.
#[must_use]
pub fn pin_placed_on_object(prev_player: &Entity, next_player: &Entity, next: &GameStateDocument) -> bool {
    let cursor = |e: &Entity| e.player_stats().map(|s| (s.pin_cursor_x, s.pin_cursor_y));
    let Some((Some(x), Some(y))) = cursor(next_player) else {
        return false;
    };
    if cursor(prev_player) == cursor(next_player) {
        return false;
    }
    next.scene.iter().any(|e| {
        e.character().is_none()
            && !e.is_pin()
            && e.x.map(i64::from) == Some(x)
            && e.y.map(i64::from) == Some(y)
    })
}
