//! Reward policies.
//!
//! A [`RewardPolicy`] is an ordered list of weighted [`RewardTerm`]s. Each
//! term fires on a predicate (or its negation) and contributes its weight;
//! contributions are summed without normalization or clipping.
//!
//! Two presets exist:
//!
//! | term                          | standard | aggressive |
//! |-------------------------------|----------|------------|
//! | goal reached                  | +1       | +1         |
//! | level advanced                | +1       | +1         |
//! | health lost or dead           | -0.2     | -0.1       |
//! | not moved                     | -0.1     | -0.1       |
//! | enemy count reduced           |          | +0.35      |
//! | each character not closer to a monster |  | +0.1     |
//!
//! In configuration a policy is either a preset name or a list of terms:
//!
//! ```json
//! [
//!   { "term": "goal_reached", "weight": 1.0 },
//!   { "term": { "not_closer": { "source": "Dwarf", "target": "monster" } }, "weight": 0.1 }
//! ]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Character, Entity};
use crate::error::Result;
use crate::state::GameStateDocument;

use super::predicates;

/// Weight of each aggressive-policy proximity term. It is paid when the
/// character did *not* get closer to the nearest monster.
pub const PROXIMITY_REGRESSION_WEIGHT: f64 = 0.1;

/// One reward term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardTerm {
    /// Fires when the focal shrine is reached.
    GoalReached,
    /// Fires when the level changes.
    LevelAdvanced,
    /// Fires when the focal player lost health or died.
    HealthLostOrDead,
    /// Fires when the focal player did not move.
    NotMoved,
    /// Fires when there are fewer monsters.
    EnemyCountReduced,
    /// Fires when `source` did not get closer to the nearest `target`.
    NotCloser { source: Character, target: String },
    /// Fires when the focal player's pin cursor moved onto an object.
    PinOnObject,
}

impl RewardTerm {
    /// Evaluate the firing condition.
    #[must_use]
    pub fn fires(&self, transition: &Transition<'_>) -> bool {
        let t = transition;
        match self {
            RewardTerm::GoalReached => {
                predicates::goal_reached(t.prev_shrine, t.next_shrine, t.prev, t.next)
            }
            RewardTerm::LevelAdvanced => predicates::level_advanced(t.prev, t.next),
            RewardTerm::HealthLostOrDead => {
                predicates::health_lost_or_dead(t.prev_player, t.next_player)
            }
            RewardTerm::NotMoved => !predicates::has_moved(t.prev_player, t.next_player),
            RewardTerm::EnemyCountReduced => predicates::enemy_count_reduced(t.prev, t.next),
            RewardTerm::NotCloser { source, target } => {
                !predicates::closer_to_nearest(t.prev, t.next, source.as_str(), target)
            }
            RewardTerm::PinOnObject => {
                predicates::pin_placed_on_object(t.prev_player, t.next_player, t.next)
            }
        }
    }
}

impl fmt::Display for RewardTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardTerm::GoalReached => f.write_str("goal_reached"),
            RewardTerm::LevelAdvanced => f.write_str("level_advanced"),
            RewardTerm::HealthLostOrDead => f.write_str("health_lost_or_dead"),
            RewardTerm::NotMoved => f.write_str("not_moved"),
            RewardTerm::EnemyCountReduced => f.write_str("enemy_count_reduced"),
            RewardTerm::NotCloser { source, target } => write!(f, "not_closer({source}->{target})"),
            RewardTerm::PinOnObject => f.write_str("pin_on_object"),
        }
    }
}

/// A term and the reward it contributes when it fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedTerm {
    pub term: RewardTerm,
    pub weight: f64,
}

impl WeightedTerm {
    #[must_use]
    pub fn new(term: RewardTerm, weight: f64) -> Self {
        Self { term, weight }
    }
}

/// The two snapshots around one focal action, with the focal player's
/// entity and shrine located in each.
#[derive(Clone, Copy, Debug)]
pub struct Transition<'a> {
    pub focal: Character,
    pub prev: &'a GameStateDocument,
    pub next: &'a GameStateDocument,
    pub prev_player: &'a Entity,
    pub next_player: &'a Entity,
    pub prev_shrine: &'a Entity,
    pub next_shrine: &'a Entity,
}

impl<'a> Transition<'a> {
    /// Locate the focal entities. Both states must contain the focal
    /// player and their shrine.
    pub fn new(focal: Character, prev: &'a GameStateDocument, next: &'a GameStateDocument) -> Result<Self> {
        let (prev_player, prev_shrine) = prev.player_and_shrine(focal)?;
        let (next_player, next_shrine) = next.player_and_shrine(focal)?;
        Ok(Self {
            focal,
            prev,
            next,
            prev_player,
            next_player,
            prev_shrine,
            next_shrine,
        })
    }
}

/// Scored transition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub total: f64,
    /// Terms that fired, in policy order.
    pub fired: SmallVec<[RewardTerm; 8]>,
}

impl RewardBreakdown {
    /// Comma-separated fired term names, for logs.
    #[must_use]
    pub fn codes(&self) -> String {
        self.fired
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// An ordered list of weighted terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRepr", into = "PolicyRepr")]
pub struct RewardPolicy {
    name: String,
    terms: Vec<WeightedTerm>,
}

impl RewardPolicy {
    /// Goal and level bonuses, penalties for damage and standing still.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            name: "standard".into(),
            terms: vec![
                WeightedTerm::new(RewardTerm::GoalReached, 1.0),
                WeightedTerm::new(RewardTerm::LevelAdvanced, 1.0),
                WeightedTerm::new(RewardTerm::HealthLostOrDead, -0.2),
                WeightedTerm::new(RewardTerm::NotMoved, -0.1),
            ],
        }
    }

    /// Standard terms with a lighter damage penalty, a bonus for killing
    /// monsters and a proximity term per character.
    #[must_use]
    pub fn aggressive() -> Self {
        let mut terms = vec![
            WeightedTerm::new(RewardTerm::GoalReached, 1.0),
            WeightedTerm::new(RewardTerm::LevelAdvanced, 1.0),
            WeightedTerm::new(RewardTerm::HealthLostOrDead, -0.1),
            WeightedTerm::new(RewardTerm::NotMoved, -0.1),
            WeightedTerm::new(RewardTerm::EnemyCountReduced, 0.35),
        ];
        for source in [Character::Human, Character::Dwarf, Character::Giant] {
            terms.push(WeightedTerm::new(
                RewardTerm::NotCloser {
                    source,
                    target: predicates::ENEMY_TYPE.into(),
                },
                PROXIMITY_REGRESSION_WEIGHT,
            ));
        }
        Self {
            name: "aggressive".into(),
            terms,
        }
    }

    /// A custom policy.
    #[must_use]
    pub fn custom(terms: Vec<WeightedTerm>) -> Self {
        Self {
            name: "custom".into(),
            terms,
        }
    }

    /// Look up a preset by name.
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "standard" => Some(Self::standard()),
            "aggressive" => Some(Self::aggressive()),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn terms(&self) -> &[WeightedTerm] {
        &self.terms
    }

    /// Score a transition.
    #[must_use]
    pub fn score(&self, transition: &Transition<'_>) -> RewardBreakdown {
        let mut breakdown = RewardBreakdown::default();
        for weighted in &self.terms {
            if weighted.term.fires(transition) {
                breakdown.total += weighted.weight;
                breakdown.fired.push(weighted.term.clone());
            }
        }
        breakdown
    }

    /// Locate the focal entities and score.
    pub fn score_states(
        &self,
        focal: Character,
        prev: &GameStateDocument,
        next: &GameStateDocument,
    ) -> Result<RewardBreakdown> {
        Ok(self.score(&Transition::new(focal, prev, next)?))
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::aggressive()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
    Preset(String),
    Terms(Vec<WeightedTerm>),
}

impl TryFrom<PolicyRepr> for RewardPolicy {
    type Error = String;

    fn try_from(repr: PolicyRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            PolicyRepr::Preset(name) => {
                Self::preset(&name).ok_or_else(|| format!("unknown reward preset `{name}`"))
            }
            PolicyRepr::Terms(terms) => Ok(Self::custom(terms)),
        }
    }
}

impl From<RewardPolicy> for PolicyRepr {
    fn from(policy: RewardPolicy) -> Self {
        match RewardPolicy::preset(&policy.name) {
            Some(preset) if preset.terms == policy.terms => PolicyRepr::Preset(policy.name),
            _ => PolicyRepr::Terms(policy.terms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlayerStats, Position};
    use crate::state::{Level, Status};

    fn state(dwarf: Position, monsters: &[Position]) -> GameStateDocument {
        let mut scene = vec![
            Entity::player(Character::Dwarf, Some(dwarf), PlayerStats::default()),
            Entity::shrine(Character::Dwarf, Position::new(9, 9), false),
        ];
        scene.extend(monsters.iter().map(|&p| Entity::object("monster", p)));
        GameStateDocument::new(Level::Number(1), "PlayerPlanning", Status::Active, scene).unwrap()
    }

    #[test]
    fn test_standard_idle_penalty() {
        let s = state(Position::new(0, 0), &[]);
        let breakdown = RewardPolicy::standard()
            .score_states(Character::Dwarf, &s, &s)
            .unwrap();
        assert!((breakdown.total - -0.1).abs() < 1e-9);
        assert_eq!(breakdown.fired.as_slice(), &[RewardTerm::NotMoved]);
    }

    #[test]
    fn test_aggressive_proximity_sign() {
        let policy = RewardPolicy::aggressive();
        let prev = state(Position::new(0, 0), &[Position::new(5, 0)]);
        let away = state(Position::new(0, 1), &[Position::new(5, 0)]);

        let breakdown = policy.score_states(Character::Dwarf, &prev, &away).unwrap();
        // Dwarf moved away: its proximity term fires. Human and Giant are
        // absent in both states, which counts as closer.
        assert_eq!(
            breakdown.fired.as_slice(),
            &[RewardTerm::NotCloser {
                source: Character::Dwarf,
                target: "monster".into(),
            }]
        );
        assert!((breakdown.total - PROXIMITY_REGRESSION_WEIGHT).abs() < 1e-9);
        assert!(breakdown.total > 0.0);
    }

    #[test]
    fn test_aggressive_enemy_kill() {
        let policy = RewardPolicy::aggressive();
        let prev = state(Position::new(0, 0), &[Position::new(1, 0)]);
        let next = state(Position::new(1, 0), &[]);

        let breakdown = policy.score_states(Character::Dwarf, &prev, &next).unwrap();
        // Kill bonus only; the vanished monster is not a proximity regression.
        assert!((breakdown.total - 0.35).abs() < 1e-9);
        assert_eq!(breakdown.fired.as_slice(), &[RewardTerm::EnemyCountReduced]);
    }

    #[test]
    fn test_missing_shrine_is_an_error() {
        let good = state(Position::new(0, 0), &[]);
        let bad = GameStateDocument::new(
            Level::Number(1),
            "",
            Status::Active,
            vec![Entity::player(Character::Dwarf, Some(Position::new(0, 0)), PlayerStats::default())],
        )
        .unwrap();
        assert!(RewardPolicy::standard()
            .score_states(Character::Dwarf, &good, &bad)
            .is_err());
    }

    #[test]
    fn test_preset_serde() {
        let policy: RewardPolicy = serde_json::from_str("\"standard\"").unwrap();
        assert_eq!(policy, RewardPolicy::standard());
        assert_eq!(serde_json::to_string(&RewardPolicy::aggressive()).unwrap(), "\"aggressive\"");
        assert!(serde_json::from_str::<RewardPolicy>("\"lenient\"").is_err());
    }

    #[test]
    fn test_custom_policy_serde() {
        let json = r#"[
            {"term": "goal_reached", "weight": 2.0},
            {"term": {"not_closer": {"source": "Giant", "target": "trap"}}, "weight": -0.5}
        ]"#;
        let policy: RewardPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.name(), "custom");
        assert_eq!(policy.terms().len(), 2);
        assert_eq!(
            policy.terms()[1].term,
            RewardTerm::NotCloser {
                source: Character::Giant,
                target: "trap".into(),
            }
        );

        let back: RewardPolicy =
            serde_json::from_value(serde_json::to_value(&policy).unwrap()).unwrap();
        assert_eq!(back, policy);
    }

    #[test]
    fn test_breakdown_codes() {
        let breakdown = RewardBreakdown {
            total: 0.0,
            fired: [RewardTerm::NotMoved, RewardTerm::LevelAdvanced].into_iter().collect(),
        };
        assert_eq!(breakdown.codes(), "not_moved,level_advanced");
    }
}
