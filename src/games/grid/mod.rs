//! Local Dice Adventure simulator.
//!
//! A small in-process version of the dungeon game so the environment can run
//! without a game server:
//! - Three characters (Dwarf, Giant, Human), each with a shrine, share a
//!   board with a tower, monsters, traps and stones
//! - Turns alternate between a planning phase (move, spending action points)
//!   and a pinning phase (drop a coloured pin to signal teammates)
//! - A phase ends once every living player has submitted
//! - At the end of planning, players fight whatever they stand on, claim
//!   their shrine, and monsters wander
//! - A level is complete when every shrine is reached and every living
//!   player stands on the tower
//!
//! The game ends after the last level or when every player is dead.

mod game;

pub use game::{GridGame, GridGameBuilder, Phase, MONSTER, STONE, TOWER, TRAP};
