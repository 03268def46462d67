//! Game implementations.
//!
//! - `grid`: in-process Dice Adventure simulator backing [`LocalProvider`](crate::state::LocalProvider)

pub mod grid;
