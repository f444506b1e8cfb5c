//! Reversi Core - Game abstractions and common types
//!
//! This crate provides the `Game` trait that a board game must implement to
//! be searched by the MCTS engine, plus typed wrappers that enforce the
//! policy/value invariants evaluators must respect.
//!
//! # Types
//!
//! - [`Game`] - Trait for two-player, zero-sum game implementations
//! - [`Policy`] - Probability distribution over action indices (sums to 1.0)
//! - [`Value`] - Position value estimate in [-1, 1]

mod error;
mod game;
mod types;

pub use error::{ReversiError, Result};
pub use game::Game;
pub use types::{Policy, Value};
