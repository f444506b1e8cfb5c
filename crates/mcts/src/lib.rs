//! Monte Carlo Tree Search with tree reuse across turns.
//!
//! This crate provides a generic PUCT search that works with any game
//! implementing the `reversi_core::Game` trait, and a player wrapper that
//! keeps one tree alive for a whole game.
//!
//! # Features
//!
//! - **Generic**: Works with any `Game` implementation
//! - **PUCT Selection**: `Q + c_puct * P * sqrt(N_parent) / (1 + N)`
//! - **Evaluator Abstraction**: uniform, rollout, or downstream heuristic and
//!   learned evaluators, all behind one fallible trait
//! - **Tree Reuse**: the played move's subtree is kept; the opponent's reply
//!   is matched against the retained children
//! - **Dirichlet Noise**: optional exploration noise at the root
//! - **Temperature Sampling**: greedy or visit-proportional action selection
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use reversi_core::Game;
//! use reversi_mcts::{MctsConfig, MctsPlayer, RolloutEvaluator};
//! use reversi_othello::Othello;
//!
//! let game = Othello::new(6).unwrap();
//! let mut board = game.initial_state();
//!
//! let mut player = MctsPlayer::new(
//!     game.clone(),
//!     MctsConfig::for_evaluation(50),
//!     RolloutEvaluator::new(42, 100),
//!     ChaCha8Rng::seed_from_u64(42),
//! )
//! .unwrap();
//!
//! player.reset();
//! let action = player.choose_action(&board).unwrap();
//! board = game.apply(&board, action).unwrap();
//! println!("{}", board);
//! ```

pub mod config;
pub mod evaluator;
mod node;
mod player;
pub mod search;
#[cfg(test)]
mod testing;
mod tree;

pub use config::MctsConfig;
pub use evaluator::{Evaluation, Evaluator, RolloutEvaluator, UniformEvaluator};
pub use node::{Node, NodeId, NodeStats};
pub use player::MctsPlayer;
pub use search::{Mcts, RootSync, SearchResult};
pub use tree::Tree;
