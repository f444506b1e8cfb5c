//! Reversi Othello - Othello/Reversi rules on N x N boards
//!
//! Positions are immutable [`Board`] values stored as two 128-bit
//! bitboards, so every even size from 4x4 to 10x10 shares one move
//! generator. [`Othello`] adapts the rules to the engine's `Game` trait.

mod action;
mod bitboard;
mod board;
mod game_impl;
pub mod observation;
mod player;

pub use action::Action;
pub use bitboard::{Bitboard, BitboardIter, Layout, DIRECTIONS};
pub use board::{Board, GameResult, MAX_SIZE, MIN_SIZE};
pub use game_impl::Othello;
pub use player::Player;
