//! Observation encoding for evaluator input.
//!
//! Two binary planes of N² floats each, relative to the side to move:
//! plane 0 holds its discs, plane 1 the opponent's. Which colour is to move
//! is deliberately absent, so an evaluator sees Black-to-move and
//! White-to-move positions with swapped colours as the same input.

use crate::{Bitboard, Board};

/// Number of planes in the observation tensor.
pub const NUM_PLANES: usize = 2;

/// Plane holding the side to move's discs.
pub const OWN_PLANE: usize = 0;

/// Plane holding the opponent's discs.
pub const OPPONENT_PLANE: usize = 1;

/// Total number of floats in the observation for an N x N board.
pub const fn observation_size(size: usize) -> usize {
    NUM_PLANES * size * size
}

/// Encode a board into the flat `[plane][cell]` layout.
pub fn encode(board: &Board) -> Vec<f32> {
    let cells = board.cell_count();
    let mut obs = vec![0.0f32; observation_size(board.size())];
    let mover = board.to_move();

    fill_plane(&mut obs[OWN_PLANE * cells..], board.discs(mover));
    fill_plane(&mut obs[OPPONENT_PLANE * cells..], board.discs(mover.opponent()));
    obs
}

fn fill_plane(plane: &mut [f32], discs: Bitboard) {
    for cell in discs {
        plane[cell] = 1.0;
    }
}
