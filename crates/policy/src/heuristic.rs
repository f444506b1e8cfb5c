//! Hand-written Othello evaluator.
//!
//! Priors are a softmax over a positional weight table (corners good, the
//! cells next to them bad); the value blends positional, mobility and disc
//! balance from the side to move's perspective.

use reversi_core::{Game, Policy, Result};
use reversi_mcts::{Evaluation, Evaluator};
use reversi_othello::{Action, Board, Othello};

/// Positional weight of `cell` on an N x N board.
///
/// The classic 8x8 table generalized by distance to the nearest edges.
pub fn positional_weight(size: usize, cell: usize) -> f32 {
    let (row, col) = (cell / size, cell % size);
    let dr = row.min(size - 1 - row);
    let dc = col.min(size - 1 - col);

    match (dr.min(dc), dr.max(dc)) {
        (0, 0) => 4.0,   // corner
        (1, 1) => -2.0,  // X-square
        (0, 1) => -1.0,  // C-square
        (0, _) => 1.0,   // edge
        (1, _) => -0.25, // second ring
        _ => 0.0,
    }
}

/// Positional, mobility and disc-count evaluator.
#[derive(Clone, Debug, PartialEq)]
pub struct HeuristicEvaluator {
    pub positional_weight: f32,
    pub mobility_weight: f32,
    pub disc_weight: f32,

    /// Multiplier applied before `tanh`; larger values give sharper values.
    pub value_scale: f32,

    /// Softmax temperature over positional weights for the priors.
    pub prior_temperature: f32,
}

impl Default for HeuristicEvaluator {
    fn default() -> Self {
        Self {
            positional_weight: 1.0,
            mobility_weight: 0.5,
            disc_weight: 0.25,
            value_scale: 1.5,
            prior_temperature: 1.0,
        }
    }
}

impl HeuristicEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prior logits: positional weight for placements, 0 for pass.
    fn logits(&self, board: &Board, legal: &[Action]) -> Vec<f32> {
        let size = board.size();
        let mut logits = vec![0.0; board.cell_count() + 1];
        for action in legal {
            if let Some(cell) = action.cell() {
                logits[cell] = positional_weight(size, cell) / self.prior_temperature;
            }
        }
        logits
    }

    /// Value in (-1, 1) for the side to move.
    pub fn value(&self, board: &Board) -> f32 {
        let size = board.size();
        let own = board.to_move();
        let opp = own.opponent();

        let total: f32 = (0..board.cell_count())
            .map(|cell| positional_weight(size, cell).abs())
            .sum();
        let weigh = |player| -> f32 {
            board
                .discs(player)
                .iter()
                .map(|cell| positional_weight(size, cell))
                .sum()
        };
        let positional = (weigh(own) - weigh(opp)) / total;

        let mobility = balance(
            board.placements(own).popcount(),
            board.placements(opp).popcount(),
        );
        let discs = balance(board.count(own), board.count(opp));

        let raw = self.positional_weight * positional
            + self.mobility_weight * mobility
            + self.disc_weight * discs;
        (self.value_scale * raw).tanh()
    }
}

/// (a - b) / (a + b), or 0 when both are 0.
fn balance(a: u32, b: u32) -> f32 {
    if a + b == 0 {
        0.0
    } else {
        (a as f32 - b as f32) / (a + b) as f32
    }
}

impl Evaluator<Othello> for HeuristicEvaluator {
    fn evaluate(&self, game: &Othello, state: &Board) -> Result<Evaluation> {
        let legal = game.legal_actions(state);
        let indices: Vec<usize> = legal.iter().map(|a| game.action_to_index(*a)).collect();
        let policy = Policy::softmax_masked(&self.logits(state, &legal), &indices)?;

        Ok(Evaluation {
            policy: policy.into_inner(),
            value: self.value(state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reversi_othello::Player;

    fn corner_choice() -> Board {
        // Black can take a1 (cell 0) or d3 (cell 15)
        Board::from_diagram(
            "......\n.W....\n..B.WB\n......\n......\n......",
            Player::Black,
        )
        .unwrap()
    }

    fn swap_colours(board: &Board) -> Board {
        Board::with_discs(
            board.size(),
            board.occupied().map(|(cell, p)| (cell, p.opponent())),
            board.to_move().opponent(),
        )
        .unwrap()
    }

    #[test]
    fn test_positional_table_8x8() {
        assert_eq!(positional_weight(8, 0), 4.0);
        assert_eq!(positional_weight(8, 63), 4.0);
        assert_eq!(positional_weight(8, 9), -2.0);
        assert_eq!(positional_weight(8, 1), -1.0);
        assert_eq!(positional_weight(8, 8), -1.0);
        assert_eq!(positional_weight(8, 3), 1.0);
        assert_eq!(positional_weight(8, 27), 0.0);
    }

    #[test]
    fn test_positional_table_symmetric() {
        for size in [4, 6, 8, 10] {
            for cell in 0..size * size {
                let (r, c) = (cell / size, cell % size);
                let mirrored = (size - 1 - r) * size + c;
                let transposed = c * size + r;
                assert_eq!(positional_weight(size, cell), positional_weight(size, mirrored));
                assert_eq!(positional_weight(size, cell), positional_weight(size, transposed));
            }
        }
    }

    #[test]
    fn test_priors_prefer_corner() {
        let board = corner_choice();
        assert_eq!(board.legal_moves(), vec![Action::Place(0), Action::Place(15)]);

        let game = Othello::new(6).unwrap();
        let eval = HeuristicEvaluator::new().evaluate(&game, &board).unwrap();
        assert!(eval.policy[0] > eval.policy[15]);
        assert!((eval.policy.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert_eq!(eval.policy.iter().filter(|p| **p > 0.0).count(), 2);
    }

    #[test]
    fn test_forced_pass_prior() {
        let board = Board::from_diagram("BW..\n....\n....\n....", Player::White).unwrap();
        let game = Othello::new(4).unwrap();
        let eval = HeuristicEvaluator::new().evaluate(&game, &board).unwrap();
        assert!((eval.policy[16] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_value_antisymmetric_in_side_to_move() {
        let evaluator = HeuristicEvaluator::new();
        let black = corner_choice();
        let white = Board::with_discs(6, black.occupied(), Player::White).unwrap();

        let v = evaluator.value(&black);
        assert!((-1.0..=1.0).contains(&v));
        assert!((v + evaluator.value(&white)).abs() < 1e-6);
    }

    #[test]
    fn test_value_colour_invariant() {
        let evaluator = HeuristicEvaluator::new();
        let board = corner_choice();
        assert!((evaluator.value(&board) - evaluator.value(&swap_colours(&board))).abs() < 1e-6);
    }

    #[test]
    fn test_start_position_is_balanced() {
        let evaluator = HeuristicEvaluator::new();
        assert!(evaluator.value(&Board::standard()).abs() < 1e-6);
    }

    #[test]
    fn test_winning_material_is_positive() {
        // Black owns every corner and most of the board
        let board = Board::from_diagram(
            "BBBBBB\nBBBBBB\nBBWWBB\nBBW.BB\nBBBBBB\nBBBBB.",
            Player::Black,
        )
        .unwrap();
        assert!(HeuristicEvaluator::new().value(&board) > 0.5);
    }
}
