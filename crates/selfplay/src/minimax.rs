//! Alpha-beta minimax baseline for evaluation matches.
//!
//! Leaves are scored by disc difference plus a mobility term, always from
//! Black's perspective. A deterministic opponent to measure the engine against.

use reversi_othello::{Action, Board, GameResult, Player};

/// Score for a finished game before the disc margin is added.
const WIN_SCORE: i32 = 10_000;

/// Weight of one legal placement relative to one disc.
const MOBILITY_WEIGHT: i32 = 2;

/// Static evaluation from Black's perspective.
pub fn evaluate_position(board: &Board) -> i32 {
    let discs = board.count(Player::Black) as i32 - board.count(Player::White) as i32;
    let mobility = board.placements(Player::Black).popcount() as i32
        - board.placements(Player::White).popcount() as i32;
    discs + MOBILITY_WEIGHT * mobility
}

/// Minimax player with alpha-beta pruning.
pub struct MinimaxPlayer {
    max_depth: usize,
}

impl MinimaxPlayer {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Best move for the side to move, first in index order on ties.
    /// None once the game is over.
    pub fn best_move(&self, board: &Board) -> Option<Action> {
        if board.is_terminal() {
            return None;
        }

        let maximizing = board.to_move() == Player::Black;
        let mut best: Option<(Action, i32)> = None;

        for action in board.legal_moves() {
            let Ok(next) = board.apply_move(action) else {
                continue;
            };
            let score = self.alphabeta(&next, self.max_depth - 1, i32::MIN, i32::MAX);
            let better = match best {
                None => true,
                Some((_, best_score)) if maximizing => score > best_score,
                Some((_, best_score)) => score < best_score,
            };
            if better {
                best = Some((action, score));
            }
        }

        best.map(|(action, _)| action)
    }

    fn alphabeta(&self, board: &Board, depth: usize, mut alpha: i32, mut beta: i32) -> i32 {
        if let Some(result) = board.outcome() {
            return terminal_score(board, result);
        }
        if depth == 0 {
            return evaluate_position(board);
        }

        // A forced pass is a single legal move, so it costs one ply like any other
        let children = board
            .legal_moves()
            .into_iter()
            .filter_map(|action| board.apply_move(action).ok());

        if board.to_move() == Player::Black {
            let mut max_eval = i32::MIN;
            for next in children {
                let eval = self.alphabeta(&next, depth - 1, alpha, beta);
                max_eval = max_eval.max(eval);
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break;
                }
            }
            max_eval
        } else {
            let mut min_eval = i32::MAX;
            for next in children {
                let eval = self.alphabeta(&next, depth - 1, alpha, beta);
                min_eval = min_eval.min(eval);
                beta = beta.min(eval);
                if beta <= alpha {
                    break;
                }
            }
            min_eval
        }
    }
}

/// Decisive results dominate any static score; bigger margins win more.
fn terminal_score(board: &Board, result: GameResult) -> i32 {
    let margin = board.count(Player::Black) as i32 - board.count(Player::White) as i32;
    match result {
        GameResult::Win(Player::Black) => WIN_SCORE + margin,
        GameResult::Win(Player::White) => -WIN_SCORE + margin,
        GameResult::Tie => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position_is_balanced() {
        for size in [4, 6, 8] {
            assert_eq!(evaluate_position(&Board::new(size).unwrap()), 0);
        }
    }

    #[test]
    fn test_best_move_is_legal() {
        let board = Board::standard();
        let minimax = MinimaxPlayer::new(3);
        let best = minimax.best_move(&board).unwrap();
        assert!(board.legal_moves().contains(&best));
    }

    #[test]
    fn test_finds_wipeout() {
        let board = Board::from_diagram(
            "B.....\n.W....\nBW....\n......\n......\n......",
            Player::Black,
        )
        .unwrap();
        assert_eq!(board.legal_moves(), vec![Action::Place(2), Action::Place(14)]);

        let minimax = MinimaxPlayer::new(1);
        assert_eq!(minimax.best_move(&board), Some(Action::Place(14)));
    }

    #[test]
    fn test_forced_pass() {
        let board = Board::from_diagram("BW..\n....\n....\n....", Player::White).unwrap();
        assert_eq!(MinimaxPlayer::new(2).best_move(&board), Some(Action::Pass));
    }

    #[test]
    fn test_finished_game_has_no_move() {
        let board = Board::from_diagram("BBBB\nBBBB\nBBBW\nWWWW", Player::White).unwrap();
        assert_eq!(MinimaxPlayer::new(2).best_move(&board), None);
    }

    #[test]
    fn test_zero_depth_is_clamped() {
        assert_eq!(MinimaxPlayer::new(0).max_depth(), 1);
    }
}
