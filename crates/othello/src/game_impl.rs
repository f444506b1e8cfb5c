//! Implementation of the engine's `Game` trait for Othello.

use reversi_core::{Game, ReversiError, Result};

use crate::board::{check_size, GameResult};
use crate::{observation, Action, Board, Player};

/// Othello on an N x N board.
///
/// Action indices are cells `0..N²` plus the pass sentinel `N²`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Othello {
    size: u8,
}

impl Othello {
    /// # Errors
    /// Returns `ReversiError::InvalidBoardSize` unless `size` is even and in 4..=10.
    pub fn new(size: usize) -> Result<Self> {
        check_size(size)?;
        Ok(Self { size: size as u8 })
    }

    /// Standard 8x8 Othello.
    pub fn standard() -> Self {
        Self { size: 8 }
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }
}

impl Default for Othello {
    fn default() -> Self {
        Self::standard()
    }
}

impl Game for Othello {
    type State = Board;
    type Action = Action;
    type Player = Player;
    type Observation = Vec<f32>;

    fn initial_state(&self) -> Board {
        Board::starting(self.size)
    }

    fn to_move(&self, state: &Board) -> Player {
        state.to_move()
    }

    fn legal_actions(&self, state: &Board) -> Vec<Action> {
        state.legal_moves()
    }

    fn apply(&self, state: &Board, action: Action) -> Result<Board> {
        state.apply_move(action)
    }

    fn check_state(&self, state: &Board) -> Result<()> {
        if state.size() != self.size() {
            return Err(ReversiError::StateMismatch(format!(
                "{}x{} board given to a {}x{} game",
                state.size(),
                state.size(),
                self.size(),
                self.size()
            )));
        }
        Ok(())
    }

    fn is_terminal(&self, state: &Board) -> bool {
        state.is_terminal()
    }

    fn terminal_value(&self, state: &Board) -> Option<f32> {
        state.outcome().map(|result| match result {
            GameResult::Win(winner) if winner == state.to_move() => 1.0,
            GameResult::Win(_) => -1.0,
            GameResult::Tie => 0.0,
        })
    }

    fn observe(&self, state: &Board) -> Vec<f32> {
        observation::encode(state)
    }

    fn action_to_index(&self, action: Action) -> usize {
        action.index(self.size())
    }

    fn index_to_action(&self, index: usize) -> Option<Action> {
        Action::from_index(index, self.size())
    }

    fn num_actions(&self) -> usize {
        self.size() * self.size() + 1
    }
}
