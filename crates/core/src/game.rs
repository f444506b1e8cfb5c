use std::fmt::Debug;
use std::hash::Hash;

use crate::Result;

/// A two-player, perfect-information, zero-sum game.
///
/// The search only talks to a game through this trait, so the algorithm is
/// symmetric in the two players: every value it handles is expressed from the
/// perspective of the side to move at the state in question.
///
/// Games where a side can be left without a placement (Othello) must model
/// that as an explicit pass action, so `legal_actions` is never empty on a
/// non-terminal state.
pub trait Game: Clone + Send + Sync {
    /// The game state (e.g., an Othello board)
    type State: Clone + Send + PartialEq + Hash;

    /// A game action (e.g., place a disc, pass)
    type Action: Clone + Copy + Send + Eq + Hash + Debug;

    /// The identity of a side
    type Player: Clone + Copy + Send + Eq + Debug;

    /// The observation format for an evaluator
    type Observation;

    /// Returns the initial game state
    fn initial_state(&self) -> Self::State;

    /// Returns the side to move at `state`
    fn to_move(&self, state: &Self::State) -> Self::Player;

    /// Returns all legal actions from the given state, in ascending index order
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies an action, returning a new state (immutable operation)
    ///
    /// # Errors
    /// Returns `ReversiError::IllegalMove` if `action` is not legal at `state`.
    fn apply(&self, state: &Self::State, action: Self::Action) -> Result<Self::State>;

    /// Checks that `state` was produced under this game's parameters
    /// (e.g. the same board size). The default accepts every state.
    ///
    /// # Errors
    /// Returns `ReversiError::StateMismatch` for a foreign state.
    fn check_state(&self, _state: &Self::State) -> Result<()> {
        Ok(())
    }

    /// Returns true if the game has ended
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Returns the game result from the perspective of the side to move:
    /// - `Some(1.0)` if that side won
    /// - `Some(-1.0)` if that side lost
    /// - `Some(0.0)` for a tie
    /// - `None` if the game is not terminal
    fn terminal_value(&self, state: &Self::State) -> Option<f32>;

    /// Converts game state to evaluator observation format
    fn observe(&self, state: &Self::State) -> Self::Observation;

    /// Maps an action to a flat index for the policy vector
    fn action_to_index(&self, action: Self::Action) -> usize;

    /// Maps a flat index back to an action, returning None if invalid
    fn index_to_action(&self, index: usize) -> Option<Self::Action>;

    /// Total number of possible action indices (size of policy vector)
    fn num_actions(&self) -> usize;
}
