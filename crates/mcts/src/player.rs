//! Stateful move chooser that keeps one search tree across a game.

use rand::Rng;
use reversi_core::{Game, ReversiError, Result};
use tracing::debug;

use crate::{
    config::MctsConfig,
    evaluator::Evaluator,
    search::{Mcts, SearchResult},
};

/// An engine player: a game definition, an evaluator and a retained tree.
///
/// Call [`MctsPlayer::reset`] at the start of every game. Between decisions
/// the tree root follows the game: after choosing a move the root advances
/// to it, and on the next call the opponent's reply is looked up among the
/// root's children so its statistics carry over.
pub struct MctsPlayer<G: Game, E: Evaluator<G>, R: Rng> {
    game: G,
    mcts: Mcts<G, E, R>,
    side: Option<G::Player>,
    move_number: usize,
}

impl<G, E, R> MctsPlayer<G, E, R>
where
    G: Game,
    E: Evaluator<G>,
    R: Rng,
{
    /// # Errors
    /// Returns `ReversiError::InvalidConfig` if the config does not validate.
    pub fn new(game: G, config: MctsConfig, evaluator: E, rng: R) -> Result<Self> {
        Ok(Self {
            game,
            mcts: Mcts::new(config, evaluator, rng)?,
            side: None,
            move_number: 0,
        })
    }

    /// Record which side this player plays. The search itself is symmetric
    /// and never reads it.
    pub fn set_side(&mut self, side: G::Player) {
        self.side = Some(side);
    }

    pub fn side(&self) -> Option<G::Player> {
        self.side
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn mcts(&self) -> &Mcts<G, E, R> {
        &self.mcts
    }

    /// Decisions made since the last reset.
    pub fn move_number(&self) -> usize {
        self.move_number
    }

    /// Forget the retained tree and the move counter.
    pub fn reset(&mut self) {
        self.mcts.reset();
        self.move_number = 0;
    }

    /// Search `state` and return the chosen action.
    ///
    /// # Errors
    /// - `ReversiError::StateMismatch` if `state` is terminal
    /// - `ReversiError::InvalidPolicy` / `InvalidValue` if the evaluator
    ///   breaks its contract
    pub fn choose_action(&mut self, state: &G::State) -> Result<G::Action> {
        self.choose_action_with_result(state)
            .map(|(action, _)| action)
    }

    /// Like [`MctsPlayer::choose_action`], also returning the root statistics
    /// the choice was made from.
    ///
    /// # Errors
    /// See [`MctsPlayer::choose_action`].
    pub fn choose_action_with_result(
        &mut self,
        state: &G::State,
    ) -> Result<(G::Action, SearchResult<G::Action>)> {
        if self.game.is_terminal(state) {
            return Err(ReversiError::StateMismatch(
                "cannot choose an action in a finished game".to_string(),
            ));
        }

        let result = self.mcts.run(&self.game, state)?;
        let temperature = self.mcts.config().effective_temperature(self.move_number);
        let action = self.mcts.select_action(&result, temperature);
        self.mcts.advance(&self.game, action)?;

        debug!(
            move_number = self.move_number,
            ?action,
            visits = result.visits(action),
            root_value = result.root_value,
            temperature,
            "chose action"
        );
        self.move_number += 1;

        Ok((action, result))
    }
}
