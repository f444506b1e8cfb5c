//! Small games and evaluators for unit tests.

use reversi_core::{Game, Result};

use crate::evaluator::{Evaluation, Evaluator};

/// Race to `target`: players alternately add 1..=max_step; whoever reaches
/// `target` exactly wins. With `max_step == 1` the game is a single line.
#[derive(Clone, Debug)]
pub struct CountingGame {
    target: u8,
    max_step: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CountingState {
    pub count: u8,
    pub to_move: u8,
}

impl CountingGame {
    pub fn new(target: u8) -> Self {
        Self {
            target,
            max_step: 2,
        }
    }

    pub fn chain(length: u8) -> Self {
        Self {
            target: length,
            max_step: 1,
        }
    }
}

impl Game for CountingGame {
    type State = CountingState;
    type Action = u8;
    type Player = u8;
    type Observation = ();

    fn initial_state(&self) -> CountingState {
        CountingState {
            count: 0,
            to_move: 0,
        }
    }

    fn to_move(&self, state: &CountingState) -> u8 {
        state.to_move
    }

    fn legal_actions(&self, state: &CountingState) -> Vec<u8> {
        (1..=self.max_step)
            .filter(|step| state.count + step <= self.target)
            .collect()
    }

    fn apply(&self, state: &CountingState, action: u8) -> Result<CountingState> {
        if !self.legal_actions(state).contains(&action) {
            return Err(reversi_core::ReversiError::IllegalMove(format!(
                "cannot add {} to {}",
                action, state.count
            )));
        }
        Ok(CountingState {
            count: state.count + action,
            to_move: 1 - state.to_move,
        })
    }

    fn is_terminal(&self, state: &CountingState) -> bool {
        state.count >= self.target
    }

    fn terminal_value(&self, state: &CountingState) -> Option<f32> {
        // The previous mover reached the target, so the side to move lost
        self.is_terminal(state).then_some(-1.0)
    }

    fn observe(&self, _state: &CountingState) {}

    fn action_to_index(&self, action: u8) -> usize {
        (action - 1) as usize
    }

    fn index_to_action(&self, index: usize) -> Option<u8> {
        (index < self.max_step as usize).then(|| index as u8 + 1)
    }

    fn num_actions(&self) -> usize {
        self.max_step as usize
    }
}

/// Uniform priors and the same value for every position.
#[derive(Clone, Copy, Debug)]
pub struct FixedValueEvaluator(pub f32);

impl<G: Game> Evaluator<G> for FixedValueEvaluator {
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation> {
        let legal = game.legal_actions(state);
        let mut policy = vec![0.0; game.num_actions()];
        for action in &legal {
            policy[game.action_to_index(*action)] = 1.0 / legal.len() as f32;
        }
        Ok(Evaluation {
            policy,
            value: self.0,
        })
    }
}

/// Returns the same raw evaluation everywhere, valid or not.
#[derive(Clone, Debug)]
pub struct RawEvaluator(pub Evaluation);

impl<G: Game> Evaluator<G> for RawEvaluator {
    fn evaluate(&self, _game: &G, _state: &G::State) -> Result<Evaluation> {
        Ok(self.0.clone())
    }
}
