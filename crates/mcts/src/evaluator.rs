//! Evaluation abstraction for MCTS.
//!
//! The `Evaluator` trait allows swapping between different evaluation strategies:
//! - `UniformEvaluator`: flat priors, neutral value
//! - `RolloutEvaluator`: flat priors, value from one seeded random playout
//! - game-specific heuristics and learned models in downstream crates
//!
//! Every evaluator must be deterministic given identical input.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reversi_core::{Game, Result};

/// Evaluation result: prior policy + value estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Prior probability for each action index.
    /// Length must equal `game.num_actions()`.
    pub policy: Vec<f32>,

    /// Value estimate from the perspective of the side to move, in [-1, 1].
    pub value: f32,
}

/// Trait for evaluating game positions.
///
/// The search masks `policy` to the legal actions and renormalizes it; that
/// is the only correction applied. A policy of the wrong length, a negative
/// or non-finite entry, no mass on the legal set, or a value outside [-1, 1]
/// fails the decision with an error.
pub trait Evaluator<G: Game> {
    /// Evaluate a non-terminal position, returning prior policy and value estimate.
    ///
    /// # Errors
    /// Implementations may fail for their own reasons (e.g. a model that does
    /// not fit the board); the error is propagated out of the search.
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation>;
}

impl<G: Game, E: Evaluator<G> + ?Sized> Evaluator<G> for &E {
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation> {
        (**self).evaluate(game, state)
    }
}

impl<G: Game, E: Evaluator<G> + ?Sized> Evaluator<G> for Box<E> {
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation> {
        (**self).evaluate(game, state)
    }
}

/// Uniform distribution over the legal actions at `state`.
fn uniform_policy<G: Game>(game: &G, state: &G::State) -> Vec<f32> {
    let legal_actions = game.legal_actions(state);
    let mut policy = vec![0.0; game.num_actions()];
    if !legal_actions.is_empty() {
        let prior = 1.0 / legal_actions.len() as f32;
        for action in legal_actions {
            policy[game.action_to_index(action)] = prior;
        }
    }
    policy
}

/// Evaluator with uniform priors and a neutral value.
///
/// Search guided by this evaluator is driven purely by terminal results.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformEvaluator;

impl<G: Game> Evaluator<G> for UniformEvaluator {
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation> {
        Ok(Evaluation {
            policy: uniform_policy(game, state),
            value: 0.0,
        })
    }
}

/// Evaluator using uniform prior and random rollouts.
///
/// - Policy: uniform distribution over legal actions
/// - Value: result of a random playout from the position
///
/// The playout RNG is seeded from `seed` and the hash of the state, so the
/// same position always gets the same value.
#[derive(Clone, Debug)]
pub struct RolloutEvaluator {
    seed: u64,

    /// Maximum plies in a playout; unfinished playouts score 0.
    max_rollout_depth: usize,
}

impl RolloutEvaluator {
    /// Create a new rollout evaluator.
    ///
    /// # Arguments
    /// * `seed` - Base seed mixed with each state's hash
    /// * `max_rollout_depth` - Maximum moves in a random playout
    pub fn new(seed: u64, max_rollout_depth: usize) -> Self {
        Self {
            seed,
            max_rollout_depth,
        }
    }

    fn rng_for<S: Hash>(&self, state: &S) -> ChaCha8Rng {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        ChaCha8Rng::seed_from_u64(self.seed ^ hasher.finish())
    }

    /// Perform a random rollout from the given state.
    ///
    /// Returns the game outcome from the perspective of the player
    /// who was to move at the start of the rollout.
    fn rollout<G: Game>(&self, game: &G, initial_state: &G::State) -> Result<f32> {
        let mut rng = self.rng_for(initial_state);
        let mover = game.to_move(initial_state);
        let mut state = initial_state.clone();

        for _ in 0..self.max_rollout_depth {
            if game.is_terminal(&state) {
                break;
            }
            let legal_actions = game.legal_actions(&state);
            if legal_actions.is_empty() {
                break;
            }
            let action = legal_actions[rng.gen_range(0..legal_actions.len())];
            state = game.apply(&state, action)?;
        }

        // terminal_value is from the final side to move's perspective
        Ok(match game.terminal_value(&state) {
            Some(value) if game.to_move(&state) == mover => value,
            Some(value) => -value,
            None => 0.0,
        })
    }
}

impl<G: Game> Evaluator<G> for RolloutEvaluator {
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation> {
        Ok(Evaluation {
            policy: uniform_policy(game, state),
            value: self.rollout(game, state)?,
        })
    }
}
