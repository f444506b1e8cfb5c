//! Othello policy-value evaluators.
//!
//! - [`HeuristicEvaluator`]: positional table priors, positional + mobility +
//!   disc balance value
//! - [`LinearEvaluator`]: a JSON-loadable linear model over the observation
//!   planes, masked and renormalized like a network's output would be

mod heuristic;
mod linear;

pub use heuristic::{positional_weight, HeuristicEvaluator};
pub use linear::{LinearEvaluator, LinearModel};
