//! Linear policy-value model over the two-plane observation.
//!
//! `policy = softmax(W·x + b)` restricted to legal actions and
//! `value = tanh(w·x + c)`. Weights are stored as JSON so a trainer in any
//! language can produce them.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{ensure, Context};
use reversi_core::{Game, Policy, ReversiError, Result};
use reversi_mcts::{Evaluation, Evaluator};
use reversi_othello::observation::{observation_size, OPPONENT_PLANE, OWN_PLANE};
use reversi_othello::{Board, Othello};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::heuristic::positional_weight;

/// Weights of a linear policy-value model for one board size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Board dimension N.
    pub size: usize,

    /// Row-major `(N² + 1) x 2N²` policy weights.
    pub policy_weights: Vec<f32>,

    /// One bias per action index, pass last.
    pub policy_bias: Vec<f32>,

    /// `2N²` value weights.
    pub value_weights: Vec<f32>,

    pub value_bias: f32,
}

impl LinearModel {
    /// All-zero model: uniform priors and a neutral value.
    pub fn zeros(size: usize) -> Self {
        let inputs = observation_size(size);
        let actions = size * size + 1;
        Self {
            size,
            policy_weights: vec![0.0; actions * inputs],
            policy_bias: vec![0.0; actions],
            value_weights: vec![0.0; inputs],
            value_bias: 0.0,
        }
    }

    /// Model seeded from the positional table: priors follow cell weights,
    /// value follows the positional balance.
    pub fn positional(size: usize) -> Self {
        let mut model = Self::zeros(size);
        let cells = size * size;
        let total: f32 = (0..cells).map(|c| positional_weight(size, c).abs()).sum();

        for cell in 0..cells {
            let w = positional_weight(size, cell);
            model.policy_bias[cell] = w;
            model.value_weights[OWN_PLANE * cells + cell] = 2.0 * w / total;
            model.value_weights[OPPONENT_PLANE * cells + cell] = -2.0 * w / total;
        }
        model
    }

    pub fn num_inputs(&self) -> usize {
        observation_size(self.size)
    }

    pub fn num_actions(&self) -> usize {
        self.size * self.size + 1
    }

    /// Check that every weight vector matches the board size.
    pub fn validate(&self) -> anyhow::Result<()> {
        let (inputs, actions) = (self.num_inputs(), self.num_actions());
        ensure!(
            self.policy_weights.len() == actions * inputs,
            "policy_weights has {} entries, expected {} x {}",
            self.policy_weights.len(),
            actions,
            inputs
        );
        ensure!(
            self.policy_bias.len() == actions,
            "policy_bias has {} entries, expected {}",
            self.policy_bias.len(),
            actions
        );
        ensure!(
            self.value_weights.len() == inputs,
            "value_weights has {} entries, expected {}",
            self.value_weights.len(),
            inputs
        );
        let all_finite = self
            .policy_weights
            .iter()
            .chain(&self.policy_bias)
            .chain(&self.value_weights)
            .chain(std::iter::once(&self.value_bias))
            .all(|w| w.is_finite());
        ensure!(all_finite, "model contains non-finite weights");
        Ok(())
    }

    /// Load and validate a model from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open model file {:?}", path))?;
        let model: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse model file {:?}", path))?;
        model
            .validate()
            .with_context(|| format!("Invalid model in {:?}", path))?;
        debug!(?path, size = model.size, "loaded linear model");
        Ok(model)
    }

    /// Write the model as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create model file {:?}", path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)
            .with_context(|| format!("Failed to write model file {:?}", path))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush model file {:?}", path))?;
        Ok(())
    }

    /// Raw policy logits and pre-activation value for an observation.
    pub fn forward(&self, observation: &[f32]) -> (Vec<f32>, f32) {
        let inputs = self.num_inputs();
        let logits = self
            .policy_weights
            .chunks_exact(inputs)
            .zip(&self.policy_bias)
            .map(|(row, bias)| dot(row, observation) + bias)
            .collect();
        let value = dot(&self.value_weights, observation) + self.value_bias;
        (logits, value)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Evaluator backed by a [`LinearModel`].
#[derive(Clone, Debug)]
pub struct LinearEvaluator {
    model: LinearModel,
}

impl LinearEvaluator {
    /// # Errors
    /// Returns `ReversiError::InvalidConfig` if the weights do not fit the
    /// model's board size.
    pub fn new(model: LinearModel) -> Result<Self> {
        model
            .validate()
            .map_err(|e| ReversiError::InvalidConfig(format!("{:#}", e)))?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }
}

impl Evaluator<Othello> for LinearEvaluator {
    fn evaluate(&self, game: &Othello, state: &Board) -> Result<Evaluation> {
        if state.size() != self.model.size {
            return Err(ReversiError::InvalidConfig(format!(
                "model for {0}x{0} boards used on a {1}x{1} board",
                self.model.size,
                state.size()
            )));
        }

        let (logits, value) = self.model.forward(&game.observe(state));

        // Mask illegal actions and renormalize
        let legal: Vec<usize> = game
            .legal_actions(state)
            .into_iter()
            .map(|a| game.action_to_index(a))
            .collect();
        let policy = Policy::softmax_masked(&logits, &legal)?;

        Ok(Evaluation {
            policy: policy.into_inner(),
            value: value.tanh(),
        })
    }
}
