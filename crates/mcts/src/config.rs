//! MCTS configuration parameters.
//!
//! These parameters control the behavior of the search and of the player's
//! move selection. Defaults favour competitive play: greedy selection and no
//! root noise.

use reversi_core::{ReversiError, Result};
use serde::{Deserialize, Serialize};

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Number of simulations per decision. Must be positive.
    pub num_simulations: usize,

    /// PUCT exploration constant.
    /// score(a) = Q(a) + c_puct * P(a) * sqrt(N_parent) / (1 + N(a))
    pub c_puct: f32,

    /// Temperature for action selection.
    /// - 0.0: always pick the most visited action (ties to lowest index)
    /// - 1.0: sample proportional to visit counts
    /// - other: sample proportional to N^(1/temperature)
    pub temperature: f32,

    /// Number of decisions after which the temperature drops to 0 (greedy).
    /// Set to 0 to always use the configured temperature.
    pub temperature_drop_move: usize,

    /// Dirichlet noise alpha for root exploration.
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior replaced with Dirichlet noise.
    /// 0 disables noise.
    pub exploration_fraction: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 400,
            c_puct: 5.0,
            temperature: 0.0,
            temperature_drop_move: 0,
            dirichlet_alpha: 0.3,
            exploration_fraction: 0.0,
        }
    }
}

impl MctsConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Create a config for evaluation (greedy action selection, no noise).
    pub fn for_evaluation(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            temperature: 0.0,
            temperature_drop_move: 0,
            exploration_fraction: 0.0,
            ..Default::default()
        }
    }

    /// Create a config for self-play: proportional sampling for the opening
    /// decisions, then greedy, with root noise throughout.
    pub fn for_selfplay(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            temperature: 1.0,
            temperature_drop_move: 15,
            exploration_fraction: 0.25,
            ..Default::default()
        }
    }

    /// Get the effective temperature for a given move number.
    pub fn effective_temperature(&self, move_number: usize) -> f32 {
        if self.temperature_drop_move > 0 && move_number >= self.temperature_drop_move {
            0.0
        } else {
            self.temperature
        }
    }

    /// Whether root Dirichlet noise is enabled.
    pub fn uses_root_noise(&self) -> bool {
        self.exploration_fraction > 0.0
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidConfig` naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        if self.num_simulations == 0 {
            return Err(ReversiError::InvalidConfig(
                "num_simulations must be positive".to_string(),
            ));
        }
        if !(self.c_puct.is_finite() && self.c_puct > 0.0) {
            return Err(ReversiError::InvalidConfig(format!(
                "c_puct must be positive and finite, got {}",
                self.c_puct
            )));
        }
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(ReversiError::InvalidConfig(format!(
                "temperature must be non-negative and finite, got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.exploration_fraction) {
            return Err(ReversiError::InvalidConfig(format!(
                "exploration_fraction must be in [0, 1], got {}",
                self.exploration_fraction
            )));
        }
        if self.uses_root_noise() && !(self.dirichlet_alpha.is_finite() && self.dirichlet_alpha > 0.0)
        {
            return Err(ReversiError::InvalidConfig(format!(
                "dirichlet_alpha must be positive when noise is enabled, got {}",
                self.dirichlet_alpha
            )));
        }
        Ok(())
    }
}
