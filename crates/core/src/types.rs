//! Engine domain types with enforced invariants.
//!
//! - Policy: probability distribution over action indices summing to 1.0
//! - Value: position value in range [-1, 1]

use crate::{ReversiError, Result};

/// Tolerance for policy sum validation.
const POLICY_SUM_TOLERANCE: f32 = 1e-4;

/// A probability distribution over action indices.
///
/// Invariant: all entries are finite, non-negative and sum to 1.0 (±1e-4).
///
/// # Example
/// ```
/// use reversi_core::Policy;
///
/// let policy = Policy::masked(&[0.2, 0.5, 0.3], &[0, 2]).unwrap();
/// assert_eq!(policy.get_or_zero(1), 0.0);
/// assert!((policy.sum() - 1.0).abs() < 1e-5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Policy(Vec<f32>);

impl Policy {
    /// Create a policy from an already-normalized distribution.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidPolicy` if the vector is empty, holds a
    /// negative or non-finite entry, or does not sum to 1.0.
    pub fn new(probs: Vec<f32>) -> Result<Self> {
        check_entries(&probs)?;

        let sum: f32 = probs.iter().sum();
        if (sum - 1.0).abs() > POLICY_SUM_TOLERANCE {
            return Err(ReversiError::InvalidPolicy(format!(
                "policy sum {} is not 1.0 (tolerance {})",
                sum, POLICY_SUM_TOLERANCE
            )));
        }

        Ok(Self(probs))
    }

    /// Restrict a raw distribution to the `legal` indices and renormalize.
    ///
    /// Mass on illegal indices is dropped. This is the only correction the
    /// search applies to evaluator output.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidPolicy` if `raw` holds a negative or
    /// non-finite entry, a legal index is out of range, or the legal indices
    /// carry no probability mass at all or so much that the sum overflows.
    pub fn masked(raw: &[f32], legal: &[usize]) -> Result<Self> {
        check_entries(raw)?;

        let mut probs = vec![0.0; raw.len()];
        let mut mass = 0.0;
        for &index in legal {
            let p = *raw.get(index).ok_or_else(|| {
                ReversiError::InvalidPolicy(format!(
                    "legal action index {} outside policy of length {}",
                    index,
                    raw.len()
                ))
            })?;
            probs[index] = p;
            mass += p;
        }

        if mass <= 0.0 {
            return Err(ReversiError::InvalidPolicy(
                "no probability mass on legal actions".to_string(),
            ));
        }
        if !mass.is_finite() {
            return Err(ReversiError::InvalidPolicy(
                "probability mass on legal actions overflows".to_string(),
            ));
        }

        for p in &mut probs {
            *p /= mass;
        }
        Ok(Self(probs))
    }

    /// Uniform distribution over `legal` indices of a `num_actions` vector.
    ///
    /// # Errors
    /// Returns error if `legal` is empty or holds an out-of-range index.
    pub fn uniform(num_actions: usize, legal: &[usize]) -> Result<Self> {
        Self::masked(&vec![1.0; num_actions], legal)
    }

    /// Softmax over `logits`, restricted to the `legal` indices.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidPolicy` if a legal logit is non-finite,
    /// a legal index is out of range, or `legal` is empty.
    pub fn softmax_masked(logits: &[f32], legal: &[usize]) -> Result<Self> {
        let mut max = f32::NEG_INFINITY;
        for &index in legal {
            match logits.get(index) {
                Some(l) if l.is_finite() => max = max.max(*l),
                Some(l) => {
                    return Err(ReversiError::InvalidPolicy(format!(
                        "non-finite logit {} at index {}",
                        l, index
                    )))
                }
                None => {
                    return Err(ReversiError::InvalidPolicy(format!(
                        "legal action index {} outside logits of length {}",
                        index,
                        logits.len()
                    )))
                }
            }
        }

        let mut exps = vec![0.0; logits.len()];
        for &index in legal {
            exps[index] = (logits[index] - max).exp();
        }
        Self::masked(&exps, legal)
    }

    /// Get the probability at the given index, returning 0 if out of bounds.
    pub fn get_or_zero(&self, index: usize) -> f32 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    /// Number of action indices covered by this policy.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the policy is empty (never true for a constructed policy).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all probabilities (~1.0).
    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Index of the highest probability, lowest index on ties.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.0.iter().enumerate() {
            if p > self.0[best] {
                best = i;
            }
        }
        best
    }

    /// Consume the policy, returning the dense vector.
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Borrow the dense probabilities.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl std::ops::Index<usize> for Policy {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

fn check_entries(probs: &[f32]) -> Result<()> {
    if probs.is_empty() {
        return Err(ReversiError::InvalidPolicy(
            "policy cannot be empty".to_string(),
        ));
    }
    if let Some((i, p)) = probs
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(ReversiError::InvalidPolicy(format!(
            "entry {} at index {} is negative or non-finite",
            p, i
        )));
    }
    Ok(())
}

/// A position value estimate.
///
/// Invariant: value is in range [-1, 1], from the perspective of the side to
/// move:
/// - +1 certain win
/// - -1 certain loss
/// - 0 tie or balanced position
///
/// # Example
/// ```
/// use reversi_core::Value;
///
/// let value = Value::new(0.5).unwrap();
/// assert_eq!(value.negate().get(), -0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value(f32);

impl Value {
    /// Value for a win.
    pub const WIN: Self = Self(1.0);

    /// Value for a loss.
    pub const LOSS: Self = Self(-1.0);

    /// Value for a tie.
    pub const TIE: Self = Self(0.0);

    /// Create a new value.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidValue` if the value is NaN or outside [-1, 1].
    pub fn new(value: f32) -> Result<Self> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(ReversiError::InvalidValue(format!(
                "value {} is outside range [-1, 1]",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Create a value by clamping to [-1, 1].
    ///
    /// For accumulated floating point results that can drift past the bounds.
    /// NaN maps to a tie.
    pub fn clamped(value: f32) -> Self {
        if value.is_nan() {
            Self::TIE
        } else {
            Self(value.clamp(-1.0, 1.0))
        }
    }

    /// Get the underlying value.
    pub fn get(self) -> f32 {
        self.0
    }

    /// The same value seen by the opponent.
    pub fn negate(self) -> Self {
        Self(-self.0)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<Value> for f32 {
    fn from(v: Value) -> f32 {
        v.0
    }
}
