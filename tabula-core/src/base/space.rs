//! Discrete action space.
use super::Action;
use crate::error::TabulaError;
use rand::{rngs::StdRng, Rng};

/// A fixed-size discrete action space `{0, .., n - 1}`.
///
/// Sampling is uniform, optionally restricted by an eligibility mask of
/// length `n` whose nonzero entries mark selectable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscreteSpace {
    n: usize,
}

impl DiscreteSpace {
    /// Creates a space with `n` actions.
    pub fn new(n: usize) -> Result<Self, TabulaError> {
        if n == 0 {
            return Err(TabulaError::EmptyActionSpace);
        }
        Ok(Self { n })
    }

    /// Number of actions in the space.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Samples an action uniformly.
    pub fn sample(&self, rng: &mut StdRng) -> Action {
        rng.gen_range(0..self.n)
    }

    /// Samples uniformly among the actions whose mask entry is nonzero.
    pub fn sample_masked(&self, rng: &mut StdRng, mask: &[u8]) -> Result<Action, TabulaError> {
        let eligible = self.eligible(mask)?;
        Ok(eligible[rng.gen_range(0..eligible.len())])
    }

    /// Indices of the actions selectable under `mask`.
    pub(crate) fn eligible(&self, mask: &[u8]) -> Result<Vec<Action>, TabulaError> {
        if mask.len() != self.n {
            return Err(TabulaError::MaskLengthMismatch {
                mask_len: mask.len(),
                n: self.n,
            });
        }
        let eligible: Vec<Action> = (0..self.n).filter(|&a| mask[a] != 0).collect();
        if eligible.is_empty() {
            return Err(TabulaError::NoEligibleAction);
        }
        Ok(eligible)
    }
}
