//! Exploration policies over action values.
use crate::base::{Action, DiscreteSpace};
use crate::error::TabulaError;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Exploration policies of the tabular learners.
///
/// A policy reads one row of action values, the row of the state being acted
/// from, so callers are free to hand it a single table's row or a combined
/// one.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum ExplorationPolicy {
    /// Greedy action selection.
    Greedy(Greedy),

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),
}

impl ExplorationPolicy {
    /// Constructs a greedy policy.
    pub fn greedy() -> Self {
        Self::Greedy(Greedy::new())
    }

    /// Constructs an epsilon-greedy policy.
    pub fn epsilon_greedy(epsilon: f64) -> Self {
        Self::EpsilonGreedy(EpsilonGreedy::new(epsilon))
    }

    /// Selects an action for the given row of action values.
    pub fn select(
        &self,
        values: &[f64],
        space: &DiscreteSpace,
        mask: Option<&[u8]>,
        rng: &mut StdRng,
    ) -> Result<Action, TabulaError> {
        match self {
            Self::Greedy(p) => p.select(values, space, mask, rng),
            Self::EpsilonGreedy(p) => p.select(values, space, mask, rng),
        }
    }

    /// Exploration probability, zero for the greedy policy.
    pub fn epsilon(&self) -> f64 {
        match self {
            Self::Greedy(_) => 0.0,
            Self::EpsilonGreedy(p) => p.epsilon,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), TabulaError> {
        let eps = self.epsilon();
        if !(0.0..=1.0).contains(&eps) {
            return Err(TabulaError::InvalidHyperparameter {
                name: "epsilon",
                value: eps,
                expected: "[0, 1]",
            });
        }
        Ok(())
    }
}

impl Default for ExplorationPolicy {
    fn default() -> Self {
        Self::epsilon_greedy(0.1)
    }
}

/// Greedy action selection.
///
/// Ties are broken by a uniform draw over all maximal actions, not by the
/// lowest index. Deterministic tie-breaking skews learned policies in
/// symmetric environments.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Greedy {}

#[allow(clippy::new_without_default)]
impl Greedy {
    /// Constructs a greedy policy.
    pub fn new() -> Self {
        Self {}
    }

    /// Selects uniformly among the maximal-value actions eligible under
    /// `mask`.
    ///
    /// The maximum is taken over the whole row; a mask that excludes every
    /// maximal action leaves nothing to select and is an error.
    pub fn select(
        &self,
        values: &[f64],
        space: &DiscreteSpace,
        mask: Option<&[u8]>,
        rng: &mut StdRng,
    ) -> Result<Action, TabulaError> {
        let all;
        let mask = match mask {
            Some(m) => m,
            None => {
                all = vec![1u8; space.n()];
                &all
            }
        };
        space.eligible(mask)?;
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let tied: Vec<u8> = values
            .iter()
            .zip(mask.iter())
            .map(|(v, m)| u8::from(*m != 0 && *v == max))
            .collect();
        space.sample_masked(rng, &tied)
    }
}

/// Epsilon-greedy action selection.
///
/// With probability `epsilon` the action is drawn uniformly from the
/// eligible set, ignoring values; otherwise selection is greedy. `epsilon`
/// of zero degenerates to [`Greedy`], one to uniform random.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Exploration probability in `[0, 1]`.
    pub epsilon: f64,
}

impl EpsilonGreedy {
    /// Constructs an epsilon-greedy policy.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Selects an action, exploring with probability `epsilon`.
    pub fn select(
        &self,
        values: &[f64],
        space: &DiscreteSpace,
        mask: Option<&[u8]>,
        rng: &mut StdRng,
    ) -> Result<Action, TabulaError> {
        if rng.gen::<f64>() < self.epsilon {
            match mask {
                Some(m) => space.sample_masked(rng, m),
                None => Ok(space.sample(rng)),
            }
        } else {
            Greedy::new().select(values, space, mask, rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn space(n: usize) -> DiscreteSpace {
        DiscreteSpace::new(n).unwrap()
    }

    #[test]
    fn test_greedy_picks_the_maximum() {
        let mut rng = StdRng::seed_from_u64(1);
        let policy = ExplorationPolicy::greedy();
        for _ in 0..50 {
            let a = policy
                .select(&[0.0, 3.0, 1.0], &space(3), None, &mut rng)
                .unwrap();
            assert_eq!(a, 1);
        }
    }

    #[test]
    fn test_greedy_breaks_ties_uniformly() {
        let mut rng = StdRng::seed_from_u64(7);
        let policy = Greedy::new();
        let mut hits = [0usize; 2];
        for _ in 0..10_000 {
            let a = policy
                .select(&[1.0, 1.0, 0.0], &space(3), None, &mut rng)
                .unwrap();
            assert!(a < 2);
            hits[a] += 1;
        }
        // Binomial(10_000, 0.5) stays within a few hundred of 5_000.
        assert!(hits[0] > 4_700 && hits[0] < 5_300, "hits = {:?}", hits);
    }

    #[test]
    fn test_greedy_intersects_mask_with_maximal_set() {
        let mut rng = StdRng::seed_from_u64(3);
        let policy = Greedy::new();
        for _ in 0..50 {
            let a = policy
                .select(&[5.0, 5.0, 1.0], &space(3), Some(&[0, 1, 1]), &mut rng)
                .unwrap();
            assert_eq!(a, 1);
        }
    }

    #[test]
    fn test_greedy_fails_when_mask_excludes_all_maxima() {
        let mut rng = StdRng::seed_from_u64(3);
        let policy = Greedy::new();
        assert!(policy
            .select(&[9.0, 1.0], &space(2), Some(&[0, 1]), &mut rng)
            .is_err());
    }

    #[test]
    fn test_epsilon_one_explores_uniformly() {
        let mut rng = StdRng::seed_from_u64(11);
        let policy = EpsilonGreedy::new(1.0);
        let mut seen = [false; 2];
        for _ in 0..200 {
            let a = policy
                .select(&[0.0, 100.0], &space(2), None, &mut rng)
                .unwrap();
            seen[a] = true;
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn test_epsilon_zero_is_greedy() {
        let mut rng = StdRng::seed_from_u64(11);
        let policy = EpsilonGreedy::new(0.0);
        for _ in 0..50 {
            let a = policy
                .select(&[0.0, 2.0, 1.0], &space(3), None, &mut rng)
                .unwrap();
            assert_eq!(a, 1);
        }
    }

    #[test]
    fn test_epsilon_out_of_range_is_rejected() {
        assert!(ExplorationPolicy::epsilon_greedy(1.5).validate().is_err());
        assert!(ExplorationPolicy::epsilon_greedy(-0.1).validate().is_err());
        assert!(ExplorationPolicy::greedy().validate().is_ok());
    }
}
