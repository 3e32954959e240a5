//! Tabular learning algorithms.
//!
//! Four control algorithms share the value-table and exploration machinery.
//! [`Learner`] bundles them behind one dispatch point so a single generic
//! trainer can drive any of them; which hooks matter differs per algorithm
//! and is documented on the variant modules.
mod double_q;
mod monte_carlo;
mod q_learning;
mod sarsa;

pub use double_q::{DoubleQLearning, DoubleQLearningConfig};
pub use monte_carlo::{MonteCarloEs, MonteCarloEsConfig};
pub use q_learning::{QLearning, QLearningConfig};
pub use sarsa::{Sarsa, SarsaConfig};

use crate::base::{Action, DiscreteSpace, State};
use crate::error::TabulaError;
use crate::table::ValueTable;
use anyhow::Result;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of a [`Learner`], one variant per algorithm.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum LearnerConfig {
    /// Off-policy temporal-difference control.
    QLearning(QLearningConfig),

    /// On-policy temporal-difference control.
    Sarsa(SarsaConfig),

    /// Two-table Q-Learning without maximization bias.
    DoubleQLearning(DoubleQLearningConfig),

    /// Monte Carlo control with exploring starts.
    MonteCarloEs(MonteCarloEsConfig),
}

impl LearnerConfig {
    /// Human-readable algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QLearning(_) => "Q-Learning",
            Self::Sarsa(_) => "SARSA",
            Self::DoubleQLearning(_) => "Double Q-Learning",
            Self::MonteCarloEs(_) => "Monte Carlo ES",
        }
    }

    /// Builds the learner for the given action space.
    ///
    /// `num_states` and `terminal_states` come from the environment; they
    /// select dense table storage and pin terminal rows at zero. Uniform
    /// table initialization draws from `rng`.
    pub fn build(
        &self,
        space: DiscreteSpace,
        num_states: Option<usize>,
        terminal_states: &[State],
        rng: &mut StdRng,
    ) -> Result<Learner, TabulaError> {
        match self {
            Self::QLearning(c) => Ok(Learner::QLearning(QLearning::build(
                c,
                space,
                num_states,
                terminal_states,
                rng,
            )?)),
            Self::Sarsa(c) => Ok(Learner::Sarsa(Sarsa::build(
                c,
                space,
                num_states,
                terminal_states,
                rng,
            )?)),
            Self::DoubleQLearning(c) => Ok(Learner::DoubleQLearning(DoubleQLearning::build(
                c,
                space,
                num_states,
                terminal_states,
                rng,
            )?)),
            Self::MonteCarloEs(c) => Ok(Learner::MonteCarloEs(MonteCarloEs::build(
                c,
                space,
                num_states,
                rng,
            )?)),
        }
    }

    /// Constructs [`LearnerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`LearnerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// A tabular learning algorithm.
///
/// The trainer drives a learner through four hooks per episode: an initial
/// [`first_action`](Self::first_action), then per step
/// [`select_action`](Self::select_action) and [`observe`](Self::observe),
/// and [`finish_episode`](Self::finish_episode) once the environment
/// signals the end. Temporal-difference variants update their tables inside
/// `observe`; Monte Carlo records the trajectory there and updates in
/// `finish_episode`.
pub enum Learner {
    /// Off-policy temporal-difference control.
    QLearning(QLearning),

    /// On-policy temporal-difference control.
    Sarsa(Sarsa),

    /// Two-table Q-Learning without maximization bias.
    DoubleQLearning(DoubleQLearning),

    /// Monte Carlo control with exploring starts.
    MonteCarloEs(MonteCarloEs),
}

impl Learner {
    /// Human-readable algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QLearning(_) => "Q-Learning",
            Self::Sarsa(_) => "SARSA",
            Self::DoubleQLearning(_) => "Double Q-Learning",
            Self::MonteCarloEs(_) => "Monte Carlo ES",
        }
    }

    /// Selects the first action of an episode.
    ///
    /// Monte Carlo draws it uniformly at random, its exploring start. The
    /// other algorithms select as in any other step.
    pub fn first_action(&mut self, s: State, rng: &mut StdRng) -> Result<Action, TabulaError> {
        match self {
            Self::MonteCarloEs(l) => Ok(l.exploring_start(rng)),
            _ => self.select_action(s, rng),
        }
    }

    /// Selects an action for `s` with the algorithm's exploration policy.
    pub fn select_action(&mut self, s: State, rng: &mut StdRng) -> Result<Action, TabulaError> {
        match self {
            Self::QLearning(l) => l.select_action(s, rng),
            Self::Sarsa(l) => l.select_action(s, rng),
            Self::DoubleQLearning(l) => l.select_action(s, rng),
            Self::MonteCarloEs(l) => l.select_action(s, rng),
        }
    }

    /// Selects the greedy action for `s`, ignoring exploration.
    ///
    /// Ties still break randomly. Evaluation runs select with this instead
    /// of [`select_action`](Self::select_action).
    pub fn greedy_action(&mut self, s: State, rng: &mut StdRng) -> Result<Action, TabulaError> {
        match self {
            Self::QLearning(l) => l.greedy_action(s, rng),
            Self::Sarsa(l) => l.greedy_action(s, rng),
            Self::DoubleQLearning(l) => l.greedy_action(s, rng),
            Self::MonteCarloEs(l) => l.greedy_action(s, rng),
        }
    }

    /// Whether [`observe`](Self::observe) needs the next action selected
    /// before it runs.
    ///
    /// True for the algorithms whose update couples to the behavior draw;
    /// the trainer then selects the next action first and passes it in.
    pub fn needs_next_action(&self) -> bool {
        matches!(self, Self::Sarsa(_) | Self::DoubleQLearning(_))
    }

    /// Feeds one transition `(s, a, r, s')` to the algorithm.
    ///
    /// `next_action` must be given when [`needs_next_action`]
    /// (Self::needs_next_action) is true.
    pub fn observe(
        &mut self,
        s: State,
        a: Action,
        reward: f64,
        next_state: State,
        next_action: Option<Action>,
        rng: &mut StdRng,
    ) -> Result<(), TabulaError> {
        match self {
            Self::QLearning(l) => {
                l.observe(s, a, reward, next_state, rng);
                Ok(())
            }
            Self::Sarsa(l) => {
                let next_action =
                    next_action.ok_or(TabulaError::NextActionRequired("SARSA"))?;
                l.observe(s, a, reward, next_state, next_action, rng);
                Ok(())
            }
            Self::DoubleQLearning(l) => {
                l.observe(s, a, reward, next_state, rng);
                Ok(())
            }
            Self::MonteCarloEs(l) => {
                l.observe(s, a, reward);
                Ok(())
            }
        }
    }

    /// Runs the algorithm's end-of-episode work.
    ///
    /// A no-op for the temporal-difference variants; Monte Carlo replays
    /// its recorded trajectory backward here.
    pub fn finish_episode(&mut self, rng: &mut StdRng) {
        if let Self::MonteCarloEs(l) = self {
            l.finish_episode(rng);
        }
    }

    /// Greedy probability vector per known state.
    ///
    /// Each vector is uniform over the actions tied for the maximal value,
    /// zero elsewhere. Double Q-Learning derives it from the sum of its two
    /// tables.
    pub fn policy(&self) -> HashMap<State, Vec<f64>> {
        match self {
            Self::QLearning(l) => greedy_policy(l.table()),
            Self::Sarsa(l) => greedy_policy(l.table()),
            Self::DoubleQLearning(l) => l.policy(),
            Self::MonteCarloEs(l) => greedy_policy(l.table()),
        }
    }
}

/// Uniform probabilities over the maximal entries of a row.
pub(crate) fn greedy_probabilities(row: &[f64]) -> Vec<f64> {
    let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let ties = row.iter().filter(|v| **v == max).count();
    row.iter()
        .map(|v| if *v == max { 1.0 / ties as f64 } else { 0.0 })
        .collect()
}

pub(crate) fn greedy_policy(table: &ValueTable) -> HashMap<State, Vec<f64>> {
    table
        .states()
        .into_iter()
        .filter_map(|s| table.row(s).map(|row| (s, greedy_probabilities(row))))
        .collect()
}

/// Range check shared by the learning-rate and discount-factor parameters.
pub(crate) fn check_positive_unit(name: &'static str, value: f64) -> Result<(), TabulaError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(TabulaError::InvalidHyperparameter {
            name,
            value,
            expected: "(0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_greedy_probabilities_split_ties() {
        assert_eq!(greedy_probabilities(&[1.0, 0.0, 1.0]), vec![0.5, 0.0, 0.5]);
        assert_eq!(greedy_probabilities(&[0.0, 2.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_config_yaml_roundtrip() -> Result<()> {
        use tempdir::TempDir;

        let config = LearnerConfig::QLearning(
            QLearningConfig::default()
                .learning_rate(0.5)
                .discount_factor(0.9),
        );

        let dir = TempDir::new("learner_config")?;
        let path = dir.path().join("q_learning.yaml");
        config.save(&path)?;
        let loaded = LearnerConfig::load(&path)?;
        assert_eq!(config, loaded);
        Ok(())
    }

    #[test]
    fn test_build_rejects_bad_hyperparameters() {
        let mut rng = StdRng::seed_from_u64(0);
        let space = DiscreteSpace::new(2).unwrap();
        let config = LearnerConfig::QLearning(QLearningConfig::default().learning_rate(0.0));
        assert!(config.build(space, None, &[], &mut rng).is_err());
        let config = LearnerConfig::Sarsa(SarsaConfig::default().discount_factor(1.5));
        assert!(config.build(space, None, &[], &mut rng).is_err());
    }
}
