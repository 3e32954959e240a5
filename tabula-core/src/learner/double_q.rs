//! Double Q-Learning.
use super::{check_positive_unit, greedy_probabilities};
use crate::base::{Action, DiscreteSpace, State};
use crate::error::TabulaError;
use crate::policy::{ExplorationPolicy, Greedy};
use crate::table::{ValueInit, ValueTable};
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration of [`DoubleQLearning`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DoubleQLearningConfig {
    /// Learning rate in `(0, 1]`.
    pub learning_rate: f64,

    /// Discount factor in `(0, 1]`.
    pub discount_factor: f64,

    /// Behavior policy, applied to the sum of the two tables.
    pub explorer: ExplorationPolicy,
}

impl Default for DoubleQLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.99,
            explorer: ExplorationPolicy::default(),
        }
    }
}

impl DoubleQLearningConfig {
    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the behavior policy.
    pub fn explorer(mut self, v: ExplorationPolicy) -> Self {
        self.explorer = v;
        self
    }

    fn validate(&self) -> Result<(), TabulaError> {
        check_positive_unit("learning_rate", self.learning_rate)?;
        check_positive_unit("discount_factor", self.discount_factor)?;
        self.explorer.validate()
    }
}

/// Q-Learning with two tables updated in random alternation.
///
/// An unbiased coin picks the table to update. The chosen table supplies
/// the argmax action at the next state, the other table supplies the value
/// bootstrapped from: `a* = argmax_a A(s')[a]`, `target = r + γ·B(s')[a*]`.
/// Decorrelating the action choice from the value estimate removes the
/// maximization bias a single table suffers from.
///
/// Behavior selection and the final policy both read the sum of the two
/// tables, never either one alone.
pub struct DoubleQLearning {
    learning_rate: f64,
    discount_factor: f64,
    explorer: ExplorationPolicy,
    space: DiscreteSpace,
    table_a: ValueTable,
    table_b: ValueTable,
}

impl DoubleQLearning {
    pub(super) fn build(
        config: &DoubleQLearningConfig,
        space: DiscreteSpace,
        num_states: Option<usize>,
        terminal_states: &[State],
        rng: &mut StdRng,
    ) -> Result<Self, TabulaError> {
        config.validate()?;
        let table_a = ValueTable::new(
            space.n(),
            ValueInit::Uniform,
            num_states,
            terminal_states,
            rng,
        );
        let table_b = ValueTable::new(
            space.n(),
            ValueInit::Uniform,
            num_states,
            terminal_states,
            rng,
        );
        Ok(Self {
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            explorer: config.explorer.clone(),
            space,
            table_a,
            table_b,
        })
    }

    pub(super) fn select_action(
        &mut self,
        s: State,
        rng: &mut StdRng,
    ) -> Result<Action, TabulaError> {
        let combined = self.combined_values(s, rng);
        self.explorer.select(&combined, &self.space, None, rng)
    }

    pub(super) fn greedy_action(
        &mut self,
        s: State,
        rng: &mut StdRng,
    ) -> Result<Action, TabulaError> {
        let combined = self.combined_values(s, rng);
        Greedy::new().select(&combined, &self.space, None, rng)
    }

    pub(super) fn observe(
        &mut self,
        s: State,
        a: Action,
        reward: f64,
        next_state: State,
        rng: &mut StdRng,
    ) {
        if rng.gen::<f64>() < 0.5 {
            Self::update(
                &mut self.table_a,
                &mut self.table_b,
                s,
                a,
                reward,
                next_state,
                self.learning_rate,
                self.discount_factor,
                rng,
            );
        } else {
            Self::update(
                &mut self.table_b,
                &mut self.table_a,
                s,
                a,
                reward,
                next_state,
                self.learning_rate,
                self.discount_factor,
                rng,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn update(
        primary: &mut ValueTable,
        secondary: &mut ValueTable,
        s: State,
        a: Action,
        reward: f64,
        next_state: State,
        learning_rate: f64,
        discount_factor: f64,
        rng: &mut StdRng,
    ) {
        let a_star = primary.argmax(next_state, rng);
        let next_q = secondary.action_values(next_state, rng)[a_star];
        let row = primary.action_values_mut(s, rng);
        let td_error = reward + discount_factor * next_q - row[a];
        row[a] += learning_rate * td_error;
    }

    /// Elementwise sum of the two tables' rows at `s`.
    pub(super) fn combined_values(&mut self, s: State, rng: &mut StdRng) -> Vec<f64> {
        let row_a = self.table_a.action_values(s, rng).to_vec();
        let row_b = self.table_b.action_values(s, rng);
        row_a.iter().zip(row_b.iter()).map(|(a, b)| a + b).collect()
    }

    pub(super) fn policy(&self) -> HashMap<State, Vec<f64>> {
        let mut states = self.table_a.states();
        for s in self.table_b.states() {
            if !states.contains(&s) {
                states.push(s);
            }
        }
        let n = self.space.n();
        states
            .into_iter()
            .map(|s| {
                let row_a = self.table_a.row(s);
                let row_b = self.table_b.row(s);
                // A row missing from one table counts as zero there.
                let combined: Vec<f64> = (0..n)
                    .map(|i| {
                        row_a.map_or(0.0, |r| r[i]) + row_b.map_or(0.0, |r| r[i])
                    })
                    .collect();
                (s, greedy_probabilities(&combined))
            })
            .collect()
    }

    /// The first of the two learned tables.
    pub fn table_a(&self) -> &ValueTable {
        &self.table_a
    }

    /// The second of the two learned tables.
    pub fn table_b(&self) -> &ValueTable {
        &self.table_b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn learner(alpha: f64, gamma: f64) -> (DoubleQLearning, StdRng) {
        let mut rng = StdRng::seed_from_u64(0);
        let config = DoubleQLearningConfig::default()
            .learning_rate(alpha)
            .discount_factor(gamma)
            .explorer(ExplorationPolicy::greedy());
        let space = DiscreteSpace::new(2).unwrap();
        let l = DoubleQLearning::build(&config, space, Some(3), &[2], &mut rng).unwrap();
        (l, rng)
    }

    #[test]
    fn test_update_crosses_tables() {
        let (mut l, mut rng) = learner(1.0, 0.5);
        {
            let row = l.table_a.action_values_mut(1, &mut rng);
            row[0] = 0.0;
            row[1] = 10.0;
        }
        {
            let row = l.table_b.action_values_mut(1, &mut rng);
            row[0] = 5.0;
            row[1] = 1.0;
        }
        l.table_a.action_values_mut(0, &mut rng)[0] = 0.0;

        // argmax comes from A, the bootstrapped value from B: the target is
        // 1 + 0.5 * B(1)[1] = 1.5, not 1 + 0.5 * A(1)[1] = 6.
        DoubleQLearning::update(
            &mut l.table_a,
            &mut l.table_b,
            0,
            0,
            1.0,
            1,
            1.0,
            0.5,
            &mut rng,
        );
        assert_eq!(l.table_a().row(0).unwrap()[0], 1.5);
    }

    #[test]
    fn test_selection_reads_the_combined_tables() {
        let (mut l, mut rng) = learner(0.5, 0.9);
        {
            let row = l.table_a.action_values_mut(0, &mut rng);
            row[0] = 3.0;
            row[1] = 0.0;
        }
        {
            let row = l.table_b.action_values_mut(0, &mut rng);
            row[0] = 0.0;
            row[1] = 2.0;
        }
        // Combined values are [3, 2]; B alone would prefer action 1.
        for _ in 0..20 {
            assert_eq!(l.select_action(0, &mut rng).unwrap(), 0);
        }
        let policy = l.policy();
        assert_eq!(policy[&0], vec![1.0, 0.0]);
    }

    #[test]
    fn test_coin_flip_touches_both_tables() {
        let (mut l, mut rng) = learner(0.5, 0.9);
        let a0 = l.table_a.action_values(0, &mut rng).to_vec();
        let b0 = l.table_b.action_values(0, &mut rng).to_vec();
        for _ in 0..100 {
            l.observe(0, 0, 1.0, 2, &mut rng);
        }
        assert_ne!(l.table_a().row(0).unwrap(), a0.as_slice());
        assert_ne!(l.table_b().row(0).unwrap(), b0.as_slice());
    }
}
