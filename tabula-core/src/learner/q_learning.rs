//! Q-Learning, off-policy temporal-difference control.
use super::check_positive_unit;
use crate::base::{Action, DiscreteSpace, State};
use crate::error::TabulaError;
use crate::policy::{ExplorationPolicy, Greedy};
use crate::table::{ValueInit, ValueTable};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration of [`QLearning`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct QLearningConfig {
    /// Learning rate in `(0, 1]`.
    pub learning_rate: f64,

    /// Discount factor in `(0, 1]`.
    pub discount_factor: f64,

    /// Behavior policy.
    pub explorer: ExplorationPolicy,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.99,
            explorer: ExplorationPolicy::default(),
        }
    }
}

impl QLearningConfig {
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

/// Q-Learning over a single zero-initialized value table.
///
/// Each transition updates the acted entry toward
/// `r + γ·max_a' Q(s')[a']`. Bootstrapping from the greedy maximum instead
/// of the action executed next is what makes the method off-policy; the
/// behavior policy only decides where the table gets visited.
pub struct QLearning {
    learning_rate: f64,
    discount_factor: f64,
    explorer: ExplorationPolicy,
    space: DiscreteSpace,
    table: ValueTable,
}

impl QLearning {
    pub(super) fn build(
        config: &QLearningConfig,
        space: DiscreteSpace,
        num_states: Option<usize>,
        terminal_states: &[State],
        rng: &mut StdRng,
    ) -> Result<Self, TabulaError> {
        config.validate()?;
        let table = ValueTable::new(space.n(), ValueInit::Zero, num_states, terminal_states, rng);
        Ok(Self {
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            explorer: config.explorer.clone(),
            space,
            table,
        })
    }

    pub(super) fn select_action(
        &mut self,
        s: State,
        rng: &mut StdRng,
    ) -> Result<Action, TabulaError> {
        let values = self.table.action_values(s, rng);
        self.explorer.select(values, &self.space, None, rng)
    }

    pub(super) fn greedy_action(
        &mut self,
        s: State,
        rng: &mut StdRng,
    ) -> Result<Action, TabulaError> {
        let values = self.table.action_values(s, rng);
        Greedy::new().select(values, &self.space, None, rng)
    }

    pub(super) fn observe(
        &mut self,
        s: State,
        a: Action,
        reward: f64,
        next_state: State,
        rng: &mut StdRng,
    ) {
        let max_next = self.table.max_value(next_state, rng);
        let row = self.table.action_values_mut(s, rng);
        let td_error = reward + self.discount_factor * max_next - row[a];
        row[a] += self.learning_rate * td_error;
    }

    /// The learned value table.
    pub fn table(&self) -> &ValueTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn learner(alpha: f64, gamma: f64) -> (QLearning, StdRng) {
        let mut rng = StdRng::seed_from_u64(0);
        let config = QLearningConfig::default()
            .learning_rate(alpha)
            .discount_factor(gamma)
            .explorer(ExplorationPolicy::greedy());
        let space = DiscreteSpace::new(2).unwrap();
        let l = QLearning::build(&config, space, Some(2), &[1], &mut rng).unwrap();
        (l, rng)
    }

    #[test]
    fn test_update_bootstraps_from_the_maximum() {
        let (mut l, mut rng) = learner(0.5, 0.9);

        // Terminal next state has a zero row, so the first target is the
        // raw reward.
        l.observe(0, 0, 1.0, 1, &mut rng);
        assert_eq!(l.table().row(0).unwrap()[0], 0.5);

        l.observe(0, 0, 1.0, 1, &mut rng);
        assert_eq!(l.table().row(0).unwrap()[0], 0.75);
    }

    #[test]
    fn test_bootstrap_uses_next_state_maximum() {
        let (mut l, mut rng) = learner(1.0, 0.5);
        l.table.action_values_mut(1, &mut rng)[0] = 2.0;
        l.table.action_values_mut(1, &mut rng)[1] = 6.0;

        l.observe(0, 1, 1.0, 1, &mut rng);
        // target = 1 + 0.5 * max(2, 6) = 4
        assert_eq!(l.table().row(0).unwrap()[1], 4.0);
    }

    #[test]
    fn test_greedy_selection_follows_updates() {
        let (mut l, mut rng) = learner(0.5, 0.9);
        l.observe(0, 1, 1.0, 1, &mut rng);
        for _ in 0..20 {
            assert_eq!(l.select_action(0, &mut rng).unwrap(), 1);
        }
    }
}
