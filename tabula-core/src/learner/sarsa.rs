//! SARSA, on-policy temporal-difference control.
use super::check_positive_unit;
use crate::base::{Action, DiscreteSpace, State};
use crate::error::TabulaError;
use crate::policy::{ExplorationPolicy, Greedy};
use crate::table::{ValueInit, ValueTable};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration of [`Sarsa`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SarsaConfig {
    /// Learning rate in `(0, 1]`.
    pub learning_rate: f64,

    /// Discount factor in `(0, 1]`.
    pub discount_factor: f64,

    /// Behavior policy.
    pub explorer: ExplorationPolicy,
}

impl Default for SarsaConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.99,
            explorer: ExplorationPolicy::default(),
        }
    }
}

impl SarsaConfig {
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

/// SARSA over a single uniform-initialized value table.
///
/// The next action is drawn once, before the update, and serves both as
/// the bootstrap target `r + γ·Q(s')[a']` and as the action executed next.
/// Exploration noise therefore flows into the estimates; substituting the
/// maximum for `a'` would turn this into Q-Learning.
pub struct Sarsa {
    learning_rate: f64,
    discount_factor: f64,
    explorer: ExplorationPolicy,
    space: DiscreteSpace,
    table: ValueTable,
}

impl Sarsa {
    pub(super) fn build(
        config: &SarsaConfig,
        space: DiscreteSpace,
        num_states: Option<usize>,
        terminal_states: &[State],
        rng: &mut StdRng,
    ) -> Result<Self, TabulaError> {
        config.validate()?;
        let table = ValueTable::new(
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
        next_action: Action,
        rng: &mut StdRng,
    ) {
        let next_q = self.table.action_values(next_state, rng)[next_action];
        let row = self.table.action_values_mut(s, rng);
        let td_error = reward + self.discount_factor * next_q - row[a];
        row[a] += self.learning_rate * td_error;
    }

    /// The learned value table.
    pub fn table(&self) -> &ValueTable {
        &self.table
    }
}
