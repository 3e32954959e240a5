//! Monte Carlo control with exploring starts.
use super::check_positive_unit;
use crate::base::{Action, DiscreteSpace, State};
use crate::error::TabulaError;
use crate::policy::{ExplorationPolicy, Greedy};
use crate::table::{ReturnLog, ValueInit, ValueTable};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration of [`MonteCarloEs`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MonteCarloEsConfig {
    /// Discount factor in `(0, 1]`.
    pub discount_factor: f64,

    /// Update each (state, action) pair at most once per episode.
    /// Every-visit updating when false.
    pub first_visit: bool,

    /// Policy for the steps after the exploring start.
    pub explorer: ExplorationPolicy,
}

impl Default for MonteCarloEsConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.99,
            first_visit: false,
            // The exploring starts provide the exploration; greedy selection
            // over a fresh all-negative-infinity row degenerates to a
            // uniform draw anyway.
            explorer: ExplorationPolicy::greedy(),
        }
    }
}

impl MonteCarloEsConfig {
    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets first-visit updating.
    pub fn first_visit(mut self, v: bool) -> Self {
        self.first_visit = v;
        self
    }

    /// Sets the policy used after the exploring start.
    pub fn explorer(mut self, v: ExplorationPolicy) -> Self {
        self.explorer = v;
        self
    }

    fn validate(&self) -> Result<(), TabulaError> {
        check_positive_unit("discount_factor", self.discount_factor)?;
        self.explorer.validate()
    }
}

/// Monte Carlo control with exploring starts.
///
/// The value table starts at negative infinity, the sentinel for "no return
/// observed yet"; an action keeps losing greedy comparisons until a real
/// return lands on it. The first action of each episode is drawn uniformly
/// at random, the trajectory and rewards are recorded as the episode runs,
/// and once the environment signals the end the trajectory is replayed
/// backward, accumulating the discounted return `U ← γ·U + r` and folding
/// it into the return log. A step's return depends on every reward after
/// it, which is why the pass cannot run forward.
pub struct MonteCarloEs {
    discount_factor: f64,
    first_visit: bool,
    explorer: ExplorationPolicy,
    space: DiscreteSpace,
    table: ValueTable,
    returns: ReturnLog,
    trajectory: Vec<(State, Action)>,
    rewards: Vec<f64>,
}

impl MonteCarloEs {
    pub(super) fn build(
        config: &MonteCarloEsConfig,
        space: DiscreteSpace,
        num_states: Option<usize>,
        rng: &mut StdRng,
    ) -> Result<Self, TabulaError> {
        config.validate()?;
        let table = ValueTable::new(space.n(), ValueInit::NegInfinity, num_states, &[], rng);
        Ok(Self {
            discount_factor: config.discount_factor,
            first_visit: config.first_visit,
            explorer: config.explorer.clone(),
            space,
            table,
            returns: ReturnLog::new(),
            trajectory: Vec::new(),
            rewards: Vec::new(),
        })
    }

    /// Uniform random action, ignoring the table.
    pub(super) fn exploring_start(&self, rng: &mut StdRng) -> Action {
        self.space.sample(rng)
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

    /// Records the step; values only move in
    /// [`finish_episode`](Self::finish_episode).
    pub(super) fn observe(&mut self, s: State, a: Action, reward: f64) {
        self.trajectory.push((s, a));
        self.rewards.push(reward);
    }

    /// Replays the recorded episode backward and updates the table.
    ///
    /// In first-visit mode a pair still present in the unprocessed prefix
    /// of the trajectory is skipped; the pass closest to the episode start
    /// is the one that counts.
    pub(super) fn finish_episode(&mut self, rng: &mut StdRng) {
        let mut ret = 0.0;
        while let (Some((s, a)), Some(reward)) = (self.trajectory.pop(), self.rewards.pop()) {
            ret = self.discount_factor * ret + reward;
            if !self.first_visit || !self.trajectory.contains(&(s, a)) {
                let mean = self.returns.append(s, a, ret);
                self.table.action_values_mut(s, rng)[a] = mean;
            }
        }
    }

    /// The learned value table.
    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    /// The log of observed returns.
    pub fn returns(&self) -> &ReturnLog {
        &self.returns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn learner(gamma: f64, first_visit: bool) -> (MonteCarloEs, StdRng) {
        let mut rng = StdRng::seed_from_u64(0);
        let config = MonteCarloEsConfig::default()
            .discount_factor(gamma)
            .first_visit(first_visit);
        let space = DiscreteSpace::new(2).unwrap();
        let l = MonteCarloEs::build(&config, space, None, &mut rng).unwrap();
        (l, rng)
    }

    #[test]
    fn test_backward_pass_discounts_returns() {
        let (mut l, mut rng) = learner(0.5, false);
        l.observe(0, 0, 1.0);
        l.observe(1, 0, 2.0);
        l.observe(2, 0, 4.0);
        l.finish_episode(&mut rng);

        assert_eq!(l.table().row(2).unwrap()[0], 4.0);
        assert_eq!(l.table().row(1).unwrap()[0], 4.0);
        assert_eq!(l.table().row(0).unwrap()[0], 3.0);
    }

    #[test]
    fn test_every_visit_appends_per_visit() {
        let (mut l, mut rng) = learner(1.0, false);
        l.observe(0, 0, 1.0);
        l.observe(0, 0, 1.0);
        l.observe(1, 0, 0.0);
        l.finish_episode(&mut rng);
        assert_eq!(l.returns().count(0, 0), 2);
    }

    #[test]
    fn test_first_visit_appends_once_per_episode() {
        let (mut l, mut rng) = learner(1.0, true);
        l.observe(0, 0, 1.0);
        l.observe(0, 0, 1.0);
        l.observe(1, 0, 0.0);
        l.finish_episode(&mut rng);
        assert_eq!(l.returns().count(0, 0), 1);
        // The surviving return is the one from the first visit, covering
        // both rewards.
        assert_eq!(l.table().row(0).unwrap()[0], 2.0);
    }

    #[test]
    fn test_means_accumulate_across_episodes() {
        let (mut l, mut rng) = learner(1.0, false);
        l.observe(0, 1, 2.0);
        l.finish_episode(&mut rng);
        l.observe(0, 1, 4.0);
        l.finish_episode(&mut rng);
        assert_eq!(l.table().row(0).unwrap()[1], 3.0);
        assert_eq!(l.returns().count(0, 1), 2);
    }

    #[test]
    fn test_unobserved_action_stays_at_negative_infinity() {
        let (mut l, mut rng) = learner(1.0, false);
        l.observe(0, 1, -5.0);
        l.finish_episode(&mut rng);
        let row = l.table().row(0).unwrap();
        assert!(row[0].is_infinite() && row[0] < 0.0);
        // A real return, however poor, beats the sentinel.
        assert_eq!(super::super::greedy_probabilities(row), vec![0.0, 1.0]);
    }

    #[test]
    fn test_exploring_start_covers_the_space() {
        let (l, mut rng) = learner(1.0, false);
        let mut seen = [false; 2];
        for _ in 0..100 {
            seen[l.exploring_start(&mut rng)] = true;
        }
        assert!(seen[0] && seen[1]);
    }
}
