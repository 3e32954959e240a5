//! Environment.
use super::{Action, DiscreteSpace, Info, State, Step};
use anyhow::Result;

/// Represents an environment, a discrete-state, discrete-action MDP.
///
/// The engine drives any type implementing this trait; grid worlds, queueing
/// toys and test fixtures all look the same to it.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment, starting a new episode.
    fn reset(&mut self) -> Result<(State, Self::Info)>;

    /// Performs an environment step.
    fn step(&mut self, a: Action) -> Result<Step<Self>>
    where
        Self: Sized;

    /// The action space of the environment.
    fn action_space(&self) -> DiscreteSpace;

    /// Number of states, when the state space is bounded and known upfront.
    ///
    /// Environments with sparse or unbounded state spaces return `None`;
    /// value tables then fall back to hash-map storage.
    fn num_states(&self) -> Option<usize> {
        None
    }

    /// States from which no further reward accrues.
    ///
    /// Value-table rows of these states are pinned at zero; a nonzero row
    /// would corrupt every bootstrapped target that touches it. This must
    /// cover every state an episode can terminate in, failure states
    /// included. Environments that cannot enumerate them return an empty
    /// vector.
    fn terminal_states(&self) -> Vec<State> {
        Vec::new()
    }

    /// The terminal states that count as successful outcomes.
    ///
    /// Finished episodes are classified against this set. Defaults to all
    /// of [`terminal_states`](Self::terminal_states); environments whose
    /// episodes can also end in failure states override it with the goal
    /// subset.
    fn goal_states(&self) -> Vec<State> {
        self.terminal_states()
    }
}
