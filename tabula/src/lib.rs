//! A tabular reinforcement learning library in Rust.
//!
//! Tabula consists of the following crates:
//!
//! * [tabula-core](../tabula_core/index.html) provides the engine: the
//!   environment trait, value tables, exploration policies, the four
//!   tabular control algorithms (Q-Learning, SARSA, Double Q-Learning,
//!   Monte Carlo with exploring starts), the training and evaluation
//!   loops, and episode statistics.
//! * [tabula-gridworld](../tabula_gridworld/index.html) provides the
//!   FrozenLake and CliffWalk reference environments.
//! * `tabula` re-exports both and carries the comparison example and the
//!   cross-algorithm property tests.

pub use tabula_core::*;
pub use tabula_gridworld::{CliffWalk, CliffWalkConfig, FrozenLake, FrozenLakeConfig};
