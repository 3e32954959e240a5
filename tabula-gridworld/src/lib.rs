#![warn(missing_docs)]
//! Gridworld environments for the tabula library.
//!
//! Two classic teaching environments implementing [`tabula_core::Env`]:
//!
//! * [`FrozenLake`], a stochastic grid where the agent tries to reach a
//!   goal tile without falling into holes; the slippery dynamics make it a
//!   good stress test for exploration.
//! * [`CliffWalk`], the deterministic cliff from the Q-Learning/SARSA
//!   comparison: the shortest path runs along a cliff of large negative
//!   reward.
mod cliff;
mod frozen_lake;

pub use cliff::{CliffWalk, CliffWalkConfig};
pub use frozen_lake::{FrozenLake, FrozenLakeConfig};
