#![warn(missing_docs)]
//! Core of the tabula tabular reinforcement learning library.
//!
//! This crate defines the engine the rest of the workspace plugs into:
//!
//! * [`Env`], the trait environments implement; [`dummy`] carries tiny test
//!   MDPs, real ones live in their own crates.
//! * [`ValueTable`] and [`ReturnLog`], the action-value storage.
//! * [`ExplorationPolicy`], greedy and epsilon-greedy selection with random
//!   tie-breaks and optional eligibility masks.
//! * [`Learner`], the tagged union of the four control algorithms
//!   (Q-Learning, SARSA, Double Q-Learning, Monte Carlo with exploring
//!   starts), built from serde configs.
//! * [`Trainer`] and [`Evaluator`], the episode loops for training and for
//!   greedy evaluation.
//! * [`TrainingStats`], per-episode accounting summarized into a
//!   [`Record`](record::Record).
pub mod dummy;
pub mod error;
pub mod record;

mod base;
pub use base::{Action, DiscreteSpace, Env, Info, State, Step};

mod table;
pub use table::{ReturnLog, ValueInit, ValueTable};

mod policy;
pub use policy::{EpsilonGreedy, ExplorationPolicy, Greedy};

mod learner;
pub use learner::{
    DoubleQLearning, DoubleQLearningConfig, Learner, LearnerConfig, MonteCarloEs,
    MonteCarloEsConfig, QLearning, QLearningConfig, Sarsa, SarsaConfig,
};

mod stats;
pub use stats::{EpisodeRecord, TrainingStats};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};

mod evaluator;
pub use evaluator::Evaluator;
