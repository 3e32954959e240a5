//! Train a [`Learner`].
mod config;

use crate::base::{Env, State};
use crate::error::TabulaError;
use crate::learner::{Learner, LearnerConfig};
use crate::record::Record;
use crate::stats::TrainingStats;
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;

/// Phase of the episode state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Terminated,
    Truncated,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop and related objects.
///
/// # Training loop
///
/// `train(num_episodes)` resets the statistics, then runs `num_episodes`
/// episodes back to back. One episode:
///
/// 1. Reset [`Env`] and select the first action (the learner's exploring
///    start, if it has one).
/// 2. Do an environment step with the current action.
/// 3. Feed the reward to the in-progress episode statistics.
/// 4. If the learner bootstraps from the behavior draw (SARSA, Double
///    Q-Learning), select the next action now.
/// 5. Feed the transition to the learner, which updates its table(s).
/// 6. Transition the episode phase: Terminated or Truncated if the
///    environment said so, else Running; back to step 2 while Running. The
///    next action is the one from step 4 when taken, freshly selected
///    otherwise.
/// 7. Run the learner's end-of-episode hook (Monte Carlo replays the
///    trajectory backward here) and finalize the episode record, tagging it
///    successful iff the final state is one of the environment's goal
///    states.
///
/// # Interaction of objects
///
/// In [`Trainer::train()`], objects interact as shown below:
///
/// ```mermaid
/// graph LR
///     A[Learner]-->|Action|B[Env]
///     B -->|"Step&lt;E: Env&gt;"|A
///     B -->|reward|C[TrainingStats]
/// ```
///
/// All randomness of the run, the learner's draws and the derived seed of
/// the environment, comes from the single generator seeded with
/// [`TrainerConfig::seed`].
pub struct Trainer<E: Env> {
    /// Environment for training.
    env: E,

    /// The algorithm being trained.
    learner: Learner,

    /// Episode statistics of the current run.
    stats: TrainingStats,

    /// The single random source of the run.
    rng: StdRng,

    /// Interval of logging progress in episodes.
    log_interval: usize,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    ///
    /// The environment is built first with a seed derived from the master
    /// seed. Its terminal states pin the learner's value-table rows at
    /// zero; its goal states classify finished episodes.
    pub fn build(
        config: TrainerConfig,
        env_config: E::Config,
        learner_config: LearnerConfig,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let env = E::build(&env_config, config.seed.wrapping_add(1) as i64)?;
        let terminal_states = env.terminal_states();
        let learner =
            learner_config.build(env.action_space(), env.num_states(), &terminal_states, &mut rng)?;
        let stats = TrainingStats::new(&env.goal_states());
        info!("Built {} trainer", learner.name());
        Ok(Self {
            env,
            learner,
            stats,
            rng,
            log_interval: config.log_interval,
        })
    }

    /// Trains the learner for `num_episodes` episodes and returns the
    /// summary statistics of the run.
    ///
    /// The statistics reset when training starts and keep accumulating
    /// until the next `train` call; `num_episodes` of zero leaves nothing
    /// to summarize and fails like any other empty-run query.
    pub fn train(&mut self, num_episodes: usize) -> Result<Record> {
        info!(
            "Starts training {} for {} episodes",
            self.learner.name(),
            num_episodes
        );
        self.stats.reset();
        for episode in 1..=num_episodes {
            self.run_episode()?;
            if episode % self.log_interval == 0 {
                info!(
                    "{}: episode {} / {}",
                    self.learner.name(),
                    episode,
                    num_episodes
                );
            }
        }
        Ok(self.stats.calculate_statistics()?)
    }

    /// Runs a single training episode.
    pub fn run_episode(&mut self) -> Result<()> {
        self.stats.reset_episode();
        let (mut state, _) = self.env.reset()?;
        let mut action = self.learner.first_action(state, &mut self.rng)?;
        let mut phase = Phase::Running;

        while phase == Phase::Running {
            let step = self.env.step(action)?;
            self.stats.continue_episode(step.reward);

            // On-policy bootstraps need the behavior draw before the update.
            let next_action = if self.learner.needs_next_action() {
                Some(self.learner.select_action(step.obs, &mut self.rng)?)
            } else {
                None
            };
            self.learner
                .observe(state, action, step.reward, step.obs, next_action, &mut self.rng)?;

            state = step.obs;
            phase = if step.is_terminated {
                Phase::Terminated
            } else if step.is_truncated {
                Phase::Truncated
            } else {
                Phase::Running
            };
            if phase == Phase::Running {
                action = match next_action {
                    Some(a) => a,
                    None => self.learner.select_action(state, &mut self.rng)?,
                };
            }
        }

        self.learner.finish_episode(&mut self.rng);
        self.stats.add_episode(state);
        Ok(())
    }

    /// Summary statistics of the episodes trained so far.
    pub fn calculate_statistics(&self) -> Result<Record, TabulaError> {
        self.stats.calculate_statistics()
    }

    /// Greedy probability vector per known state of the trained learner.
    pub fn policy(&self) -> HashMap<State, Vec<f64>> {
        self.learner.policy()
    }

    /// The learner being trained.
    pub fn learner(&self) -> &Learner {
        &self.learner
    }

    /// The trained learner, consuming the trainer.
    pub fn into_learner(self) -> Learner {
        self.learner
    }

    /// Statistics of the current run.
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }
}
