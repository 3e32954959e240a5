//! Episode statistics of a training run.
use crate::base::State;
use crate::error::TabulaError;
use crate::record::{Record, RecordValue};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::time::{Duration, Instant};

fn mean(vs: &[f64]) -> f64 {
    vs.iter().sum::<f64>() / vs.len() as f64
}

fn std(vs: &[f64]) -> f64 {
    let m = mean(vs);
    (vs.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / vs.len() as f64).sqrt()
}

fn max(vs: &[f64]) -> f64 {
    vs.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v))
}

fn min(vs: &[f64]) -> f64 {
    vs.iter().fold(f64::INFINITY, |m, v| m.min(*v))
}

/// Outcome of a single finished episode.
#[derive(Debug, Clone)]
pub struct EpisodeRecord {
    /// Sum of rewards collected during the episode.
    pub cumulative_reward: f64,

    /// Number of environment steps taken.
    pub length: usize,

    /// Wall-clock duration of the episode.
    pub wall_time: Duration,

    /// Whether the episode finished in one of the goal states.
    pub terminal_state_reached: bool,
}

/// Accumulates per-episode outcomes over a training run.
///
/// A run starts with [`reset`](Self::reset). Within an episode, the driver
/// calls [`reset_episode`](Self::reset_episode) once, then
/// [`continue_episode`](Self::continue_episode) per environment step, then
/// [`add_episode`](Self::add_episode) with the final state. Episodes whose
/// final state is one of the goal states the aggregator was constructed
/// with count as successes; episodes that truncate or end in a failure
/// terminal count as failures.
///
/// Queries never consume logged data; the log only clears on the next
/// `reset`.
#[derive(Debug, Clone)]
pub struct TrainingStats {
    goal_states: HashSet<State>,
    episodes: Vec<EpisodeRecord>,
    total_reward: f64,
    episode_lengths: Vec<usize>,
    num_success: usize,
    num_failure: usize,
    duration: Duration,
    start_time: DateTime<Local>,
    run_started_at: Instant,
    episode_reward: f64,
    episode_length: usize,
    episode_started_at: Instant,
}

impl TrainingStats {
    /// Creates an aggregator classifying successes against the given goal
    /// states.
    pub fn new(goal_states: &[State]) -> Self {
        let now = Instant::now();
        Self {
            goal_states: goal_states.iter().cloned().collect(),
            episodes: Vec::new(),
            total_reward: 0.0,
            episode_lengths: Vec::new(),
            num_success: 0,
            num_failure: 0,
            duration: Duration::from_secs(0),
            start_time: Local::now(),
            run_started_at: now,
            episode_reward: 0.0,
            episode_length: 0,
            episode_started_at: now,
        }
    }

    /// Clears the episode log and running totals and restamps the run start.
    pub fn reset(&mut self) {
        self.episodes.clear();
        self.total_reward = 0.0;
        self.episode_lengths.clear();
        self.num_success = 0;
        self.num_failure = 0;
        self.duration = Duration::from_secs(0);
        self.start_time = Local::now();
        self.run_started_at = Instant::now();
        self.reset_episode();
    }

    /// Zeroes the in-progress episode counters.
    pub fn reset_episode(&mut self) {
        self.episode_reward = 0.0;
        self.episode_length = 0;
        self.episode_started_at = Instant::now();
    }

    /// Accounts for one environment step of the in-progress episode.
    pub fn continue_episode(&mut self, reward: f64) {
        self.episode_reward += reward;
        self.episode_length += 1;
    }

    /// Finalizes the in-progress episode, ended in `final_state`.
    pub fn add_episode(&mut self, final_state: State) {
        let success = self.goal_states.contains(&final_state);
        self.episodes.push(EpisodeRecord {
            cumulative_reward: self.episode_reward,
            length: self.episode_length,
            wall_time: self.episode_started_at.elapsed(),
            terminal_state_reached: success,
        });
        self.total_reward += self.episode_reward;
        self.episode_lengths.push(self.episode_length);
        if success {
            self.num_success += 1;
        } else {
            self.num_failure += 1;
        }
        self.duration = self.run_started_at.elapsed();
    }

    /// Number of logged episodes.
    pub fn num_episodes(&self) -> usize {
        self.episodes.len()
    }

    /// Logged episodes, in insertion order.
    pub fn episodes(&self) -> &[EpisodeRecord] {
        &self.episodes
    }

    /// Summary statistics over the logged run.
    ///
    /// # Errors
    ///
    /// [`TabulaError::EmptyRun`] when no episode has been logged; the mean
    /// and rate metrics are undefined then.
    pub fn calculate_statistics(&self) -> Result<Record, TabulaError> {
        let num_episodes = self.episodes.len();
        if num_episodes == 0 {
            return Err(TabulaError::EmptyRun);
        }

        let rewards: Vec<f64> = self.episodes.iter().map(|e| e.cumulative_reward).collect();
        let lengths: Vec<f64> = self.episodes.iter().map(|e| e.length as f64).collect();
        let success_rewards: Vec<f64> = self
            .episodes
            .iter()
            .filter(|e| e.terminal_state_reached)
            .map(|e| e.cumulative_reward)
            .collect();
        let failed_rewards: Vec<f64> = self
            .episodes
            .iter()
            .filter(|e| !e.terminal_state_reached)
            .map(|e| e.cumulative_reward)
            .collect();
        let episode_secs: Vec<f64> = self
            .episodes
            .iter()
            .map(|e| e.wall_time.as_secs_f64())
            .collect();

        let mut record = Record::from_slice(&[
            ("mean_reward", RecordValue::Scalar(mean(&rewards))),
            ("reward_std", RecordValue::Scalar(std(&rewards))),
            ("mean_length", RecordValue::Scalar(mean(&lengths))),
            ("length_std", RecordValue::Scalar(std(&lengths))),
            ("num_episodes", RecordValue::Scalar(num_episodes as f64)),
            ("max_reward", RecordValue::Scalar(max(&rewards))),
            ("min_reward", RecordValue::Scalar(min(&rewards))),
            (
                "num_success_episodes",
                RecordValue::Scalar(self.num_success as f64),
            ),
            (
                "success_rate",
                RecordValue::Scalar(self.num_success as f64 / num_episodes as f64 * 100.0),
            ),
            (
                "failure_rate",
                RecordValue::Scalar(self.num_failure as f64 / num_episodes as f64 * 100.0),
            ),
            ("duration", RecordValue::Scalar(self.duration.as_secs_f64())),
            (
                "mean_episode_duration",
                RecordValue::Scalar(mean(&episode_secs)),
            ),
        ]);
        let mean_success = if success_rewards.is_empty() {
            0.0
        } else {
            mean(&success_rewards)
        };
        let mean_failed = if failed_rewards.is_empty() {
            0.0
        } else {
            mean(&failed_rewards)
        };
        record.insert("mean_success_reward", RecordValue::Scalar(mean_success));
        record.insert("mean_failed_reward", RecordValue::Scalar(mean_failed));
        record.insert("start_time", RecordValue::DateTime(self.start_time));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_two_episodes() -> TrainingStats {
        let mut stats = TrainingStats::new(&[5]);
        stats.reset();

        stats.reset_episode();
        stats.continue_episode(1.0);
        stats.continue_episode(2.0);
        stats.add_episode(5);

        stats.reset_episode();
        stats.continue_episode(-1.0);
        stats.add_episode(3);

        stats
    }

    #[test]
    fn test_statistics_over_two_episodes() {
        let stats = run_two_episodes();
        let record = stats.calculate_statistics().unwrap();
        assert_eq!(record.get_scalar("num_episodes").unwrap(), 2.0);
        assert_eq!(record.get_scalar("mean_reward").unwrap(), 1.0);
        assert_eq!(record.get_scalar("reward_std").unwrap(), 2.0);
        assert_eq!(record.get_scalar("mean_length").unwrap(), 1.5);
        assert_eq!(record.get_scalar("max_reward").unwrap(), 3.0);
        assert_eq!(record.get_scalar("min_reward").unwrap(), -1.0);
        assert_eq!(record.get_scalar("num_success_episodes").unwrap(), 1.0);
        assert_eq!(record.get_scalar("success_rate").unwrap(), 50.0);
        assert_eq!(record.get_scalar("failure_rate").unwrap(), 50.0);
        assert_eq!(record.get_scalar("mean_success_reward").unwrap(), 3.0);
        assert_eq!(record.get_scalar("mean_failed_reward").unwrap(), -1.0);
    }

    #[test]
    fn test_statistics_are_idempotent() {
        let stats = run_two_episodes();
        let first = stats.calculate_statistics().unwrap();
        let second = stats.calculate_statistics().unwrap();
        for key in [
            "mean_reward",
            "reward_std",
            "mean_length",
            "length_std",
            "num_episodes",
            "max_reward",
            "min_reward",
            "num_success_episodes",
            "success_rate",
            "failure_rate",
            "duration",
            "mean_episode_duration",
            "mean_success_reward",
            "mean_failed_reward",
        ]
        .iter()
        {
            assert_eq!(
                first.get_scalar(key).unwrap(),
                second.get_scalar(key).unwrap(),
                "key = {}",
                key
            );
        }
    }

    #[test]
    fn test_empty_run_is_an_error() {
        let stats = TrainingStats::new(&[0]);
        assert!(stats.calculate_statistics().is_err());
    }

    #[test]
    fn test_reset_clears_previous_run() {
        let mut stats = run_two_episodes();
        stats.reset();
        assert_eq!(stats.num_episodes(), 0);
        assert!(stats.calculate_statistics().is_err());
    }
}
