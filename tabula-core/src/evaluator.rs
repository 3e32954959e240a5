//! Evaluate a trained [`Learner`].
use crate::base::Env;
use crate::learner::Learner;
use crate::record::Record;
use crate::stats::TrainingStats;
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};

/// Runs a trained learner greedily, without exploration or updates.
///
/// The evaluator owns its own environment, built from a config with its own
/// seed, so evaluation episodes never disturb the training environment's
/// state or its random sequence. Each `evaluate` call runs a fixed number of
/// episodes and reports their statistics.
pub struct Evaluator<E: Env> {
    /// Environment for evaluation.
    env: E,

    /// The number of episodes to run per evaluation.
    n_episodes: usize,

    /// Statistics of the latest evaluation.
    stats: TrainingStats,

    /// Random source for greedy tie-breaks.
    rng: StdRng,
}

impl<E: Env> Evaluator<E> {
    /// Constructs an evaluator running `n_episodes` episodes per call.
    pub fn new(config: &E::Config, seed: u64, n_episodes: usize) -> Result<Self> {
        let env = E::build(config, seed as i64)?;
        let stats = TrainingStats::new(&env.goal_states());
        Ok(Self {
            env,
            n_episodes,
            stats,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Evaluates the learner and returns the statistics of the episodes.
    ///
    /// Actions come from the learner's greedy policy; ties still break
    /// randomly. Tables are read, never written, so evaluation does not
    /// move the estimates. Episodes end on the environment's terminated or
    /// truncated signal.
    pub fn evaluate(&mut self, learner: &mut Learner) -> Result<Record> {
        self.stats.reset();
        for _ in 0..self.n_episodes {
            self.stats.reset_episode();
            let (mut state, _) = self.env.reset()?;
            loop {
                let action = learner.greedy_action(state, &mut self.rng)?;
                let step = self.env.step(action)?;
                self.stats.continue_episode(step.reward);
                state = step.obs;
                if step.is_done() {
                    break;
                }
            }
            self.stats.add_episode(state);
        }
        Ok(self.stats.calculate_statistics()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::DiscreteSpace;
    use crate::dummy::{TwoStateConfig, TwoStateMdp};
    use crate::learner::{LearnerConfig, QLearningConfig};
    use crate::policy::ExplorationPolicy;

    #[test]
    fn test_evaluation_follows_the_greedy_policy() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = LearnerConfig::QLearning(
            QLearningConfig::default()
                .learning_rate(1.0)
                .discount_factor(0.9)
                .explorer(ExplorationPolicy::epsilon_greedy(0.5)),
        );
        let space = DiscreteSpace::new(2).unwrap();
        let mut learner = config.build(space, Some(2), &[1], &mut rng).unwrap();

        // One hand-fed transition makes action 0 the greedy choice at state
        // 0; evaluation must then end every episode in one step.
        learner.observe(0, 0, 1.0, 1, None, &mut rng).unwrap();

        let mut evaluator: Evaluator<TwoStateMdp> =
            Evaluator::new(&TwoStateConfig::default(), 1, 5).unwrap();
        let record = evaluator.evaluate(&mut learner).unwrap();
        assert_eq!(record.get_scalar("num_episodes").unwrap(), 5.0);
        assert_eq!(record.get_scalar("mean_reward").unwrap(), 1.0);
        assert_eq!(record.get_scalar("mean_length").unwrap(), 1.0);
        assert_eq!(record.get_scalar("success_rate").unwrap(), 100.0);
    }

    #[test]
    fn test_evaluation_does_not_move_the_tables() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = LearnerConfig::QLearning(QLearningConfig::default());
        let space = DiscreteSpace::new(2).unwrap();
        let mut learner = config.build(space, Some(2), &[1], &mut rng).unwrap();
        learner.observe(0, 0, 1.0, 1, None, &mut rng).unwrap();
        let before = match &learner {
            Learner::QLearning(l) => l.table().row(0).unwrap().to_vec(),
            _ => unreachable!(),
        };

        let mut evaluator: Evaluator<TwoStateMdp> =
            Evaluator::new(&TwoStateConfig::default(), 1, 3).unwrap();
        evaluator.evaluate(&mut learner).unwrap();

        let after = match &learner {
            Learner::QLearning(l) => l.table().row(0).unwrap().to_vec(),
            _ => unreachable!(),
        };
        assert_eq!(before, after);
    }
}
