//! Learned action values respect the discounted-return bounds.
//!
//! FrozenLake rewards live in [0, 1] and gamma is 0.9, so every return is
//! bounded by 1 / (1 - 0.9) = 10. Whatever any of the four learners does
//! during training, no finite table entry may leave [0, 10]. Monte Carlo's
//! never-observed entries stay at the -inf sentinel and are skipped.
use tabula::{
    DoubleQLearningConfig, ExplorationPolicy, FrozenLake, FrozenLakeConfig, Learner,
    LearnerConfig, MonteCarloEsConfig, QLearningConfig, SarsaConfig, Trainer, TrainerConfig,
    ValueTable,
};

const EPISODES: usize = 300;
const GAMMA: f64 = 0.9;
const UPPER_BOUND: f64 = 10.0;

fn train(learner_config: LearnerConfig) -> Learner {
    let mut trainer: Trainer<FrozenLake> = Trainer::build(
        TrainerConfig::default().seed(3),
        FrozenLakeConfig::default(),
        learner_config,
    )
    .unwrap();
    trainer.train(EPISODES).unwrap();
    trainer.into_learner()
}

fn assert_bounded(table: &ValueTable) {
    for s in table.states() {
        for &v in table.row(s).unwrap() {
            if v.is_finite() {
                assert!(
                    (-1e-9..=UPPER_BOUND + 1e-9).contains(&v),
                    "value {} at state {} out of bounds",
                    v,
                    s
                );
            }
        }
    }
}

fn td_explorer() -> ExplorationPolicy {
    ExplorationPolicy::epsilon_greedy(0.2)
}

#[test]
fn test_q_learning_values_are_bounded() {
    let learner = train(LearnerConfig::QLearning(
        QLearningConfig::default()
            .discount_factor(GAMMA)
            .explorer(td_explorer()),
    ));
    match learner {
        Learner::QLearning(l) => assert_bounded(l.table()),
        _ => unreachable!(),
    }
}

#[test]
fn test_sarsa_values_are_bounded() {
    let learner = train(LearnerConfig::Sarsa(
        SarsaConfig::default()
            .discount_factor(GAMMA)
            .explorer(td_explorer()),
    ));
    match learner {
        Learner::Sarsa(l) => assert_bounded(l.table()),
        _ => unreachable!(),
    }
}

#[test]
fn test_double_q_values_are_bounded() {
    let learner = train(LearnerConfig::DoubleQLearning(
        DoubleQLearningConfig::default()
            .discount_factor(GAMMA)
            .explorer(td_explorer()),
    ));
    match learner {
        Learner::DoubleQLearning(l) => {
            assert_bounded(l.table_a());
            assert_bounded(l.table_b());
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_monte_carlo_values_are_bounded() {
    let learner = train(LearnerConfig::MonteCarloEs(
        MonteCarloEsConfig::default().discount_factor(GAMMA),
    ));
    match learner {
        Learner::MonteCarloEs(l) => assert_bounded(l.table()),
        _ => unreachable!(),
    }
}
