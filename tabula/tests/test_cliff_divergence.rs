//! Off-policy and on-policy control land on different cliff policies.
//!
//! Q-Learning bootstraps from the greedy maximum, so it learns the path
//! along the cliff edge regardless of how often exploration falls off it.
//! SARSA's estimates absorb the exploration falls, pushing its policy away
//! from the edge. Trained with the same seed and hyperparameters, the two
//! greedy policies must disagree somewhere.
use std::collections::HashMap;
use tabula::{
    CliffWalk, CliffWalkConfig, ExplorationPolicy, LearnerConfig, QLearningConfig, SarsaConfig,
    State, Trainer, TrainerConfig,
};

const EPISODES: usize = 2000;

fn train(learner_config: LearnerConfig) -> HashMap<State, Vec<f64>> {
    let mut trainer: Trainer<CliffWalk> = Trainer::build(
        TrainerConfig::default().seed(42),
        CliffWalkConfig::default(),
        learner_config,
    )
    .unwrap();
    trainer.train(EPISODES).unwrap();
    trainer.policy()
}

fn greedy_action(probs: &[f64]) -> usize {
    probs
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(a, _)| a)
        .unwrap()
}

#[test]
fn test_q_learning_and_sarsa_policies_diverge() {
    let explorer = ExplorationPolicy::epsilon_greedy(0.1);
    let q_policy = train(LearnerConfig::QLearning(
        QLearningConfig::default()
            .learning_rate(0.5)
            .discount_factor(0.99)
            .explorer(explorer.clone()),
    ));
    let sarsa_policy = train(LearnerConfig::Sarsa(
        SarsaConfig::default()
            .learning_rate(0.5)
            .discount_factor(0.99)
            .explorer(explorer),
    ));

    let disagreements = (0..48)
        .filter(|s| {
            greedy_action(&q_policy[s]) != greedy_action(&sarsa_policy[s])
        })
        .count();
    assert!(
        disagreements >= 1,
        "expected the greedy policies to differ in at least one state"
    );
}
