//! Double Q-Learning resists the maximization bias.
//!
//! On [`NoisyMdp`] every action value is zero in expectation, but one
//! terminal action pays +1 or -1 by a coin flip. A single table maximizes
//! over its own noise when bootstrapping through the noisy state, so its
//! estimate upstream settles above zero. Double Q-Learning's cross-table
//! bootstrap decorrelates the argmax from the value and stays near zero.
use tabula::dummy::{NoisyMdp, NoisyMdpConfig};
use tabula::{
    DoubleQLearningConfig, ExplorationPolicy, Learner, LearnerConfig, QLearningConfig, Trainer,
    TrainerConfig,
};

const EPISODES: usize = 5000;
const ALPHA: f64 = 0.1;

fn trainer(learner_config: LearnerConfig) -> Trainer<NoisyMdp> {
    Trainer::build(
        TrainerConfig::default().seed(7),
        NoisyMdpConfig::default(),
        learner_config,
    )
    .unwrap()
}

fn row_max(row: &[f64]) -> f64 {
    row.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

#[test]
fn test_double_q_estimate_sits_closer_to_the_true_value() {
    // Uniform behavior visits both actions equally often.
    let explorer = ExplorationPolicy::epsilon_greedy(1.0);

    let mut single = trainer(LearnerConfig::QLearning(
        QLearningConfig::default()
            .learning_rate(ALPHA)
            .discount_factor(1.0)
            .explorer(explorer.clone()),
    ));
    single.train(EPISODES).unwrap();
    let single_estimate = match single.learner() {
        Learner::QLearning(l) => row_max(l.table().row(0).unwrap()),
        _ => unreachable!(),
    };

    let mut double = trainer(LearnerConfig::DoubleQLearning(
        DoubleQLearningConfig::default()
            .learning_rate(ALPHA)
            .discount_factor(1.0)
            .explorer(explorer),
    ));
    double.train(EPISODES).unwrap();
    let double_estimate = match double.learner() {
        Learner::DoubleQLearning(l) => {
            let row_a = l.table_a().row(0).unwrap();
            let row_b = l.table_b().row(0).unwrap();
            let mean: Vec<f64> = row_a
                .iter()
                .zip(row_b.iter())
                .map(|(a, b)| (a + b) / 2.0)
                .collect();
            row_max(&mean)
        }
        _ => unreachable!(),
    };

    // The true value of every action is zero.
    assert!(
        single_estimate > 0.0,
        "single-table estimate should be positively biased, got {}",
        single_estimate
    );
    assert!(
        double_estimate.abs() < single_estimate.abs(),
        "double estimate {} should sit closer to zero than single estimate {}",
        double_estimate,
        single_estimate
    );
}
