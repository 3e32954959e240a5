//! Trains the four tabular learners on a gridworld with shared
//! hyperparameters, evaluates each greedily, and prints the ranking plus an
//! arrow map of every learned policy.
use anyhow::{bail, Result};
use clap::Parser;
use std::collections::HashMap;
use tabula::{
    record::{Record, RecordValue},
    CliffWalk, CliffWalkConfig, DoubleQLearningConfig, Env, Evaluator, ExplorationPolicy,
    FrozenLake, FrozenLakeConfig, LearnerConfig, MonteCarloEsConfig, QLearningConfig, SarsaConfig,
    State, Trainer, TrainerConfig,
};

#[derive(Parser, Debug)]
#[command(version, name = "compare")]
struct Args {
    /// Environment: "cliff" or "frozen-lake".
    #[arg(long, default_value = "cliff")]
    env: String,

    /// Training episodes per learner.
    #[arg(long, default_value_t = 2000)]
    episodes: usize,

    /// Greedy evaluation episodes per learner.
    #[arg(long, default_value_t = 100)]
    eval_episodes: usize,

    /// Master seed of each run.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Exploration probability during training.
    #[arg(long, default_value_t = 0.1)]
    epsilon: f64,

    /// Learning rate of the temporal-difference learners.
    #[arg(long, default_value_t = 0.1)]
    alpha: f64,

    /// Discount factor.
    #[arg(long, default_value_t = 0.99)]
    gamma: f64,

    /// Slippery dynamics for the frozen lake.
    #[arg(long, default_value_t = false)]
    slippery: bool,
}

fn learner_configs(args: &Args) -> Vec<LearnerConfig> {
    let explorer = ExplorationPolicy::epsilon_greedy(args.epsilon);
    vec![
        LearnerConfig::QLearning(
            QLearningConfig::default()
                .learning_rate(args.alpha)
                .discount_factor(args.gamma)
                .explorer(explorer.clone()),
        ),
        LearnerConfig::Sarsa(
            SarsaConfig::default()
                .learning_rate(args.alpha)
                .discount_factor(args.gamma)
                .explorer(explorer.clone()),
        ),
        LearnerConfig::DoubleQLearning(
            DoubleQLearningConfig::default()
                .learning_rate(args.alpha)
                .discount_factor(args.gamma)
                .explorer(explorer),
        ),
        LearnerConfig::MonteCarloEs(MonteCarloEsConfig::default().discount_factor(args.gamma)),
    ]
}

/// Renders a greedy policy as one arrow per grid cell.
fn arrow_map(
    policy: &HashMap<State, Vec<f64>>,
    shape: (usize, usize),
    arrows: [char; 4],
) -> String {
    let (nrows, ncols) = shape;
    let mut out = String::new();
    for row in 0..nrows {
        for col in 0..ncols {
            let arrow = policy
                .get(&(row * ncols + col))
                .map(|probs| {
                    let best = probs
                        .iter()
                        .enumerate()
                        .max_by(|a, b| a.1.partial_cmp(b.1).expect("finite probabilities"))
                        .map(|(a, _)| a)
                        .unwrap_or(0);
                    arrows[best]
                })
                .unwrap_or('.');
            out.push(arrow);
        }
        out.push('\n');
    }
    out
}

fn run<E: Env>(
    env_config: E::Config,
    args: &Args,
    shape: (usize, usize),
    arrows: [char; 4],
) -> Result<()> {
    let mut results: Vec<(Record, String)> = Vec::new();

    for learner_config in learner_configs(args) {
        let name = learner_config.name();
        let trainer_config = TrainerConfig::default()
            .seed(args.seed)
            .log_interval((args.episodes / 4).max(1));
        let mut trainer: Trainer<E> =
            Trainer::build(trainer_config, env_config.clone(), learner_config)?;
        let train_record = trainer.train(args.episodes)?;
        println!(
            "{}: trained {} episodes, mean training reward {:.3}",
            name,
            args.episodes,
            train_record.get_scalar("mean_reward")?,
        );

        let mut learner = trainer.into_learner();
        let mut evaluator: Evaluator<E> =
            Evaluator::new(&env_config, args.seed.wrapping_add(1000), args.eval_episodes)?;
        let mut eval_record = evaluator.evaluate(&mut learner)?;
        eval_record.insert("algorithm", RecordValue::String(name.to_string()));
        let map = arrow_map(&learner.policy(), shape, arrows);
        results.push((eval_record, map));
    }

    results.sort_by(|a, b| {
        let ra = a.0.get_scalar("mean_reward").expect("mean_reward");
        let rb = b.0.get_scalar("mean_reward").expect("mean_reward");
        rb.partial_cmp(&ra).expect("finite rewards")
    });

    println!("\nGreedy evaluation over {} episodes:", args.eval_episodes);
    println!(
        "{:>4}  {:<18} {:>12} {:>10} {:>12} {:>12}",
        "rank", "algorithm", "mean_reward", "reward_std", "mean_length", "success_rate"
    );
    for (rank, (record, _)) in results.iter().enumerate() {
        println!(
            "{:>4}  {:<18} {:>12.3} {:>10.3} {:>12.1} {:>11.1}%",
            rank + 1,
            record.get_string("algorithm")?,
            record.get_scalar("mean_reward")?,
            record.get_scalar("reward_std")?,
            record.get_scalar("mean_length")?,
            record.get_scalar("success_rate")?,
        );
    }

    for (record, map) in &results {
        println!("\n{} greedy policy:\n{}", record.get_string("algorithm")?, map);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.env.as_str() {
        // Arrows follow each environment's action order.
        "cliff" => run::<CliffWalk>(
            CliffWalkConfig::default(),
            &args,
            (4, 12),
            ['^', '>', 'v', '<'],
        ),
        "frozen-lake" => run::<FrozenLake>(
            FrozenLakeConfig::default().is_slippery(args.slippery),
            &args,
            (4, 4),
            ['<', 'v', '>', '^'],
        ),
        env => bail!("Unknown environment {:?}", env),
    }
}
