//! This module is used for tests.
//!
//! The environments here are tiny, fully known MDPs. Unit and integration
//! tests run the learners against them and check the resulting tables
//! against hand-computed values.
use crate::base::{Action, DiscreteSpace, Env, State, Step};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Configuration of [`TwoStateMdp`].
#[derive(Clone, Debug)]
pub struct TwoStateConfig {
    /// Steps before the episode truncates.
    pub max_steps: usize,
}

impl Default for TwoStateConfig {
    fn default() -> Self {
        Self { max_steps: 100 }
    }
}

/// A deterministic MDP with two states and two actions.
///
/// In state 0, action 0 moves to the terminal state 1 with reward 1 and
/// action 1 stays in state 0 with reward 0. Episodes truncate after
/// `max_steps` steps.
pub struct TwoStateMdp {
    state: State,
    steps: usize,
    max_steps: usize,
}

impl Env for TwoStateMdp {
    type Config = TwoStateConfig;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            state: 0,
            steps: 0,
            max_steps: config.max_steps,
        })
    }

    fn reset(&mut self) -> Result<(State, Self::Info)> {
        self.state = 0;
        self.steps = 0;
        Ok((0, ()))
    }

    fn step(&mut self, a: Action) -> Result<Step<Self>> {
        self.steps += 1;
        let (obs, reward, is_terminated) = if a == 0 { (1, 1.0, true) } else { (0, 0.0, false) };
        self.state = obs;
        let is_truncated = !is_terminated && self.steps >= self.max_steps;
        Ok(Step::new(obs, a, reward, is_terminated, is_truncated, ()))
    }

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace::new(2).expect("two actions")
    }

    fn num_states(&self) -> Option<usize> {
        Some(2)
    }

    fn terminal_states(&self) -> Vec<State> {
        vec![1]
    }
}

/// Configuration of [`NoisyMdp`].
#[derive(Clone, Debug, Default)]
pub struct NoisyMdpConfig {}

/// An MDP that exposes Q-Learning's maximization bias.
///
/// Both actions in state 0 move to state 1 with no reward. Both actions in
/// state 1 terminate: action 0 pays +1 or -1 by a fair coin, action 1 pays
/// nothing. Every action value is zero in expectation, so any persistent
/// positive estimate at state 0 is bias from maximizing over noise.
pub struct NoisyMdp {
    state: State,
    rng: StdRng,
}

impl Env for NoisyMdp {
    type Config = NoisyMdpConfig;
    type Info = ();

    fn build(_config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            state: 0,
            rng: StdRng::seed_from_u64(seed as u64),
        })
    }

    fn reset(&mut self) -> Result<(State, Self::Info)> {
        self.state = 0;
        Ok((0, ()))
    }

    fn step(&mut self, a: Action) -> Result<Step<Self>> {
        let step = match self.state {
            0 => Step::new(1, a, 0.0, false, false, ()),
            _ => {
                let reward = match a {
                    0 => {
                        if self.rng.gen::<bool>() {
                            1.0
                        } else {
                            -1.0
                        }
                    }
                    _ => 0.0,
                };
                Step::new(2, a, reward, true, false, ())
            }
        };
        self.state = step.obs;
        Ok(step)
    }

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace::new(2).expect("two actions")
    }

    fn num_states(&self) -> Option<usize> {
        Some(3)
    }

    fn terminal_states(&self) -> Vec<State> {
        vec![2]
    }
}
