//! Cliff walking gridworld.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tabula_core::{Action, DiscreteSpace, Env, State, Step};

/// Actions: up, right, down, left.
const UP: Action = 0;
const RIGHT: Action = 1;
const DOWN: Action = 2;
const LEFT: Action = 3;

const NROWS: usize = 4;
const NCOLS: usize = 12;
const START: State = 36;
const GOAL: State = 47;

/// Configuration of [`CliffWalk`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CliffWalkConfig {
    /// Steps before the episode truncates.
    pub max_steps: usize,
}

impl Default for CliffWalkConfig {
    fn default() -> Self {
        Self { max_steps: 200 }
    }
}

impl CliffWalkConfig {
    /// Sets the step budget of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Constructs [`CliffWalkConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CliffWalkConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// The 4x12 cliff walking gridworld.
///
/// The agent starts at the bottom-left corner; the goal sits at the
/// bottom-right, and the tiles between them are the cliff. Every step pays
/// -1. Walking into the cliff pays -100 and teleports back to the start
/// without ending the episode; only the goal is terminal. The shortest path
/// runs right along the cliff edge, which is what makes the environment
/// separate off-policy from on-policy learners: exploration near the edge
/// is expensive, and on-policy estimates absorb that cost.
///
/// Deterministic. States are `row * 12 + col`. Actions are up, right, down,
/// left.
pub struct CliffWalk {
    state: State,
    steps: usize,
    max_steps: usize,
}

impl CliffWalk {
    /// Number of rows and columns of the grid.
    pub fn shape(&self) -> (usize, usize) {
        (NROWS, NCOLS)
    }

    fn is_cliff(state: State) -> bool {
        state / NCOLS == NROWS - 1 && state != START && state != GOAL
    }

    fn next_cell(state: State, a: Action) -> State {
        let (row, col) = (state / NCOLS, state % NCOLS);
        let (row, col) = match a {
            UP => (row.saturating_sub(1), col),
            RIGHT => (row, (col + 1).min(NCOLS - 1)),
            DOWN => ((row + 1).min(NROWS - 1), col),
            LEFT => (row, col.saturating_sub(1)),
            _ => (row, col),
        };
        row * NCOLS + col
    }
}

impl Env for CliffWalk {
    type Config = CliffWalkConfig;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            state: START,
            steps: 0,
            max_steps: config.max_steps,
        })
    }

    fn reset(&mut self) -> Result<(State, Self::Info)> {
        self.state = START;
        self.steps = 0;
        Ok((START, ()))
    }

    fn step(&mut self, a: Action) -> Result<Step<Self>> {
        self.steps += 1;
        let next = Self::next_cell(self.state, a);
        let (obs, reward, is_terminated) = if Self::is_cliff(next) {
            (START, -100.0, false)
        } else if next == GOAL {
            (GOAL, -1.0, true)
        } else {
            (next, -1.0, false)
        };
        self.state = obs;
        let is_truncated = !is_terminated && self.steps >= self.max_steps;
        Ok(Step::new(obs, a, reward, is_terminated, is_truncated, ()))
    }

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace::new(4).expect("four movement actions")
    }

    fn num_states(&self) -> Option<usize> {
        Some(NROWS * NCOLS)
    }

    fn terminal_states(&self) -> Vec<State> {
        vec![GOAL]
    }
}
