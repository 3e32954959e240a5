//! Frozen lake gridworld.
use anyhow::{bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tabula_core::{Action, DiscreteSpace, Env, State, Step};

/// Actions: left, down, right, up.
const LEFT: Action = 0;
const DOWN: Action = 1;
const RIGHT: Action = 2;
const UP: Action = 3;

const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];
const MAP_8X8: [&str; 8] = [
    "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF", "FFFHFFFG",
];

/// Configuration of [`FrozenLake`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct FrozenLakeConfig {
    /// Map rows over the characters `S` (start), `F` (frozen), `H` (hole)
    /// and `G` (goal).
    pub map: Vec<String>,

    /// Whether moves slip to a perpendicular direction with probability 2/3.
    pub is_slippery: bool,

    /// Steps before the episode truncates.
    pub max_steps: usize,
}

impl Default for FrozenLakeConfig {
    fn default() -> Self {
        Self {
            map: MAP_4X4.iter().map(|r| r.to_string()).collect(),
            is_slippery: true,
            max_steps: 100,
        }
    }
}

impl FrozenLakeConfig {
    /// The 8x8 preset map, with a longer step budget to match.
    pub fn eight_by_eight() -> Self {
        Self {
            map: MAP_8X8.iter().map(|r| r.to_string()).collect(),
            max_steps: 200,
            ..Default::default()
        }
    }

    /// Sets the map rows.
    pub fn map(mut self, v: Vec<String>) -> Self {
        self.map = v;
        self
    }

    /// Sets slippery dynamics.
    pub fn is_slippery(mut self, v: bool) -> Self {
        self.is_slippery = v;
        self
    }

    /// Sets the step budget of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Constructs [`FrozenLakeConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`FrozenLakeConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// The frozen lake gridworld.
///
/// The agent walks a grid of frozen tiles from the start tile toward the
/// goal. Reaching the goal pays 1 and ends the episode; falling into a hole
/// ends it with nothing. With slippery dynamics each move goes in the
/// intended direction with probability 1/3 and slips to one of the two
/// perpendicular directions otherwise. Moves off the edge stay in place.
///
/// States are `row * ncols + col`. Actions are left, down, right, up.
pub struct FrozenLake {
    grid: Vec<Vec<u8>>,
    nrows: usize,
    ncols: usize,
    start: State,
    state: State,
    steps: usize,
    is_slippery: bool,
    max_steps: usize,
    rng: StdRng,
}

impl FrozenLake {
    /// Number of rows and columns of the grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    fn next_cell(&self, state: State, a: Action) -> State {
        let (row, col) = (state / self.ncols, state % self.ncols);
        let (row, col) = match a {
            LEFT => (row, col.saturating_sub(1)),
            DOWN => ((row + 1).min(self.nrows - 1), col),
            RIGHT => (row, (col + 1).min(self.ncols - 1)),
            UP => (row.saturating_sub(1), col),
            _ => (row, col),
        };
        row * self.ncols + col
    }
}

impl Env for FrozenLake {
    type Config = FrozenLakeConfig;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let grid: Vec<Vec<u8>> = config.map.iter().map(|r| r.as_bytes().to_vec()).collect();
        if grid.is_empty() || grid[0].is_empty() {
            bail!("Frozen lake map must not be empty");
        }
        let ncols = grid[0].len();
        if grid.iter().any(|r| r.len() != ncols) {
            bail!("Frozen lake map rows must all have the same length");
        }
        if let Some(&c) = grid
            .iter()
            .flatten()
            .find(|c| !matches!(c, b'S' | b'F' | b'H' | b'G'))
        {
            bail!("Invalid frozen lake map character {:?}", c as char);
        }
        let starts: Vec<State> = grid
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, &c)| c == b'S')
            .map(|(i, _)| i)
            .collect();
        if starts.len() != 1 {
            bail!("Frozen lake map must have exactly one start tile");
        }
        if !grid.iter().flatten().any(|&c| c == b'G') {
            bail!("Frozen lake map must have a goal tile");
        }

        Ok(Self {
            nrows: grid.len(),
            ncols,
            start: starts[0],
            state: starts[0],
            steps: 0,
            is_slippery: config.is_slippery,
            max_steps: config.max_steps,
            rng: StdRng::seed_from_u64(seed as u64),
            grid,
        })
    }

    fn reset(&mut self) -> Result<(State, Self::Info)> {
        self.state = self.start;
        self.steps = 0;
        Ok((self.state, ()))
    }

    fn step(&mut self, a: Action) -> Result<Step<Self>> {
        self.steps += 1;
        let direction = if self.is_slippery {
            // The intended direction and its two perpendiculars, 1/3 each.
            match self.rng.gen_range(0..3) {
                0 => (a + 3) % 4,
                1 => a,
                _ => (a + 1) % 4,
            }
        } else {
            a
        };
        let next = self.next_cell(self.state, direction);
        self.state = next;
        let (reward, is_terminated) = match self.grid[next / self.ncols][next % self.ncols] {
            b'G' => (1.0, true),
            b'H' => (0.0, true),
            _ => (0.0, false),
        };
        let is_truncated = !is_terminated && self.steps >= self.max_steps;
        Ok(Step::new(next, a, reward, is_terminated, is_truncated, ()))
    }

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace::new(4).expect("four movement actions")
    }

    fn num_states(&self) -> Option<usize> {
        Some(self.nrows * self.ncols)
    }

    fn terminal_states(&self) -> Vec<State> {
        // Holes end the episode too; their rows must stay at zero.
        self.grid
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, &c)| matches!(c, b'H' | b'G'))
            .map(|(i, _)| i)
            .collect()
    }

    fn goal_states(&self) -> Vec<State> {
        self.grid
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, &c)| c == b'G')
            .map(|(i, _)| i)
            .collect()
    }
}
