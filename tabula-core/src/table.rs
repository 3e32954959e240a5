//! Action-value tables.
use crate::base::{Action, State};
use rand::{rngs::StdRng, Rng};
use std::collections::HashMap;

/// Initialization applied to a state's action-value row when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInit {
    /// All zeros.
    Zero,

    /// Uniform random in `[0, 1)`.
    Uniform,

    /// Negative infinity, marking an action whose return has never been
    /// observed. Such an action loses every greedy comparison against one
    /// with a real estimate.
    NegInfinity,
}

impl ValueInit {
    fn row(&self, n: usize, rng: &mut StdRng) -> Vec<f64> {
        match self {
            ValueInit::Zero => vec![0.0; n],
            ValueInit::Uniform => (0..n).map(|_| rng.gen::<f64>()).collect(),
            ValueInit::NegInfinity => vec![f64::NEG_INFINITY; n],
        }
    }
}

/// Row storage. Dense tables allocate one row per state upfront; sparse
/// tables grow as states are queried.
#[derive(Debug, Clone)]
enum Rows {
    Dense(Vec<Vec<f64>>),
    Sparse(HashMap<State, Vec<f64>>),
}

/// Maps each state to a fixed-length vector of action values.
///
/// When the state count is known upfront the table is a flat row-per-state
/// array, fully initialized at construction. Otherwise it is a hash map
/// whose rows materialize with the table's initializer the first time a
/// state is queried. Terminal rows listed at construction are pinned to
/// zero; no reward accrues from a terminal state, and a nonzero row there
/// would corrupt every bootstrapped target that touches it.
#[derive(Debug, Clone)]
pub struct ValueTable {
    n_actions: usize,
    init: ValueInit,
    rows: Rows,
}

impl ValueTable {
    /// Creates a table for `n_actions` actions.
    ///
    /// `num_states` selects dense storage when known. Rows for
    /// `terminal_states` are created immediately and zero-filled.
    pub fn new(
        n_actions: usize,
        init: ValueInit,
        num_states: Option<usize>,
        terminal_states: &[State],
        rng: &mut StdRng,
    ) -> Self {
        let rows = match num_states {
            Some(n) => {
                let mut rows: Vec<Vec<f64>> =
                    (0..n).map(|_| init.row(n_actions, rng)).collect();
                for &s in terminal_states {
                    rows[s] = vec![0.0; n_actions];
                }
                Rows::Dense(rows)
            }
            None => {
                let mut rows = HashMap::new();
                for &s in terminal_states {
                    rows.insert(s, vec![0.0; n_actions]);
                }
                Rows::Sparse(rows)
            }
        };
        Self {
            n_actions,
            init,
            rows,
        }
    }

    /// Number of actions per row.
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Action values of `s`, creating the row if this is the first query.
    pub fn action_values(&mut self, s: State, rng: &mut StdRng) -> &[f64] {
        self.row_mut(s, rng)
    }

    /// Mutable action values of `s`.
    pub fn action_values_mut(&mut self, s: State, rng: &mut StdRng) -> &mut [f64] {
        self.row_mut(s, rng)
    }

    /// Maximum action value of `s`.
    pub fn max_value(&mut self, s: State, rng: &mut StdRng) -> f64 {
        self.row_mut(s, rng)
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of the maximal action value of `s`; the lowest index wins ties.
    ///
    /// This is the bootstrap-target argmax. Behavior-policy ties are broken
    /// randomly by the exploration policy instead.
    pub fn argmax(&mut self, s: State, rng: &mut StdRng) -> Action {
        let row = self.row_mut(s, rng);
        let mut best = 0;
        for a in 1..row.len() {
            if row[a] > row[best] {
                best = a;
            }
        }
        best
    }

    /// States with materialized rows. For dense tables this is every state.
    pub fn states(&self) -> Vec<State> {
        match &self.rows {
            Rows::Dense(rows) => (0..rows.len()).collect(),
            Rows::Sparse(rows) => rows.keys().cloned().collect(),
        }
    }

    /// Row of `s` without materializing it, `None` if it does not exist yet.
    pub fn row(&self, s: State) -> Option<&[f64]> {
        match &self.rows {
            Rows::Dense(rows) => rows.get(s).map(|r| r.as_slice()),
            Rows::Sparse(rows) => rows.get(&s).map(|r| r.as_slice()),
        }
    }

    fn row_mut(&mut self, s: State, rng: &mut StdRng) -> &mut Vec<f64> {
        let (n_actions, init) = (self.n_actions, self.init);
        match &mut self.rows {
            Rows::Dense(rows) => &mut rows[s],
            Rows::Sparse(rows) => rows
                .entry(s)
                .or_insert_with(|| init.row(n_actions, rng)),
        }
    }
}

/// Log of observed discounted returns per (state, action) pair.
///
/// Grows monotonically during Monte Carlo training. The value table holds
/// the running mean of each entry; this log is the source of truth it is
/// recomputed from.
#[derive(Debug, Clone, Default)]
pub struct ReturnLog {
    returns: HashMap<(State, Action), Vec<f64>>,
}

impl ReturnLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a return for `(s, a)` and gives back the updated mean.
    pub fn append(&mut self, s: State, a: Action, ret: f64) -> f64 {
        let entry = self.returns.entry((s, a)).or_insert_with(Vec::new);
        entry.push(ret);
        entry.iter().sum::<f64>() / entry.len() as f64
    }

    /// Number of returns logged for `(s, a)`.
    pub fn count(&self, s: State, a: Action) -> usize {
        self.returns.get(&(s, a)).map_or(0, |v| v.len())
    }
}
