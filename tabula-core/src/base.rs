//! Core abstractions of the tabular engine.
mod env;
mod space;
mod step;
pub use env::Env;
pub use space::DiscreteSpace;
pub use step::{Info, Step};

/// A discrete state identifier.
///
/// States are opaque lookup keys into value tables; no ordering semantics
/// attach to them.
pub type State = usize;

/// A discrete action identifier in `[0, n)` for an `n`-sized action space.
pub type Action = usize;
