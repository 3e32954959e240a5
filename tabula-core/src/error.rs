//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum TabulaError {
    /// Hyperparameter outside its documented range.
    #[error("Invalid hyperparameter {name} = {value}, expected {expected}")]
    InvalidHyperparameter {
        /// Name of the offending parameter.
        name: &'static str,

        /// Rejected value.
        value: f64,

        /// Documented range.
        expected: &'static str,
    },

    /// Action space without any action.
    #[error("Action space must have a positive number of actions")]
    EmptyActionSpace,

    /// Eligibility mask whose length disagrees with the action count.
    #[error("Eligibility mask has length {mask_len}, action space has {n} actions")]
    MaskLengthMismatch {
        /// Length of the given mask.
        mask_len: usize,

        /// Number of actions in the space.
        n: usize,
    },

    /// Eligibility mask that excludes every action.
    #[error("Eligibility mask excludes every action")]
    NoEligibleAction,

    /// Update invoked without the pre-selected next action it bootstraps
    /// from.
    #[error("{0} bootstraps from a pre-selected next action, none was given")]
    NextActionRequired(&'static str),

    /// Statistics requested before any episode completed.
    #[error("No episodes have been recorded, statistics are undefined")]
    EmptyRun,

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
