use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Max {max} reached")]
    GlassLimitReached { max: usize },

    #[error("Invalid speed multiplier: {multiplier}")]
    InvalidSpeed { multiplier: f64 },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invariant violated: {reason}")]
    InvariantViolation { reason: String },
}

/// Rejected capacity or goal input. Display strings are the messages shown
/// next to the input fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter capacity")]
    MissingCapacity,

    #[error("Enter goal time")]
    MissingGoal,

    #[error("Minutes: 0–59")]
    MinutesOutOfRange,

    #[error("Seconds: 0–59")]
    SecondsOutOfRange,

    #[error("Total must be > 0")]
    CapacityNotPositive,

    #[error("Goal must be > 0")]
    GoalNotPositive,

    #[error("Max {} minutes", .max_secs / 60)]
    CapacityTooLarge { max_secs: u64 },
}

pub type SimResult<T> = Result<T, SimError>;
