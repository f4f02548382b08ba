//! Typed construction errors.
//!
//! Follows the same shape the rest of this workspace uses for errors: a
//! plain enum with `Display` and `std::error::Error` implemented by hand,
//! no derive macro. Construction errors are surfaced from an engine's
//! constructor, never from `run` — `run` itself is infallible except for
//! [`crate::parallel_idastar`], whose only failure mode is a panicking
//! worker thread.

/// Failure constructing an engine: null/absent required inputs or an
/// out-of-range tuning parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstructionError {
    /// `hMul < 1` was supplied to a best-first engine.
    HeuristicMultiplierTooSmall { supplied: f64 },
    /// Worker count `<= 0` was supplied to the parallel IDA* engine.
    WorkerCountNotPositive { supplied: i64 },
    /// Worker count above what fits in the token-ring identity type was
    /// supplied to the parallel IDA* engine.
    WorkerCountTooLarge { supplied: i64 },
    /// `maxSides < 0` was supplied to steepest descent.
    MaxSidesNegative { supplied: i64 },
}

impl std::fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeuristicMultiplierTooSmall { supplied } => {
                write!(f, "heuristic multiplier must be >= 1, got {supplied}")
            }
            Self::WorkerCountNotPositive { supplied } => {
                write!(f, "worker count must be > 0, got {supplied}")
            }
            Self::WorkerCountTooLarge { supplied } => {
                write!(f, "worker count must be <= 255, got {supplied}")
            }
            Self::MaxSidesNegative { supplied } => {
                write!(f, "maxSides must be >= 0, got {supplied}")
            }
        }
    }
}

impl std::error::Error for ConstructionError {}
