//! Error types for the CLI

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Main CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Registration error
    #[error("Registration error: {0}")]
    Registration(#[from] aoc_solver::RegistrationError),

    /// Executor error
    #[error("{0}")]
    Executor(#[from] ExecutorError),
}

/// Input lookup errors, reported per part rather than aborting the run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// No input file for this puzzle
    #[error("no input for {year}/{day:02} at {}", path.display())]
    Missing { year: u16, day: u8, path: PathBuf },

    /// The file exists but could not be read
    #[error("failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },
}

/// Why a single part produced no answer
#[derive(Error, Debug, Clone)]
pub enum PartError {
    #[error(transparent)]
    Input(#[from] InputError),

    /// Parse or solve failure, shared between the parts of one parse
    #[error(transparent)]
    Solver(Arc<aoc_solver::SolverError>),
}

impl From<aoc_solver::SolverError> for PartError {
    fn from(err: aoc_solver::SolverError) -> Self {
        PartError::Solver(Arc::new(err))
    }
}

/// Executor-specific errors
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Channel send error
    #[error("Channel send error")]
    ChannelSend,

    /// Thread pool creation failed
    #[error("Thread pool creation failed: {0}")]
    ThreadPool(String),

    /// The thread running the executor panicked
    #[error("Executor thread panicked")]
    Panicked,

    /// Multiple errors collected during parallel execution
    #[error("Multiple errors occurred ({} total)", .0.len())]
    Multiple(Vec<ExecutorError>),
}

impl ExecutorError {
    /// Merge two errors into one `Multiple`, flattening nested lists
    pub fn combine(first: ExecutorError, second: ExecutorError) -> ExecutorError {
        let mut errors = first.into_list();
        errors.extend(second.into_list());
        ExecutorError::Multiple(errors)
    }

    /// Combine an optional error with a new error
    pub fn combine_opt(existing: Option<ExecutorError>, new: ExecutorError) -> ExecutorError {
        match existing {
            Some(e) => Self::combine(e, new),
            None => new,
        }
    }

    fn into_list(self) -> Vec<ExecutorError> {
        match self {
            ExecutorError::Multiple(errors) => errors,
            single => vec![single],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_flattens() {
        let combined = ExecutorError::combine(
            ExecutorError::ChannelSend,
            ExecutorError::Multiple(vec![ExecutorError::Panicked, ExecutorError::ChannelSend]),
        );
        match &combined {
            ExecutorError::Multiple(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected Multiple, got {other:?}"),
        }
        assert_eq!(combined.to_string(), "Multiple errors occurred (3 total)");

        let single = ExecutorError::combine_opt(None, ExecutorError::Panicked);
        assert!(matches!(single, ExecutorError::Panicked));
    }

    #[test]
    fn test_part_error_display() {
        let err = PartError::from(InputError::Missing {
            year: 2023,
            day: 20,
            path: PathBuf::from("/tmp/2023_day20.txt"),
        });
        assert_eq!(err.to_string(), "no input for 2023/20 at /tmp/2023_day20.txt");

        let err = PartError::from(aoc_solver::SolverError::NotFound(2023, 1));
        assert!(err.to_string().contains("2023"));
    }
}
