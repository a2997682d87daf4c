// core/src/error/engine_error.rs
use thiserror::Error;

use super::{CompileError, EnvironmentError};

/// Faults returned to the caller of the engine.
///
/// Per-test failures are never reported here; they become an outcome on the
/// test run. These variants are usage errors or initialization failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine timeout must be at least one second")]
    ZeroTimeout,

    #[error("engine used before prepare()")]
    NotPrepared,

    #[error("qualified name cannot be used as a directory name: {qualified_name:?}")]
    InvalidTestName { qualified_name: String },

    #[error("test run is not runnable: {qualified_name}")]
    NotRunnable { qualified_name: String },

    #[error("test run already has an outcome: {qualified_name}")]
    AlreadyResolved { qualified_name: String },

    #[error("failed to prepare test runner support classes")]
    Prepare(#[source] BuildError),
}

/// Failure while producing classes for a compilation unit.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("io error while preparing compilation output")]
    Io(#[from] std::io::Error),
}

/// Failure while collecting a runner's output on the reader worker.
#[derive(Debug, Error)]
pub enum DrainError {
    #[error("output reader worker is not running")]
    WorkerGone,

    #[error("failed to read process output")]
    Io(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("launch command is missing {0}")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
#[error("outcome already set for {qualified_name}")]
pub struct OutcomeAlreadySet {
    pub qualified_name: String,
}
