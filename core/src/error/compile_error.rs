// core/src/error/compile_error.rs
use thiserror::Error;

use super::CommandError;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The compiler ran and rejected its input.
    #[error("compilation failed ({} diagnostic lines)", .output_lines.len())]
    Failed { output_lines: Vec<String> },

    #[error("compiler io error")]
    Io(#[from] std::io::Error),

    #[error("compiler invocation error")]
    Command(#[source] CommandError),
}

impl From<CommandError> for CompileError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Failed { output_lines, .. } => CompileError::Failed { output_lines },
            other => CompileError::Command(other),
        }
    }
}
