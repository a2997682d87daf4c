// core/src/error/command_error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn process: {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command already started: {program}")]
    AlreadyStarted { program: String },

    #[error("command has not been started: {program}")]
    NotStarted { program: String },

    #[error("output of {program} was already taken")]
    OutputTaken { program: String },

    #[error("io error while reading output of {program}")]
    OutputIo {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed: {program} (exit={code:?})")]
    Failed {
        program: String,
        code: Option<i32>,
        output_lines: Vec<String>,
    },
}

impl CommandError {
    /// Lines the process printed before failing, if any were captured.
    pub fn output_lines(&self) -> &[String] {
        match self {
            CommandError::Failed { output_lines, .. } => output_lines,
            _ => &[],
        }
    }
}
