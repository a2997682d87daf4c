// core/src/error/environment_error.rs
use thiserror::Error;

use super::CommandError;

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("post-compile step failed for {name}")]
    PostCompile {
        name: String,
        #[source]
        source: CommandError,
    },

    #[error("runtime environment io error")]
    Io(#[from] std::io::Error),
}
