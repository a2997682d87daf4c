mod command_error;
mod compile_error;
mod config_error;
mod engine_error;
mod environment_error;

pub use command_error::CommandError;
pub use compile_error::CompileError;
pub use config_error::ConfigError;
pub use engine_error::{BuildError, DrainError, EngineError, LaunchError, OutcomeAlreadySet};
pub use environment_error::EnvironmentError;
