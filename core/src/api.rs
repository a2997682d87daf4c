//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `vmtest_core::api` instead of reaching into internal modules.

pub use crate::classpath::Classpath;
pub use crate::command::{Command, CommandBuilder, OutputReader};
pub use crate::compiler::{CompileRequest, Compiler};
pub use crate::config::{
    AppConfig, CompilerConfig, EngineConfig, HostRuntimeConfig, LoggingConfig,
    PackagedRuntimeConfig, RuntimeConfig,
};
pub use crate::engine::TestEngine;
pub use crate::environment::RuntimeEnvironment;
pub use crate::error::{
    CommandError, CompileError, ConfigError, EngineError, EnvironmentError, LaunchError,
};
pub use crate::launch::VmCommandBuilder;
pub use crate::test_run::{Outcome, ResultKind, TestRun, TestRunner, SUCCESS_MARKER};
