use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classpath::Classpath;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "engine.timeout_secs must be positive".into(),
            ));
        }
        if self.compiler.javac.trim().is_empty() {
            return Err(ConfigError::Validation("compiler.javac is empty".into()));
        }
        if self.runtime.host().vm_command.is_empty() {
            return Err(ConfigError::Validation("runtime.vm_command is empty".into()));
        }
        if let RuntimeConfig::Packaged(p) = &self.runtime {
            if p.jar_command.is_empty() {
                return Err(ConfigError::Validation("runtime.jar_command is empty".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// JDWP port the launched VM waits on for a debugger.
    #[serde(default)]
    pub debug_port: Option<u16>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Boot classpath for compiling tests against a sandboxed SDK.
    #[serde(default)]
    pub sdk_jar: Option<PathBuf>,

    #[serde(default = "default_local_temp")]
    pub local_temp: PathBuf,

    #[serde(default = "default_runner_sources")]
    pub runner_sources: Vec<PathBuf>,

    #[serde(default)]
    pub compilation_classpath: Vec<PathBuf>,
}

impl EngineConfig {
    pub fn compilation_classpath(&self) -> Classpath {
        Classpath::of(&self.compilation_classpath)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_local_temp() -> PathBuf {
    std::env::temp_dir().join("vmtest")
}

fn default_runner_sources() -> Vec<PathBuf> {
    const RUNNER_HOME: &str = "runner/java/vmtest/runner";
    ["CaliperRunner", "JUnitRunner", "JtregRunner", "MainRunner", "TestRunner"]
        .iter()
        .map(|class| PathBuf::from(format!("{RUNNER_HOME}/{class}.java")))
        .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug_port: None,
            timeout_secs: default_timeout_secs(),
            sdk_jar: None,
            local_temp: default_local_temp(),
            runner_sources: default_runner_sources(),
            compilation_classpath: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_javac")]
    pub javac: String,

    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_javac() -> String {
    "javac".to_string()
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            javac: default_javac(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum RuntimeConfig {
    #[serde(rename = "host")]
    Host(HostRuntimeConfig),
    #[serde(rename = "packaged")]
    Packaged(PackagedRuntimeConfig),
}

impl RuntimeConfig {
    pub fn host(&self) -> &HostRuntimeConfig {
        match self {
            RuntimeConfig::Host(h) => h,
            RuntimeConfig::Packaged(p) => &p.host,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig::Host(HostRuntimeConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRuntimeConfig {
    #[serde(default = "default_vm_command")]
    pub vm_command: Vec<String>,

    #[serde(default)]
    pub vm_args: Vec<String>,

    #[serde(default)]
    pub temp: Option<PathBuf>,

    /// Classes every test needs at runtime. Falls back to
    /// `engine.compilation_classpath` when unset.
    #[serde(default)]
    pub support_classpath: Option<Vec<PathBuf>>,
}

fn default_vm_command() -> Vec<String> {
    vec!["java".to_string()]
}

impl Default for HostRuntimeConfig {
    fn default() -> Self {
        Self {
            vm_command: default_vm_command(),
            vm_args: Vec::new(),
            temp: None,
            support_classpath: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagedRuntimeConfig {
    #[serde(flatten)]
    pub host: HostRuntimeConfig,

    /// Archiver invocation prefix; `cf <jar> -C <dir> .` is appended.
    #[serde(default = "default_jar_command")]
    pub jar_command: Vec<String>,
}

fn default_jar_command() -> Vec<String> {
    vec!["jar".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// When set, logs are also appended to this file.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}
