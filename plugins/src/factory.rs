use vmtest_core::api::{AppConfig, Compiler, RuntimeConfig, RuntimeEnvironment};

use crate::compiler::Javac;
use crate::runtime::{HostRuntime, PackagedRuntime};

pub fn build_compiler(cfg: &AppConfig) -> Box<dyn Compiler> {
    Box::new(Javac::from_config(&cfg.compiler))
}

/// Builds the configured runtime. Without an explicit support classpath the
/// runtime reuses the compilation classpath.
pub fn build_runtime(cfg: &AppConfig) -> Box<dyn RuntimeEnvironment> {
    let fallback = cfg.engine.compilation_classpath();
    match &cfg.runtime {
        RuntimeConfig::Host(host) => Box::new(HostRuntime::new(host, fallback)),
        RuntimeConfig::Packaged(packaged) => Box::new(PackagedRuntime::new(packaged, fallback)),
    }
}
