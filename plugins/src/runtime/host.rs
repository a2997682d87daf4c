use std::path::PathBuf;

use async_trait::async_trait;

use vmtest_core::api::{Classpath, EnvironmentError, HostRuntimeConfig, RuntimeEnvironment, VmCommandBuilder};

/// Launches tests on a VM installed on this machine.
pub struct HostRuntime {
    vm_command: Vec<String>,
    vm_args: Vec<String>,
    temp: Option<PathBuf>,
    support: Classpath,
}

impl HostRuntime {
    /// `fallback_support` is used when the config names no support classpath.
    pub fn new(cfg: &HostRuntimeConfig, fallback_support: Classpath) -> Self {
        let support = match &cfg.support_classpath {
            Some(paths) => paths.iter().collect(),
            None => fallback_support,
        };
        Self {
            vm_command: cfg.vm_command.clone(),
            vm_args: cfg.vm_args.clone(),
            temp: cfg.temp.clone(),
            support,
        }
    }
}

#[async_trait]
impl RuntimeEnvironment for HostRuntime {
    fn name(&self) -> &str {
        "host"
    }

    fn launch_command(&self) -> VmCommandBuilder {
        let builder = VmCommandBuilder::new()
            .vm_command(self.vm_command.clone())
            .vm_args(self.vm_args.clone());
        match &self.temp {
            Some(temp) => builder.temp(temp),
            None => builder,
        }
    }

    fn support_classpath(&self) -> Classpath {
        self.support.clone()
    }

    async fn on_compiled(&self, _name: &str, classes: Classpath) -> Result<Classpath, EnvironmentError> {
        Ok(classes)
    }
}
