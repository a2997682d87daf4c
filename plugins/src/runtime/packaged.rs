use std::path::{Path, PathBuf};

use async_trait::async_trait;

use vmtest_core::api::{
    Classpath, CommandBuilder, EnvironmentError, PackagedRuntimeConfig, RuntimeEnvironment,
    VmCommandBuilder,
};

use super::HostRuntime;

/// A runtime that only loads archives: compiled class directories are
/// packaged into jars before launch.
pub struct PackagedRuntime {
    host: HostRuntime,
    jar_command: Vec<String>,
}

impl PackagedRuntime {
    pub fn new(cfg: &PackagedRuntimeConfig, fallback_support: Classpath) -> Self {
        Self {
            host: HostRuntime::new(&cfg.host, fallback_support),
            jar_command: cfg.jar_command.clone(),
        }
    }

    async fn package(&self, name: &str, dir: &Path) -> Result<PathBuf, EnvironmentError> {
        let mut file_name = dir.file_name().unwrap_or(dir.as_os_str()).to_os_string();
        file_name.push(".jar");
        let jar = dir.with_file_name(file_name);

        tracing::debug!(
            target: "vmtest.plugins.packaged",
            unit = name,
            dir = %dir.display(),
            jar = %jar.display(),
            "packaging classes"
        );

        CommandBuilder::new()
            .args(self.jar_command.iter().cloned())
            .arg("cf")
            .arg(jar.display().to_string())
            .arg("-C")
            .arg(dir.display().to_string())
            .arg(".")
            .build()
            .execute()
            .await
            .map_err(|source| EnvironmentError::PostCompile {
                name: name.to_string(),
                source,
            })?;
        Ok(jar)
    }
}

#[async_trait]
impl RuntimeEnvironment for PackagedRuntime {
    fn name(&self) -> &str {
        "packaged"
    }

    fn launch_command(&self) -> VmCommandBuilder {
        self.host.launch_command()
    }

    fn support_classpath(&self) -> Classpath {
        self.host.support_classpath()
    }

    async fn on_compiled(&self, name: &str, classes: Classpath) -> Result<Classpath, EnvironmentError> {
        let mut packaged = Classpath::new();
        for entry in classes.iter() {
            if tokio::fs::metadata(entry).await.map(|m| m.is_dir()).unwrap_or(false) {
                packaged.add(self.package(name, entry).await?);
            } else {
                packaged.add(entry);
            }
        }
        Ok(packaged)
    }
}
