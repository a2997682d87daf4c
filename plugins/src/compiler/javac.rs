use async_trait::async_trait;

use vmtest_core::api::{Classpath, CommandBuilder, CompileError, CompileRequest, Compiler, CompilerConfig};

/// Runs `javac` as an external process.
pub struct Javac {
    javac: String,
    extra_args: Vec<String>,
}

impl Javac {
    pub fn new(javac: impl Into<String>) -> Self {
        Self {
            javac: javac.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(cfg: &CompilerConfig) -> Self {
        Self::new(cfg.javac.clone()).extra_args(cfg.extra_args.clone())
    }

    pub fn extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    fn command_args(&self, request: &CompileRequest) -> Vec<String> {
        let mut args = vec![self.javac.clone()];
        if let Some(boot) = &request.boot_classpath {
            args.push("-bootclasspath".to_string());
            args.push(boot.display().to_string());
        }
        args.push("-classpath".to_string());
        args.push(request.classpath.to_string());
        if let Some(sourcepath) = &request.sourcepath {
            args.push("-sourcepath".to_string());
            args.push(sourcepath.display().to_string());
        }
        args.push("-d".to_string());
        args.push(request.destination.display().to_string());
        args.extend(self.extra_args.iter().cloned());
        args.extend(request.sources.iter().map(|s| s.display().to_string()));
        args
    }
}

#[async_trait]
impl Compiler for Javac {
    fn name(&self) -> &str {
        "javac"
    }

    async fn compile(&self, request: &CompileRequest) -> Result<Classpath, CompileError> {
        tokio::fs::create_dir_all(&request.destination).await?;

        let args = self.command_args(request);
        tracing::debug!(
            target: "vmtest.plugins.javac",
            destination = %request.destination.display(),
            sources = request.sources.len(),
            "compiling"
        );

        let lines = CommandBuilder::new().args(args).build().execute().await?;
        if !lines.is_empty() {
            tracing::debug!(target: "vmtest.plugins.javac", warnings = ?lines, "javac output");
        }
        Ok(Classpath::of([&request.destination]))
    }
}
