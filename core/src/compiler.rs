use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::classpath::Classpath;
use crate::error::CompileError;

/// Inputs for a single compiler invocation.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub boot_classpath: Option<PathBuf>,
    pub classpath: Classpath,
    pub sourcepath: Option<PathBuf>,
    pub destination: PathBuf,
    pub sources: Vec<PathBuf>,
}

impl CompileRequest {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            boot_classpath: None,
            classpath: Classpath::new(),
            sourcepath: None,
            destination: destination.into(),
            sources: Vec::new(),
        }
    }

    pub fn boot_classpath(mut self, path: Option<&Path>) -> Self {
        self.boot_classpath = path.map(Path::to_path_buf);
        self
    }

    pub fn classpath(mut self, classpath: &Classpath) -> Self {
        self.classpath.add_all(classpath);
        self
    }

    pub fn sourcepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.sourcepath = Some(path.into());
        self
    }

    pub fn sources<I, P>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }
}

/// Compiles sources into a destination directory.
///
/// Implementations return [`CompileError::Failed`] when the compiler rejects
/// its input, with the diagnostics it printed. Every other error is treated
/// as an infrastructure failure by the engine.
#[async_trait]
pub trait Compiler: Send + Sync {
    fn name(&self) -> &str;

    async fn compile(&self, request: &CompileRequest) -> Result<Classpath, CompileError>;
}
