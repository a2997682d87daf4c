use async_trait::async_trait;

use crate::classpath::Classpath;
use crate::error::EnvironmentError;
use crate::launch::VmCommandBuilder;

/// The managed runtime tests are launched on.
///
/// The engine asks the environment for a launch command template, for the
/// classpath every test needs at runtime, and lets it post-process freshly
/// compiled classes (packaging, installing) before they are used.
#[async_trait]
pub trait RuntimeEnvironment: Send + Sync {
    fn name(&self) -> &str;

    /// A builder preloaded with the VM invocation prefix and any VM arguments.
    fn launch_command(&self) -> VmCommandBuilder;

    /// Runtime-support classes (test frameworks, annotations).
    fn support_classpath(&self) -> Classpath;

    /// Called after each successful compilation.
    ///
    /// `name` identifies the compilation unit, usually a qualified test name
    /// such as `java.lang.Math.PowTests`. The returned classpath replaces
    /// `classes` for launching.
    async fn on_compiled(&self, name: &str, classes: Classpath) -> Result<Classpath, EnvironmentError>;
}
