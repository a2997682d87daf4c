use crate::command::Command;
use crate::error::EngineError;
use crate::test_run::{Outcome, TestRun};

use super::{record, TestEngine};

impl TestEngine {
    /// Runs an installed test and records its outcome.
    ///
    /// Takes `&mut self` so runs on one engine are strictly sequential.
    /// Returns an error only when `run` is not runnable or the engine was not
    /// prepared; every failure of the test itself becomes its outcome.
    pub async fn run_test(&mut self, run: &mut TestRun) -> Result<(), EngineError> {
        let runner_classes = self.runner_classes.as_ref().ok_or(EngineError::NotPrepared)?;
        let (Some(test_classes), Some(runner), true) =
            (run.test_classes(), run.test_runner(), run.is_runnable())
        else {
            return Err(EngineError::NotRunnable {
                qualified_name: run.qualified_name().to_string(),
            });
        };

        let launch = self
            .runtime
            .launch_command()
            .classpath(test_classes)
            .classpath(runner_classes)
            .classpath(&self.runtime.support_classpath())
            .user_dir(run.user_dir())
            .debug_port(self.config.debug_port)
            .main_class(runner.class_name());

        let outcome = match launch.build() {
            Ok(mut command) => {
                let outcome = self.execute(&mut command).await;
                if command.is_started() {
                    // Also lets a still-blocked read of the output pipe reach EOF.
                    command.destroy().await;
                }
                outcome
            }
            Err(e) => Outcome::error(&e),
        };

        record(run, outcome)
    }

    async fn execute(&self, command: &mut Command) -> Outcome {
        tracing::debug!(target: "vmtest.engine", args = ?command.args(), "executing");

        if let Err(e) = command.start() {
            return Outcome::error(&e);
        }
        let reader = match command.take_output() {
            Ok(reader) => reader,
            Err(e) => return Outcome::error(&e),
        };

        match tokio::time::timeout(self.config.timeout(), self.output_reader.drain(reader)).await {
            Ok(Ok(lines)) => Outcome::from_output(lines),
            Ok(Err(e)) => Outcome::error(&e),
            Err(_) => {
                tracing::warn!(
                    target: "vmtest.engine",
                    pid = ?command.id(),
                    timeout_secs = self.config.timeout_secs,
                    "runner exceeded timeout, killing"
                );
                Outcome::exec_timeout(self.config.timeout_secs)
            }
        }
    }
}
