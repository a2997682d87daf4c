//! Compiles tests, launches them on a runtime environment and classifies the
//! result.
//!
//! Calls are sequential: `prepare` once, then `build_and_install` and
//! `run_test` per test, then `shutdown`. The only concurrency is inside
//! `run_test`, where output is drained on the engine's single reader task
//! while the caller waits with a deadline.

mod build;
pub mod properties;
mod run;
mod worker;

use crate::classpath::Classpath;
use crate::compiler::{CompileRequest, Compiler};
use crate::config::EngineConfig;
use crate::environment::RuntimeEnvironment;
use crate::error::{BuildError, EngineError, OutcomeAlreadySet};
use crate::test_run::{Outcome, ResultKind, TestRun};

use worker::OutputWorker;

/// Compilation unit name for the runner support classes.
const TEST_RUNNER_UNIT: &str = "testrunner";

pub struct TestEngine {
    config: EngineConfig,
    compiler: Box<dyn Compiler>,
    runtime: Box<dyn RuntimeEnvironment>,
    output_reader: OutputWorker,
    runner_classes: Option<Classpath>,
}

impl TestEngine {
    /// Creates the engine and its output reader task. Must be called from
    /// within a tokio runtime. A zero timeout is rejected.
    pub fn new(
        config: EngineConfig,
        compiler: Box<dyn Compiler>,
        runtime: Box<dyn RuntimeEnvironment>,
    ) -> Result<Self, EngineError> {
        if config.timeout_secs == 0 {
            return Err(EngineError::ZeroTimeout);
        }
        tracing::info!(
            target: "vmtest.engine",
            compiler = compiler.name(),
            runtime = runtime.name(),
            timeout_secs = config.timeout_secs,
            debug_port = ?config.debug_port,
            "engine created"
        );
        Ok(Self {
            config,
            compiler,
            runtime,
            output_reader: OutputWorker::spawn(),
            runner_classes: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classes of the test runner, once [`prepare`](Self::prepare) succeeded.
    pub fn runner_classes(&self) -> Option<&Classpath> {
        self.runner_classes.as_ref()
    }

    /// Compiles the test runner support classes. Must succeed before any
    /// test is run; a failure leaves the engine unusable for running tests.
    pub async fn prepare(&mut self) -> Result<(), EngineError> {
        let classes = self.compile_test_runner().await.map_err(EngineError::Prepare)?;
        tracing::info!(target: "vmtest.engine", classpath = %classes, "test runner prepared");
        self.runner_classes = Some(classes);
        Ok(())
    }

    async fn compile_test_runner(&self) -> Result<Classpath, BuildError> {
        tracing::debug!(target: "vmtest.engine", "build testrunner");

        let base = self.config.local_temp.join(TEST_RUNNER_UNIT);
        tokio::fs::create_dir_all(&base).await?;

        let request = CompileRequest::new(&base)
            .classpath(&self.config.compilation_classpath())
            .sources(&self.config.runner_sources);
        let mut classes = Classpath::of([&base]);
        classes.add_all(&self.compiler.compile(&request).await?);

        Ok(self.runtime.on_compiled(TEST_RUNNER_UNIT, classes).await?)
    }

    /// Stops the output reader. Consumes the engine.
    pub async fn shutdown(mut self) {
        self.output_reader.shutdown().await;
        tracing::info!(target: "vmtest.engine", "engine shut down");
    }
}

fn record(run: &mut TestRun, outcome: Outcome) -> Result<(), EngineError> {
    match outcome.kind() {
        ResultKind::Success => tracing::info!(
            target: "vmtest.engine",
            test = run.qualified_name(),
            result = %outcome.kind(),
            "test finished"
        ),
        _ => tracing::warn!(
            target: "vmtest.engine",
            test = run.qualified_name(),
            result = %outcome.kind(),
            lines = outcome.lines().len(),
            "test finished"
        ),
    }
    run.set_outcome(outcome)
        .map_err(|OutcomeAlreadySet { qualified_name }| EngineError::AlreadyResolved { qualified_name })
}
