use lazy_static::lazy_static;
use regex::Regex;

use crate::classpath::Classpath;
use crate::compiler::CompileRequest;
use crate::error::{BuildError, CompileError, EngineError};
use crate::test_run::{Outcome, TestRun};

use super::{properties, record, TestEngine};

lazy_static! {
    static ref JAVA_TEST_PATTERN: Regex = Regex::new(r"/(\w)+\.java$").expect("valid java test pattern");
}

impl TestEngine {
    /// Compiles the test and makes it ready to run.
    ///
    /// Sources that are not recognized as tests are marked `UNSUPPORTED`.
    /// Compilation and infrastructure failures are recorded on `run`; only
    /// a run that already has an outcome is rejected.
    pub async fn build_and_install(&self, run: &mut TestRun) -> Result<(), EngineError> {
        if run.is_resolved() {
            return Err(EngineError::AlreadyResolved {
                qualified_name: run.qualified_name().to_string(),
            });
        }
        if !is_plain_dir_name(run.qualified_name()) {
            return Err(EngineError::InvalidTestName {
                qualified_name: run.qualified_name().to_string(),
            });
        }
        tracing::debug!(target: "vmtest.engine", test = run.qualified_name(), "build");

        let outcome = match self.compile_test(run).await {
            Ok(Some(classes)) => {
                tracing::debug!(
                    target: "vmtest.engine",
                    test = run.qualified_name(),
                    classpath = %classes,
                    "installed"
                );
                run.set_test_classes(classes);
                return Ok(());
            }
            Ok(None) => Outcome::unsupported(),
            Err(BuildError::Compile(CompileError::Failed { output_lines })) => {
                Outcome::compile_failed(output_lines)
            }
            Err(e) => Outcome::error(&e),
        };
        record(run, outcome)
    }

    /// Returns `None` when the source is not a test this engine can compile.
    async fn compile_test(&self, run: &TestRun) -> Result<Option<Classpath>, BuildError> {
        if !is_java_test(run) {
            return Ok(None);
        }

        let qualified_name = run.qualified_name();
        let base = self.config.local_temp.join(qualified_name);
        tokio::fs::create_dir_all(&base).await?;

        // The runner finds its test through this file, so it must exist
        // before the classes it describes.
        properties::write(&base, run).await?;

        let request = CompileRequest::new(&base)
            .boot_classpath(self.config.sdk_jar.as_deref())
            .classpath(&self.config.compilation_classpath())
            .sourcepath(run.test_directory())
            .sources([run.java_file()]);
        let mut classes = Classpath::of([&base]);
        classes.add_all(&self.compiler.compile(&request).await?);

        Ok(Some(self.runtime.on_compiled(qualified_name, classes).await?))
    }
}

fn is_java_test(run: &TestRun) -> bool {
    JAVA_TEST_PATTERN.is_match(&run.java_file().to_string_lossy())
}

/// The qualified name becomes a directory under `local_temp` and must stay
/// there: one non-empty component with no separators or drive prefix, and
/// neither `.` nor `..`.
fn is_plain_dir_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', ':'])
        && !name.contains('\0')
}
