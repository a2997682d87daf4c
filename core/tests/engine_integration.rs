//! End-to-end tests for the execution engine.
//!
//! The "VM" is `sh -c <script>`: everything the launch builder appends lands in
//! the script's positional parameters, so a script can act as a runner that
//! prints a chosen output or misbehaves in a chosen way.
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use vmtest_core::api::{
    Classpath, CompileError, CompileRequest, Compiler, EngineConfig, EngineError,
    EnvironmentError, ResultKind, RuntimeEnvironment, TestEngine, TestRun, TestRunner,
    VmCommandBuilder,
};
use vmtest_core::engine::properties::TEST_PROPERTIES_FILE;

#[derive(Debug, Clone)]
struct CompileCall {
    request: CompileRequest,
    descriptor_present: bool,
}

#[derive(Clone, Default)]
struct FakeCompiler {
    /// Diagnostics to fail test compilations with; the runner always compiles.
    test_failure: Option<Vec<String>>,
    fail_runner: bool,
    calls: Arc<Mutex<Vec<CompileCall>>>,
}

#[async_trait]
impl Compiler for FakeCompiler {
    fn name(&self) -> &str {
        "fake"
    }

    async fn compile(&self, request: &CompileRequest) -> Result<Classpath, CompileError> {
        let descriptor_present = request.destination.join(TEST_PROPERTIES_FILE).exists();
        self.calls.lock().unwrap().push(CompileCall {
            request: request.clone(),
            descriptor_present,
        });

        let is_runner = request.destination.ends_with("testrunner");
        if is_runner && self.fail_runner {
            return Err(CompileError::Failed {
                output_lines: vec!["runner: cannot find symbol".into()],
            });
        }
        match (&self.test_failure, is_runner) {
            (Some(lines), false) => Err(CompileError::Failed {
                output_lines: lines.clone(),
            }),
            _ => Ok(Classpath::of([request.destination.clone()])),
        }
    }
}

struct ScriptRuntime {
    vm_command: Vec<String>,
}

impl ScriptRuntime {
    fn script(script: &str) -> Self {
        Self {
            vm_command: vec!["sh".into(), "-c".into(), script.into(), "vm".into()],
        }
    }
}

#[async_trait]
impl RuntimeEnvironment for ScriptRuntime {
    fn name(&self) -> &str {
        "script"
    }

    fn launch_command(&self) -> VmCommandBuilder {
        VmCommandBuilder::new().vm_command(self.vm_command.clone())
    }

    fn support_classpath(&self) -> Classpath {
        Classpath::of(["/opt/vmtest/junit.jar"])
    }

    async fn on_compiled(&self, _name: &str, classes: Classpath) -> Result<Classpath, EnvironmentError> {
        Ok(classes)
    }
}

struct Harness {
    temp: TempDir,
    compiler: FakeCompiler,
}

impl Harness {
    fn new() -> Self {
        Self::with_compiler(FakeCompiler::default())
    }

    fn with_compiler(compiler: FakeCompiler) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Self {
            temp: tempfile::tempdir().unwrap(),
            compiler,
        }
    }

    fn config(&self, timeout_secs: u64) -> EngineConfig {
        EngineConfig {
            timeout_secs,
            local_temp: self.temp.path().join("out"),
            runner_sources: vec![PathBuf::from("runner/TestRunner.java")],
            compilation_classpath: vec![PathBuf::from("/opt/vmtest/junit.jar")],
            ..EngineConfig::default()
        }
    }

    async fn engine(&self, timeout_secs: u64, runtime: ScriptRuntime) -> TestEngine {
        let mut engine = TestEngine::new(
            self.config(timeout_secs),
            Box::new(self.compiler.clone()),
            Box::new(runtime),
        ).unwrap();
        engine.prepare().await.unwrap();
        engine
    }

    fn test_run(&self, java_file: &str) -> TestRun {
        TestRun::new("pkg.Foo", "pkg.Foo", java_file, "src", self.temp.path())
            .with_runner(TestRunner::JUnit)
    }

    fn calls(&self) -> Vec<CompileCall> {
        self.compiler.calls.lock().unwrap().clone()
    }

    fn test_dir(&self) -> PathBuf {
        self.temp.path().join("out").join("pkg.Foo")
    }
}

async fn run_script(h: &Harness, timeout_secs: u64, script: &str) -> TestRun {
    let mut engine = h.engine(timeout_secs, ScriptRuntime::script(script)).await;
    let mut run = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut run).await.unwrap();
    engine.run_test(&mut run).await.unwrap();
    engine.shutdown().await;
    run
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn success_marker_yields_success_without_marker_line() {
    let h = Harness::new();
    let run = run_script(&h, 5, "printf 'line1\\nline2\\nSUCCESS\\n'").await;

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::Success);
    assert_eq!(outcome.lines(), strings(&["line1", "line2"]).as_slice());
}

#[tokio::test]
async fn output_without_marker_is_exec_failed() {
    let h = Harness::new();
    let run = run_script(&h, 5, "echo boom").await;

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::ExecFailed);
    assert_eq!(outcome.lines(), strings(&["boom"]).as_slice());
}

#[tokio::test]
async fn empty_output_is_an_error() {
    let h = Harness::new();
    let run = run_script(&h, 5, "exit 0").await;

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::Error);
    assert_eq!(outcome.lines(), strings(&["No output returned!"]).as_slice());
}

#[tokio::test]
async fn hung_runner_times_out_and_is_killed() {
    let h = Harness::new();
    let pid_file = h.temp.path().join("vm.pid");
    let script = format!("echo $$ > '{}'; echo started; exec sleep 30", pid_file.display());
    let mut engine = h.engine(1, ScriptRuntime::script(&script)).await;

    let mut run = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut run).await.unwrap();
    let started = Instant::now();
    engine.run_test(&mut run).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::ExecTimeout);
    assert_eq!(outcome.lines(), strings(&["Exceeded timeout! (1s)"]).as_slice());

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .status()
        .unwrap()
        .success();
    assert!(!alive, "runner process {} survived the timeout", pid.trim());

    engine.shutdown().await;
}

#[tokio::test]
async fn reader_is_reusable_after_a_timeout() {
    let h = Harness::new();
    let marker = h.temp.path().join("second");
    // First launch hangs; every later launch passes.
    let script = format!(
        "if [ -e '{m}' ]; then echo SUCCESS; else touch '{m}'; exec sleep 30; fi",
        m = marker.display()
    );
    let mut engine = h.engine(1, ScriptRuntime::script(&script)).await;

    let mut hung = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut hung).await.unwrap();
    engine.run_test(&mut hung).await.unwrap();
    assert_eq!(hung.outcome().unwrap().kind(), ResultKind::ExecTimeout);

    let mut next = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut next).await.unwrap();
    engine.run_test(&mut next).await.unwrap();
    assert_eq!(next.outcome().unwrap().kind(), ResultKind::Success);

    engine.shutdown().await;
}

#[tokio::test]
async fn compiler_failure_is_recorded_with_diagnostics() {
    let h = Harness::with_compiler(FakeCompiler {
        test_failure: Some(strings(&["error: x"])),
        ..FakeCompiler::default()
    });
    let engine = h.engine(5, ScriptRuntime::script("echo SUCCESS")).await;

    let mut run = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut run).await.unwrap();

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::CompileFailed);
    assert_eq!(outcome.lines(), strings(&["error: x"]).as_slice());
    assert!(run.test_classes().is_none());
    assert!(!run.is_runnable());
    engine.shutdown().await;
}

#[tokio::test]
async fn non_test_sources_are_unsupported_and_not_compiled() {
    let h = Harness::new();
    let engine = h.engine(5, ScriptRuntime::script("echo SUCCESS")).await;
    let runner_compiles = h.calls().len();

    let mut run = h.test_run("src/pkg/README.txt");
    engine.build_and_install(&mut run).await.unwrap();

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::Unsupported);
    assert!(outcome.lines().is_empty());
    assert_eq!(h.calls().len(), runner_compiles);
    engine.shutdown().await;
}

#[tokio::test]
async fn install_writes_descriptor_then_compiles_into_test_directory() {
    let h = Harness::new();
    let engine = h.engine(5, ScriptRuntime::script("echo SUCCESS")).await;

    let mut run = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut run).await.unwrap();
    assert!(run.outcome().is_none());

    let classes = run.test_classes().unwrap();
    assert!(!classes.is_empty());
    assert!(classes.contains(&h.test_dir()));

    let calls = h.calls();
    let test_call = calls.last().unwrap();
    assert!(test_call.descriptor_present);
    assert_eq!(test_call.request.destination, h.test_dir());
    assert_eq!(test_call.request.sourcepath.as_deref(), Some(Path::new("src")));
    assert_eq!(test_call.request.sources, vec![PathBuf::from("src/pkg/Foo.java")]);
    assert!(test_call.request.classpath.contains(Path::new("/opt/vmtest/junit.jar")));

    let descriptor = std::fs::read_to_string(h.test_dir().join(TEST_PROPERTIES_FILE)).unwrap();
    assert!(descriptor.contains("className=pkg.Foo"));
    assert!(descriptor.contains("qualifiedName=pkg.Foo"));
    engine.shutdown().await;
}

#[tokio::test]
async fn launch_arguments_reach_the_vm_in_order() {
    let h = Harness::new();
    let mut config = h.config(5);
    config.debug_port = Some(5005);
    let mut engine = TestEngine::new(
        config,
        Box::new(h.compiler.clone()),
        Box::new(ScriptRuntime::script(r#"for a in "$@"; do echo "$a"; done; echo SUCCESS"#)),
    ).unwrap();
    engine.prepare().await.unwrap();

    let mut run = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut run).await.unwrap();
    engine.run_test(&mut run).await.unwrap();

    let runner_dir = h.temp.path().join("out").join("testrunner");
    let expected_cp = format!(
        "{}:{}:/opt/vmtest/junit.jar",
        h.test_dir().display(),
        runner_dir.display()
    );
    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::Success);
    assert_eq!(
        outcome.lines(),
        vec![
            "-classpath".to_string(),
            expected_cp,
            format!("-Duser.dir={}", h.temp.path().display()),
            "-Xrunjdwp:transport=dt_socket,address=5005,server=y,suspend=y".to_string(),
            "vmtest.runner.JUnitRunner".to_string(),
        ]
        .as_slice()
    );
    engine.shutdown().await;
}

#[tokio::test]
async fn missing_vm_binary_is_an_error_outcome() {
    let h = Harness::new();
    let runtime = ScriptRuntime {
        vm_command: vec!["/nonexistent/vmtest-vm".into()],
    };
    let mut engine = h.engine(5, runtime).await;

    let mut run = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut run).await.unwrap();
    engine.run_test(&mut run).await.unwrap();

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::Error);
    assert!(outcome.lines()[0].contains("/nonexistent/vmtest-vm"));
    engine.shutdown().await;
}

#[tokio::test]
async fn second_run_of_the_same_test_is_rejected() {
    let h = Harness::new();
    let mut engine = h.engine(5, ScriptRuntime::script("echo SUCCESS")).await;

    let mut run = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut run).await.unwrap();
    engine.run_test(&mut run).await.unwrap();
    assert_eq!(run.outcome().unwrap().kind(), ResultKind::Success);

    let err = engine.run_test(&mut run).await.unwrap_err();
    assert!(matches!(err, EngineError::NotRunnable { .. }));
    assert_eq!(run.outcome().unwrap().kind(), ResultKind::Success);

    let err = engine.build_and_install(&mut run).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyResolved { .. }));
    engine.shutdown().await;
}

#[tokio::test]
async fn uncompiled_or_uncategorized_runs_are_rejected() {
    let h = Harness::new();
    let mut engine = h.engine(5, ScriptRuntime::script("echo SUCCESS")).await;

    let mut not_built = h.test_run("src/pkg/Foo.java");
    assert!(matches!(
        engine.run_test(&mut not_built).await,
        Err(EngineError::NotRunnable { .. })
    ));
    assert!(not_built.outcome().is_none());

    let mut no_runner = TestRun::new("pkg.Foo", "pkg.Foo", "src/pkg/Foo.java", "src", h.temp.path());
    engine.build_and_install(&mut no_runner).await.unwrap();
    assert!(matches!(
        engine.run_test(&mut no_runner).await,
        Err(EngineError::NotRunnable { .. })
    ));
    engine.shutdown().await;
}

#[tokio::test]
async fn run_before_prepare_is_rejected() {
    let h = Harness::new();
    let mut engine = TestEngine::new(
        h.config(5),
        Box::new(h.compiler.clone()),
        Box::new(ScriptRuntime::script("echo SUCCESS")),
    ).unwrap();
    let mut run = h.test_run("src/pkg/Foo.java");
    engine.build_and_install(&mut run).await.unwrap();

    let err = engine.run_test(&mut run).await.unwrap_err();
    assert!(matches!(err, EngineError::NotPrepared));
    engine.shutdown().await;
}

#[tokio::test]
async fn prepare_failure_is_fatal() {
    let h = Harness::with_compiler(FakeCompiler {
        fail_runner: true,
        ..FakeCompiler::default()
    });
    let mut engine = TestEngine::new(
        h.config(5),
        Box::new(h.compiler.clone()),
        Box::new(ScriptRuntime::script("echo SUCCESS")),
    ).unwrap();

    let err = engine.prepare().await.unwrap_err();
    assert!(matches!(err, EngineError::Prepare(_)));
    assert!(engine.runner_classes().is_none());
    engine.shutdown().await;
}

#[tokio::test]
async fn interleaved_stderr_keeps_the_marker_last() {
    let h = Harness::new();
    let mut engine = h
        .engine(5, ScriptRuntime::script("echo 'log on stderr' >&2; echo SUCCESS"))
        .await;

    for _ in 0..100 {
        let mut run = h.test_run("src/pkg/Foo.java");
        engine.build_and_install(&mut run).await.unwrap();
        engine.run_test(&mut run).await.unwrap();

        let outcome = run.outcome().unwrap();
        assert_eq!(outcome.kind(), ResultKind::Success);
        assert_eq!(outcome.lines(), strings(&["log on stderr"]).as_slice());
    }
    engine.shutdown().await;
}

#[tokio::test]
async fn output_order_follows_the_runner_across_streams() {
    let h = Harness::new();
    let run = run_script(&h, 5, "echo a; echo b >&2; echo c; echo d >&2; echo e").await;

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.kind(), ResultKind::ExecFailed);
    assert_eq!(outcome.lines(), strings(&["a", "b", "c", "d", "e"]).as_slice());
}

fn assert_send<T: Send>(_: &T) {}

#[tokio::test]
async fn engine_futures_are_send() {
    let h = Harness::new();
    let mut engine = h.engine(5, ScriptRuntime::script("echo SUCCESS")).await;
    let mut run = h.test_run("src/pkg/Foo.java");

    let build = engine.build_and_install(&mut run);
    assert_send(&build);
    build.await.unwrap();

    let exec = engine.run_test(&mut run);
    assert_send(&exec);
    exec.await.unwrap();
    assert_eq!(run.outcome().unwrap().kind(), ResultKind::Success);

    // A whole engine can be driven from a spawned task.
    let mut next = h.test_run("src/pkg/Foo.java");
    let next = tokio::spawn(async move {
        engine.build_and_install(&mut next).await.unwrap();
        engine.run_test(&mut next).await.unwrap();
        engine.shutdown().await;
        next
    })
    .await
    .unwrap();
    assert_eq!(next.outcome().unwrap().kind(), ResultKind::Success);
}

#[tokio::test]
async fn zero_timeout_is_rejected_at_construction() {
    let h = Harness::new();
    let result = TestEngine::new(
        h.config(0),
        Box::new(h.compiler.clone()),
        Box::new(ScriptRuntime::script("echo SUCCESS")),
    );
    assert!(matches!(result, Err(EngineError::ZeroTimeout)));

    let engine = TestEngine::new(
        h.config(3),
        Box::new(h.compiler.clone()),
        Box::new(ScriptRuntime::script("echo SUCCESS")),
    )
    .unwrap();
    assert_eq!(engine.config().timeout_secs, 3);
    assert_eq!(engine.config().timeout(), Duration::from_secs(3));
    engine.shutdown().await;
}

#[tokio::test]
async fn qualified_names_that_escape_the_work_dir_are_rejected() {
    let h = Harness::new();
    let engine = h.engine(5, ScriptRuntime::script("echo SUCCESS")).await;
    let runner_compiles = h.calls().len();

    for name in ["../escape", "/tmp/abs", "..", ""] {
        let mut run = TestRun::new(name, "pkg.Foo", "src/pkg/Foo.java", "src", h.temp.path())
            .with_runner(TestRunner::JUnit);
        let err = engine.build_and_install(&mut run).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidTestName { .. }), "{name}: {err:?}");
        assert!(run.outcome().is_none());
    }
    assert_eq!(h.calls().len(), runner_compiles);
    assert!(!h.temp.path().join("escape").exists());
    engine.shutdown().await;
}
