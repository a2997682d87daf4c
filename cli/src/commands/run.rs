use anyhow::{Context, Result};
use serde::Serialize;

use vmtest_core::api::{AppConfig, EngineError, Outcome, TestEngine, TestRun};
use vmtest_core::config;
use vmtest_plugins::factory;

use super::cli::{OutputFormat, RunArgs};
use crate::logging;

pub async fn run(args: RunArgs) -> Result<i32> {
    let mut cfg = config::load(args.config.as_deref()).context("failed to load config")?;
    args.apply_overrides(&mut cfg.engine);
    cfg.validate().context("invalid command line overrides")?;

    let _log_guard = logging::init(&cfg.logging)?;
    tracing::debug!(
        target: "vmtest.cli",
        config = ?args.config,
        runtime = ?cfg.runtime,
        timeout_secs = cfg.engine.timeout_secs,
        "config loaded"
    );

    let user_dir = match &args.user_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let mut run = TestRun::new(
        args.qualified_name.clone(),
        args.test_class.clone(),
        args.java_file.clone(),
        args.test_dir.clone(),
        user_dir,
    )
    .with_runner(args.runner.into());

    let result = execute(&cfg, &mut run).await;
    result.with_context(|| format!("failed to run {}", run.qualified_name()))?;

    let outcome = run
        .outcome()
        .with_context(|| format!("{} finished without a result", run.qualified_name()))?;
    println!("{}", render(&run, outcome, args.format)?);

    Ok(if outcome.is_success() { 0 } else { 1 })
}

async fn execute(cfg: &AppConfig, run: &mut TestRun) -> Result<(), EngineError> {
    let mut engine = TestEngine::new(
        cfg.engine.clone(),
        factory::build_compiler(cfg),
        factory::build_runtime(cfg),
    )?;
    let result = drive(&mut engine, run).await;
    engine.shutdown().await;
    result
}

async fn drive(engine: &mut TestEngine, run: &mut TestRun) -> Result<(), EngineError> {
    engine.prepare().await?;
    engine.build_and_install(run).await?;
    if run.is_runnable() {
        engine.run_test(run).await?;
    }
    Ok(())
}

#[derive(Serialize)]
struct Report<'a> {
    qualified_name: &'a str,
    test_class: &'a str,
    #[serde(flatten)]
    outcome: &'a Outcome,
}

fn render(run: &TestRun, outcome: &Outcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let report = Report {
                qualified_name: run.qualified_name(),
                test_class: run.test_class(),
                outcome,
            };
            Ok(serde_json::to_string(&report)?)
        }
        OutputFormat::Text => {
            let mut out = format!("{}: {}", run.qualified_name(), outcome.kind());
            for line in outcome.lines() {
                out.push_str("\n  ");
                out.push_str(line);
            }
            Ok(out)
        }
    }
}
