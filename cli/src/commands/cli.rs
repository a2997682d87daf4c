use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use vmtest_core::api::{EngineConfig, TestRunner};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Compile and run a single test on a managed VM")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build, install and run one test, then print its result.
    Run(RunArgs),
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerArg {
    Junit,
    Jtreg,
    Caliper,
    Main,
}

impl From<RunnerArg> for TestRunner {
    fn from(arg: RunnerArg) -> Self {
        match arg {
            RunnerArg::Junit => TestRunner::JUnit,
            RunnerArg::Jtreg => TestRunner::Jtreg,
            RunnerArg::Caliper => TestRunner::Caliper,
            RunnerArg::Main => TestRunner::Main,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Test source file, e.g. `tests/java/util/ArrayListTest.java`.
    #[arg(long)]
    pub java_file: PathBuf,

    /// Source root the test is compiled against.
    #[arg(long)]
    pub test_dir: PathBuf,

    #[arg(long)]
    pub qualified_name: String,

    #[arg(long)]
    pub test_class: String,

    #[arg(long, value_enum)]
    pub runner: RunnerArg,

    /// Working directory of the launched VM. Defaults to the current directory.
    #[arg(long)]
    pub user_dir: Option<PathBuf>,

    /// Config file (TOML). Defaults to `vmtest.toml` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides `engine.timeout_secs`.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Overrides `engine.debug_port`.
    #[arg(long)]
    pub debug_port: Option<u16>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl RunArgs {
    pub fn apply_overrides(&self, engine: &mut EngineConfig) {
        if let Some(secs) = self.timeout {
            engine.timeout_secs = secs;
        }
        if let Some(port) = self.debug_port {
            engine.debug_port = Some(port);
        }
    }
}
