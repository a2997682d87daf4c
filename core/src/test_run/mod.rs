//! The unit of work handed to the engine.

mod outcome;

use std::sync::OnceLock;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classpath::Classpath;
use crate::error::OutcomeAlreadySet;

pub use outcome::{Outcome, ResultKind, SUCCESS_MARKER};

/// The runner entry point a test is launched with. Chosen by the caller from
/// the test's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestRunner {
    JUnit,
    Jtreg,
    Caliper,
    Main,
}

impl TestRunner {
    pub fn class_name(&self) -> &'static str {
        match self {
            TestRunner::JUnit => "vmtest.runner.JUnitRunner",
            TestRunner::Jtreg => "vmtest.runner.JtregRunner",
            TestRunner::Caliper => "vmtest.runner.CaliperRunner",
            TestRunner::Main => "vmtest.runner.MainRunner",
        }
    }
}

#[derive(Debug)]
pub struct TestRun {
    qualified_name: String,
    test_class: String,
    java_file: PathBuf,
    test_directory: PathBuf,
    user_dir: PathBuf,
    test_runner: Option<TestRunner>,
    test_classes: Option<Classpath>,
    outcome: OnceLock<Outcome>,
}

impl TestRun {
    pub fn new(
        qualified_name: impl Into<String>,
        test_class: impl Into<String>,
        java_file: impl Into<PathBuf>,
        test_directory: impl Into<PathBuf>,
        user_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            test_class: test_class.into(),
            java_file: java_file.into(),
            test_directory: test_directory.into(),
            user_dir: user_dir.into(),
            test_runner: None,
            test_classes: None,
            outcome: OnceLock::new(),
        }
    }

    pub fn with_runner(mut self, runner: TestRunner) -> Self {
        self.test_runner = Some(runner);
        self
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn test_class(&self) -> &str {
        &self.test_class
    }

    pub fn java_file(&self) -> &Path {
        &self.java_file
    }

    pub fn test_directory(&self) -> &Path {
        &self.test_directory
    }

    pub fn user_dir(&self) -> &Path {
        &self.user_dir
    }

    pub fn test_runner(&self) -> Option<TestRunner> {
        self.test_runner
    }

    pub fn test_classes(&self) -> Option<&Classpath> {
        self.test_classes.as_ref()
    }

    pub(crate) fn set_test_classes(&mut self, classes: Classpath) {
        self.test_classes = Some(classes);
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// True once compiled classes exist for a test with a known runner and no
    /// outcome has been recorded yet.
    pub fn is_runnable(&self) -> bool {
        self.test_classes.is_some() && self.test_runner.is_some() && !self.is_resolved()
    }

    /// Records the terminal outcome. The first outcome wins.
    pub(crate) fn set_outcome(&mut self, outcome: Outcome) -> Result<(), OutcomeAlreadySet> {
        self.outcome.set(outcome).map_err(|_| OutcomeAlreadySet {
            qualified_name: self.qualified_name.clone(),
        })
    }
}
