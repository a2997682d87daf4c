use std::fmt;

use serde::Serialize;

/// Last line a test runner prints when, and only when, the test passed.
pub const SUCCESS_MARKER: &str = "SUCCESS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    Success,
    /// The process ran but did not report success.
    ExecFailed,
    ExecTimeout,
    CompileFailed,
    /// Not a recognized test source; skipped before compilation.
    Unsupported,
    /// Infrastructure failure: I/O, launch failure, missing output.
    Error,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Success => "SUCCESS",
            ResultKind::ExecFailed => "EXEC_FAILED",
            ResultKind::ExecTimeout => "EXEC_TIMEOUT",
            ResultKind::CompileFailed => "COMPILE_FAILED",
            ResultKind::Unsupported => "UNSUPPORTED",
            ResultKind::Error => "ERROR",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a test run together with its diagnostic lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    kind: ResultKind,
    lines: Vec<String>,
}

impl Outcome {
    pub fn success(lines: Vec<String>) -> Self {
        Self { kind: ResultKind::Success, lines }
    }

    pub fn exec_failed(lines: Vec<String>) -> Self {
        Self { kind: ResultKind::ExecFailed, lines }
    }

    pub fn exec_timeout(timeout_secs: u64) -> Self {
        Self {
            kind: ResultKind::ExecTimeout,
            lines: vec![format!("Exceeded timeout! ({timeout_secs}s)")],
        }
    }

    pub fn compile_failed(lines: Vec<String>) -> Self {
        Self { kind: ResultKind::CompileFailed, lines }
    }

    pub fn unsupported() -> Self {
        Self { kind: ResultKind::Unsupported, lines: Vec::new() }
    }

    /// An infrastructure error; the error and each of its causes become a line.
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut lines = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            lines.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self { kind: ResultKind::Error, lines }
    }

    pub fn error_message(message: impl Into<String>) -> Self {
        Self { kind: ResultKind::Error, lines: vec![message.into()] }
    }

    /// Classifies the complete output of a runner process.
    ///
    /// A final [`SUCCESS_MARKER`] line means success and is stripped; any
    /// other non-empty output is a failure and is kept whole.
    pub fn from_output(mut lines: Vec<String>) -> Self {
        match lines.last().map(String::as_str) {
            None => Self::error_message("No output returned!"),
            Some(SUCCESS_MARKER) => {
                lines.pop();
                Self::success(lines)
            }
            Some(_) => Self::exec_failed(lines),
        }
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_success(&self) -> bool {
        self.kind == ResultKind::Success
    }
}
