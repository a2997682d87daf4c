//! Building, starting and reading external processes.
//!
//! A [`Command`] owns the child handle. Its combined stdout/stderr can be
//! taken as an [`OutputReader`] and drained elsewhere; the command itself stays
//! responsible for killing and reaping the process.

mod output;

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Child;

use crate::error::CommandError;

pub use output::OutputReader;

#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Command {
        Command {
            args: self.args,
            working_dir: self.working_dir,
            envs: self.envs,
            child: None,
            output: None,
            exit_status: None,
        }
    }
}

#[derive(Debug)]
pub struct Command {
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    child: Option<Child>,
    output: Option<OutputReader>,
    exit_status: Option<ExitStatus>,
}

impl Command {
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Spawns the process with stdin closed. stdout and stderr are both
    /// attached to one pipe so the reader sees them in write order.
    pub fn start(&mut self) -> Result<(), CommandError> {
        if self.child.is_some() {
            return Err(CommandError::AlreadyStarted {
                program: self.program().to_string(),
            });
        }

        let Some((program, rest)) = self.args.split_first() else {
            return Err(CommandError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };
        let spawn_error = |source| CommandError::Spawn {
            program: program.clone(),
            source,
        };

        let (output, stdout) = std::io::pipe().map_err(spawn_error)?;
        let stderr = stdout.try_clone().map_err(spawn_error)?;

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(rest)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        for (k, v) in &self.envs {
            cmd.env(k, v);
        }

        let child = cmd.spawn().map_err(spawn_error)?;
        // `cmd` holds our copies of the write end; the reader only sees EOF
        // once they are closed.
        drop(cmd);

        tracing::debug!(
            target: "vmtest.command",
            program = %program,
            pid = ?child.id(),
            "process started"
        );
        self.output = Some(OutputReader::new(output));
        self.child = Some(child);
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.child.is_some()
    }

    /// OS process id, while the child is running and not yet reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    pub fn take_output(&mut self) -> Result<OutputReader, CommandError> {
        if self.child.is_none() {
            return Err(CommandError::NotStarted {
                program: self.program().to_string(),
            });
        }
        self.output.take().ok_or_else(|| CommandError::OutputTaken {
            program: self.program().to_string(),
        })
    }

    /// Blocks until the process closes its output, then reaps it.
    pub async fn gather_output(&mut self) -> Result<Vec<String>, CommandError> {
        let reader = self.take_output()?;
        let lines = reader
            .read_lines()
            .await
            .map_err(|source| CommandError::OutputIo {
                program: self.program().to_string(),
                source,
            })?;

        if let Some(child) = self.child.as_mut() {
            let status = child.wait().await.map_err(|source| CommandError::OutputIo {
                program: self.args.first().cloned().unwrap_or_default(),
                source,
            })?;
            self.exit_status = Some(status);
        }
        Ok(lines)
    }

    /// Forcibly kills the process and reaps it. No-op if it was never started
    /// or has already been reaped.
    pub async fn destroy(&mut self) {
        if self.exit_status.is_some() {
            return;
        }
        let Some(child) = self.child.as_mut() else {
            return;
        };

        if let Err(e) = child.start_kill() {
            tracing::debug!(target: "vmtest.command", error = %e, "kill failed, process already gone");
        }
        match child.wait().await {
            Ok(status) => {
                tracing::debug!(target: "vmtest.command", status = %status, "process destroyed");
                self.exit_status = Some(status);
            }
            Err(e) => {
                tracing::warn!(target: "vmtest.command", error = %e, "failed to reap destroyed process");
            }
        }
    }

    /// Runs the command to completion, failing on a non-zero exit status.
    pub async fn execute(mut self) -> Result<Vec<String>, CommandError> {
        tracing::debug!(target: "vmtest.command", args = ?self.args, "executing");
        self.start()?;

        let lines = match self.gather_output().await {
            Ok(lines) => lines,
            Err(e) => {
                self.destroy().await;
                return Err(e);
            }
        };

        match self.exit_status {
            Some(status) if status.success() => Ok(lines),
            status => Err(CommandError::Failed {
                program: self.program().to_string(),
                code: status.and_then(|s| s.code()),
                output_lines: lines,
            }),
        }
    }
}
