use std::path::PathBuf;

use crate::classpath::Classpath;
use crate::command::{Command, CommandBuilder};
use crate::error::LaunchError;

/// Builds the command that starts a VM on a test runner class.
#[derive(Debug, Clone)]
pub struct VmCommandBuilder {
    vm_command: Vec<String>,
    temp: Option<PathBuf>,
    classpath: Classpath,
    user_dir: Option<PathBuf>,
    debug_port: Option<u16>,
    main_class: Option<String>,
    vm_args: Vec<String>,
}

impl Default for VmCommandBuilder {
    fn default() -> Self {
        Self {
            vm_command: vec!["java".to_string()],
            temp: None,
            classpath: Classpath::new(),
            user_dir: None,
            debug_port: None,
            main_class: None,
            vm_args: Vec::new(),
        }
    }
}

impl VmCommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vm_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vm_command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn temp(mut self, temp: impl Into<PathBuf>) -> Self {
        self.temp = Some(temp.into());
        self
    }

    /// Appends to the classpath; repeated calls accumulate.
    pub fn classpath(mut self, classpath: &Classpath) -> Self {
        self.classpath.add_all(classpath);
        self
    }

    pub fn user_dir(mut self, user_dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(user_dir.into());
        self
    }

    pub fn debug_port(mut self, port: Option<u16>) -> Self {
        self.debug_port = port;
        self
    }

    pub fn main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    pub fn vm_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vm_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Renders the argument vector. The order is what the VM's argument
    /// parser expects: options first, main class last.
    pub fn to_args(&self) -> Result<Vec<String>, LaunchError> {
        if self.vm_command.is_empty() {
            return Err(LaunchError::Missing("vm command"));
        }
        let user_dir = self.user_dir.as_ref().ok_or(LaunchError::Missing("user dir"))?;
        let main_class = self.main_class.as_ref().ok_or(LaunchError::Missing("main class"))?;

        let mut args = self.vm_command.clone();
        args.push("-classpath".to_string());
        args.push(self.classpath.to_string());
        args.push(format!("-Duser.dir={}", user_dir.display()));

        if let Some(temp) = &self.temp {
            args.push(format!("-Djava.io.tmpdir={}", temp.display()));
        }

        if let Some(port) = self.debug_port {
            args.push(format!(
                "-Xrunjdwp:transport=dt_socket,address={port},server=y,suspend=y"
            ));
        }

        args.extend(self.vm_args.iter().cloned());
        args.push(main_class.clone());
        Ok(args)
    }

    pub fn build(self) -> Result<Command, LaunchError> {
        let args = self.to_args()?;
        Ok(CommandBuilder::new().args(args).build())
    }
}
