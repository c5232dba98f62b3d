//! Centralized command execution with consistent error handling.
//!
//! Every external program the pipeline drives (compiler, `cp`, container
//! engine) goes through a [`ProcessRunner`]. Runners never panic: a program
//! that cannot be started or exits non-zero comes back as a [`ProcessError`]
//! carrying whatever output was captured. There is no retry and no timeout;
//! a hung program blocks the caller.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Result of a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, `None` if terminated by signal.
    pub code: Option<i32>,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Get the exit code, or -1 if terminated by signal.
    pub fn code(&self) -> i32 {
        self.code.unwrap_or(-1)
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }

    /// Stdout followed by stderr, trimmed.
    pub fn combined(&self) -> String {
        match (self.stdout_trimmed(), self.stderr_trimmed()) {
            ("", err) => err.to_string(),
            (out, "") => out.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to execute '{program}'. Is it installed?")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{prefix} (exit code {code})")]
    Exit {
        prefix: String,
        code: i32,
        output: String,
    },
}

impl ProcessError {
    /// Diagnostic output captured from the failed process, if any.
    pub fn output(&self) -> &str {
        match self {
            ProcessError::Spawn { .. } => "",
            ProcessError::Exit { output, .. } => output,
        }
    }
}

/// Executes commands. The pipeline only talks to programs through this.
pub trait ProcessRunner {
    fn run(&self, cmd: &Cmd) -> Result<CommandResult, ProcessError>;
}

/// Runs commands as real child processes, waiting for each to exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, cmd: &Cmd) -> Result<CommandResult, ProcessError> {
        tracing::debug!(command = %cmd, "spawning");

        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(ref dir) = cmd.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| ProcessError::Spawn {
            program: cmd.program.clone(),
            source,
        })?;

        let result = CommandResult {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            return Err(cmd.exit_error(&result));
        }
        Ok(result)
    }
}

/// Builder for configuring command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    /// Custom error message prefix.
    error_prefix: Option<String>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            error_prefix: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add a path as an argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Build the error reported for a non-zero exit.
    pub fn exit_error(&self, result: &CommandResult) -> ProcessError {
        ProcessError::Exit {
            prefix: self
                .error_prefix
                .clone()
                .unwrap_or_else(|| format!("'{}' failed", self.program)),
            code: result.code(),
            output: result.combined(),
        }
    }

    /// Run with the given runner.
    pub fn run_with(&self, runner: &dyn ProcessRunner) -> Result<CommandResult, ProcessError> {
        runner.run(self)
    }

    /// Run as a real child process and capture output.
    pub fn run(&self) -> Result<CommandResult, ProcessError> {
        SystemRunner.run(self)
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Check if a program exists in PATH.
///
/// Returns the full path if found, None otherwise.
pub fn which(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

// =============================================================================
// Tests
// =============================================================================
