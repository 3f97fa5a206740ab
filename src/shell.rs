//! # Subprocess Execution
//!
//! Every git interaction goes through the [`CommandRunner`] trait so that the
//! merge state machine can be exercised in tests with a scripted runner and
//! without a real repository. [`Shell`] is the default implementation, which
//! spawns the program in a fixed working directory and captures its output.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::error::{Error, Result};

/// The captured result of running an external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Exit code, or `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    /// Whether the command exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Combined output: stdout followed by stderr.
    pub fn output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }

    /// Fail with [`Error::Environment`] unless the command succeeded.
    pub fn assert_success(&self, command: &str) -> Result<&Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::Environment {
                command: command.to_string(),
                output: self.output(),
            })
        }
    }
}

/// Runs external commands - allows mocking in tests
pub trait CommandRunner {
    /// Runs `program` with `args` to completion and captures its output.
    ///
    /// A non-zero exit is not an error at this level; only failing to start
    /// the program is.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;
}

/// Format a command line for logs and error messages.
pub fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(char::is_whitespace) {
            line.push_str(&format!("{:?}", arg));
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// The default [`CommandRunner`], executing real processes in a working
/// directory.
#[derive(Debug, Clone)]
pub struct Shell {
    working_dir: PathBuf,
}

impl Shell {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl CommandRunner for Shell {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let line = command_line(program, args);
        debug!("Running `{}` in {}", line, self.working_dir.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.working_dir)
            // Conflict classification matches git's untranslated messages.
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Environment {
                command: line.clone(),
                output: e.to_string(),
            })?;

        let result = ExecResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            warn!(
                "`{}` exited with code {}:\n{}",
                line,
                result.exit_code,
                result.output()
            );
        }

        Ok(result)
    }
}
