//! External tool invocation.
//!
//! The converter, filter and exporter stages only build a [`ToolCommand`] and
//! hand it to a [`ToolRunner`]. [`SystemRunner`] spawns the real process and
//! blocks until it exits; tests substitute a runner that records commands.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ToolPaths;

/// One external program invocation: program plus argument array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends `<flag><path>` as a single argument, e.g. `-o=/work/region.o5m`.
    pub fn flag_path(self, flag: &str, path: &Path) -> Self {
        let mut joined = OsString::from(flag);
        joined.push(path.as_os_str());
        self.arg(joined)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as UTF-8 (lossy), for logs and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

fn quoted(arg: &OsStr) -> String {
    let s = arg.to_string_lossy();
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.into_owned()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quoted(self.program.as_os_str()))?;
        for arg in &self.args {
            write!(f, " {}", quoted(arg))?;
        }
        Ok(())
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "a signal".to_string(),
    }
}

/// Errors from preparing for or running an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The binary could not be located on `PATH` or at the given path.
    #[error("{program} not found")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },
    /// The process could not be started.
    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The process ran and reported failure.
    #[error("{program} terminated by {}", exit_label(.code))]
    Failed { program: String, code: Option<i32> },
    /// Creating the output directory or removing a stale artifact failed.
    #[error("preparing {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ToolError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> ToolError + '_ {
        move |source| ToolError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Renders an error and its sources as `outer: inner: root`.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    anyhow::Chain::new(err)
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}

/// Runs one external command to completion.
pub trait ToolRunner {
    fn run(&self, cmd: &ToolCommand) -> Result<(), ToolError>;
}

/// Spawns the real process, inheriting stdout/stderr, and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, cmd: &ToolCommand) -> Result<(), ToolError> {
        tracing::info!("calling system command: {}", cmd);
        let program = cmd.program().display().to_string();
        let status = cmd
            .to_command()
            .status()
            .map_err(|source| ToolError::Spawn {
                program: program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                program,
                code: status.code(),
            })
        }
    }
}

/// Resolves `program` on `PATH` (bare name) or as a path to an executable.
pub fn resolve_tool(program: &Path) -> Result<PathBuf, ToolError> {
    which::which(program).map_err(|source| ToolError::NotFound {
        program: program.display().to_string(),
        source,
    })
}

/// Resolves every configured binary, failing on the first one missing.
/// Returns `(name, resolved path)` pairs in pipeline order.
pub fn check_tools(tools: &ToolPaths) -> Result<Vec<(&'static str, PathBuf)>, ToolError> {
    [
        ("osmconvert", &tools.osmconvert),
        ("osmfilter", &tools.osmfilter),
        ("ogr2ogr", &tools.ogr2ogr),
    ]
    .into_iter()
    .map(|(name, program)| -> Result<(&'static str, PathBuf), ToolError> {
        let resolved = resolve_tool(program)?;
        tracing::debug!(tool = name, path = %resolved.display(), "resolved external tool");
        Ok((name, resolved))
    })
    .collect()
}
