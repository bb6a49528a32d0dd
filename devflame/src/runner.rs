//! # External Tool Invocation
//!
//! Every external program (bridge, inferno tools, viewer) is described by a
//! [`ToolCommand`] argument vector and executed through the [`CommandRunner`]
//! trait. [`SystemRunner`] runs real processes; tests substitute a scripted
//! runner that records invocations.

#![allow(unsafe_code)] // kill() requires unsafe

use anyhow::{Context, Result};
use log::debug;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::domain::{SessionError, Stage};

/// A program plus its arguments. Never passed through a host shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A running recording started by [`CommandRunner::spawn`]
pub trait RecordingHandle {
    /// Returns `true` once the process has exited on its own.
    ///
    /// # Errors
    /// Returns an error if the process state cannot be queried
    fn has_exited(&mut self) -> Result<bool>;

    /// Ask the process to stop and wait until it has.
    ///
    /// # Errors
    /// Returns an error if the signal cannot be delivered or the wait fails
    fn terminate(&mut self) -> Result<()>;
}

/// Executes external tools
pub trait CommandRunner {
    /// Run to completion; a non-zero exit is a [`SessionError::ToolFailed`].
    ///
    /// # Errors
    /// Returns an error if the program cannot start or exits unsuccessfully
    fn run(&mut self, stage: Stage, cmd: &ToolCommand) -> Result<()>;

    /// Run to completion and return its stdout.
    ///
    /// # Errors
    /// Returns an error if the program cannot start or exits unsuccessfully
    fn capture(&mut self, stage: Stage, cmd: &ToolCommand) -> Result<String>;

    /// Start without waiting.
    ///
    /// # Errors
    /// Returns an error if the program cannot start
    fn spawn(&mut self, cmd: &ToolCommand) -> Result<Box<dyn RecordingHandle>>;

    /// Run `producer | consumer > output`.
    ///
    /// # Errors
    /// Returns an error if either program fails or the output cannot be written
    fn pipe_to_file(
        &mut self,
        stage: Stage,
        producer: &ToolCommand,
        consumer: &ToolCommand,
        output: &Path,
    ) -> Result<()>;
}

/// Runs real host processes
#[derive(Debug, Default)]
pub struct SystemRunner;

fn spawn_error(cmd: &ToolCommand, source: std::io::Error) -> SessionError {
    SessionError::Spawn { program: cmd.program.clone(), source }
}

fn check_status(stage: Stage, cmd: &ToolCommand, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(SessionError::ToolFailed { stage, program: cmd.program.clone(), status: status.to_string() }
        .into())
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, stage: Stage, cmd: &ToolCommand) -> Result<()> {
        debug!("run: {cmd}");
        let status = cmd.to_command().status().map_err(|e| spawn_error(cmd, e))?;
        check_status(stage, cmd, status)
    }

    fn capture(&mut self, stage: Stage, cmd: &ToolCommand) -> Result<String> {
        debug!("capture: {cmd}");
        let output = cmd
            .to_command()
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| spawn_error(cmd, e))?;
        check_status(stage, cmd, output.status)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn(&mut self, cmd: &ToolCommand) -> Result<Box<dyn RecordingHandle>> {
        debug!("spawn: {cmd}");
        // Keep the bridge off our stdin, the operator's Enter key is ours
        let child =
            cmd.to_command().stdin(Stdio::piped()).spawn().map_err(|e| spawn_error(cmd, e))?;
        Ok(Box::new(ChildRecording { child }))
    }

    fn pipe_to_file(
        &mut self,
        stage: Stage,
        producer: &ToolCommand,
        consumer: &ToolCommand,
        output: &Path,
    ) -> Result<()> {
        debug!("pipe: {producer} | {consumer} > {}", output.display());
        let out = File::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;

        let mut first = producer
            .to_command()
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(producer, e))?;
        let pipe = first.stdout.take().context("producer stdout not captured")?;

        let second_status =
            consumer.to_command().stdin(pipe).stdout(out).status().map_err(|e| spawn_error(consumer, e));

        // Reap the producer even when the consumer failed to start
        let first_status = first.wait()?;
        let second_status = second_status?;

        check_status(stage, producer, first_status)?;
        check_status(stage, consumer, second_status)
    }
}

/// Recording backed by a host child process (the bridge shell)
struct ChildRecording {
    child: Child,
}

impl RecordingHandle for ChildRecording {
    fn has_exited(&mut self) -> Result<bool> {
        Ok(self.child.try_wait()?.is_some())
    }

    fn terminate(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_none() {
            send_sigterm(&mut self.child)?;
        }
        let status = self.child.wait()?;
        debug!("recording handle finished: {status}");
        Ok(())
    }
}

#[cfg(unix)]
fn send_sigterm(child: &mut Child) -> Result<()> {
    let pid = libc::pid_t::try_from(child.id()).context("child PID out of range")?;
    // SAFETY: pid belongs to a child we have not reaped yet
    if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
        return Err(std::io::Error::last_os_error()).context("Failed to send SIGTERM to recorder");
    }
    Ok(())
}

#[cfg(not(unix))]
fn send_sigterm(child: &mut Child) -> Result<()> {
    child.kill().context("Failed to stop recorder")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_command_display() {
        let cmd = ToolCommand::new("sdb").arg("pull").args(["/tmp/a", "/tmp/a"]);
        assert_eq!(cmd.to_string(), "sdb pull /tmp/a /tmp/a");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_failure() {
        let mut runner = SystemRunner;
        let err = runner.run(Stage::Converting, &ToolCommand::new("false")).unwrap_err();
        let err = err.downcast::<SessionError>().unwrap();
        assert!(matches!(err, SessionError::ToolFailed { stage: Stage::Converting, .. }));
    }

    #[test]
    fn test_spawn_missing_program() {
        let mut runner = SystemRunner;
        let result = runner.spawn(&ToolCommand::new("/nonexistent/devflame-tool"));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_stdout() {
        let mut runner = SystemRunner;
        let out = runner.capture(Stage::TargetResolved, &ToolCommand::new("echo").arg("hi")).unwrap();
        assert_eq!(out.trim(), "hi");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let mut runner = SystemRunner;
        runner
            .pipe_to_file(
                Stage::Rendering,
                &ToolCommand::new("echo").arg("a;b 3"),
                &ToolCommand::new("cat"),
                &out,
            )
            .unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "a;b 3\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_terminate_long_running_child() {
        let mut runner = SystemRunner;
        let mut handle = runner.spawn(&ToolCommand::new("sleep").arg("30")).unwrap();
        assert!(!handle.has_exited().unwrap());
        handle.terminate().unwrap();
    }
}
