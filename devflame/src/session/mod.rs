//! # Recording Session
//!
//! Drives one capture from start to finish:
//!
//! ```text
//! idle → prerequisites-checked → mode-selected → (target-resolved)
//!      → recording → converting → transferring → rendering → done
//! ```
//!
//! Any failure aborts the session where it stands. Nothing is retried and
//! partially written artifacts are left in place.

pub mod pipeline;
pub mod recording;

use anyhow::Result;
use log::{info, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::SessionConfig;
use crate::domain::{RecordingMode, Stage};
use crate::mode::{select_mode, ModeRequest, Presets, Prompter};
use crate::preflight::{run_preflight_checks, ToolLocator};
use crate::process_lookup::find_remote_process;
use crate::record::RecordCommand;
use crate::runner::CommandRunner;
use crate::viewer::open_in_viewer;

pub use recording::{stop_channel, StopReason, StopSignal};

/// What a finished session produced
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub mode: RecordingMode,
    /// Remote command line handed to the bridge shell
    pub record_command: String,
    pub stop_reason: StopReason,
    pub svg_path: PathBuf,
}

pub struct Session<'a> {
    config: SessionConfig,
    runner: &'a mut dyn CommandRunner,
    locator: &'a dyn ToolLocator,
    stage: Stage,
}

impl<'a> Session<'a> {
    pub fn new(
        config: SessionConfig,
        runner: &'a mut dyn CommandRunner,
        locator: &'a dyn ToolLocator,
    ) -> Self {
        Self { config, runner, locator, stage: Stage::Idle }
    }

    /// Last stage reached (the failing one after an abort)
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the whole capture.
    ///
    /// The prompter is consumed once the mode is known. `arm_stop` is called
    /// once the recorder runs and receives the prompter's input stream, with
    /// anything already buffered in it, plus the signal any stop source may
    /// trigger.
    ///
    /// # Errors
    /// Returns the first failure; see [`crate::domain::SessionError`]
    pub fn run<R, W, F>(
        &mut self,
        prompter: Prompter<R, W>,
        presets: &Presets,
        arm_stop: F,
    ) -> Result<SessionReport>
    where
        R: BufRead,
        W: Write,
        F: FnOnce(R, StopSignal),
    {
        let result = self.run_stages(prompter, presets, arm_stop);
        if let Err(ref e) = result {
            warn!("session aborted while {}: {e:#}", self.stage);
        }
        result
    }

    fn run_stages<R, W, F>(
        &mut self,
        mut prompter: Prompter<R, W>,
        presets: &Presets,
        arm_stop: F,
    ) -> Result<SessionReport>
    where
        R: BufRead,
        W: Write,
        F: FnOnce(R, StopSignal),
    {
        run_preflight_checks(self.locator, self.config.bridge_kind())?;
        self.advance(Stage::PrerequisitesChecked);

        let request = select_mode(&mut prompter, presets)?;
        let input = prompter.into_input();
        self.advance(Stage::ModeSelected);

        let mode = self.resolve_target(request)?;
        let record = RecordCommand::new(&self.config, mode.clone());
        let remote = record.remote();

        self.say("\nStarting perf on device…");
        match self.config.duration {
            Some(limit) => self.say(&format!(
                "Recording for {}s. Press Enter to stop early.",
                limit.as_secs()
            )),
            None => self.say("Press Enter to stop recording."),
        }
        let (signal, stop) = stop_channel();
        let mut handle = self.runner.spawn(&self.config.bridge.shell(&remote))?;
        self.advance(Stage::Recording);
        arm_stop(input, signal.clone());
        let stop_reason = recording::record_until_stopped(handle.as_mut(), &stop, self.config.duration)?;
        drop(signal);

        self.advance(Stage::Converting);
        self.say("Converting perf.data -> perf.script on device…");
        pipeline::convert_on_device(self.runner, &self.config)?;

        self.advance(Stage::Transferring);
        self.say("Pulling perf.script to host…");
        let script = pipeline::pull_script(self.runner, &self.config)?;

        self.advance(Stage::Rendering);
        self.say("Generating flamegraph.svg…");
        pipeline::render_flamegraph(self.runner, &script, &self.config.svg_path)?;

        self.advance(Stage::Done);
        self.say(&format!("Flamegraph generated: {}", self.config.svg_path.display()));
        if self.config.open_viewer {
            open_in_viewer(self.runner, &self.config.svg_path);
        }

        Ok(SessionReport {
            mode,
            record_command: remote.render(),
            stop_reason,
            svg_path: self.config.svg_path.clone(),
        })
    }

    fn resolve_target(&mut self, request: ModeRequest) -> Result<RecordingMode> {
        let mode = match request {
            ModeRequest::Spawn { launch } => RecordingMode::Spawn { launch },
            ModeRequest::SystemWide => RecordingMode::SystemWide,
            ModeRequest::Attach { name } => {
                let process = find_remote_process(self.runner, &self.config.bridge, &name)?;
                self.say(&format!("Found PID {}", process.pid));
                self.advance(Stage::TargetResolved);
                RecordingMode::Attach { pid: process.pid }
            }
        };
        info!("mode: {mode}");
        Ok(mode)
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage {next} re-entered after {}", self.stage);
        info!("{} -> {next}", self.stage);
        self.stage = next;
    }

    fn say(&self, text: &str) {
        if !self.config.quiet {
            println!("{text}");
        }
    }
}
