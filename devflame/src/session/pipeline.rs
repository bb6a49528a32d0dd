//! Retrieval and rendering: convert on the device, pull, collapse, render.
//!
//! Each step blocks and must succeed before the next one starts.

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::config::SessionConfig;
use crate::domain::Stage;
use crate::preflight::{COLLAPSE_TOOL, FLAMEGRAPH_TOOL};
use crate::record::script_command;
use crate::runner::{CommandRunner, ToolCommand};

/// `perf script` on the device into the remote text file
///
/// # Errors
/// Returns an error if the bridge command fails
pub fn convert_on_device(runner: &mut dyn CommandRunner, config: &SessionConfig) -> Result<()> {
    let cmd = config.bridge.shell(&script_command(config));
    runner.run(Stage::Converting, &cmd).context("Failed to convert perf.data on device")
}

/// Pull the remote text file to the same path on the host
///
/// # Errors
/// Returns an error if the bridge command fails
pub fn pull_script(runner: &mut dyn CommandRunner, config: &SessionConfig) -> Result<PathBuf> {
    let local = config.local_script();
    let cmd = config.bridge.pull(&config.script_path, &local);
    runner.run(Stage::Transferring, &cmd).context("Failed to pull perf script from device")?;
    Ok(local)
}

pub fn collapse_command(script: &Path) -> ToolCommand {
    ToolCommand::new(COLLAPSE_TOOL).arg(script.to_string_lossy())
}

pub fn flamegraph_command() -> ToolCommand {
    ToolCommand::new(FLAMEGRAPH_TOOL)
}

/// `inferno-collapse-perf <script> | inferno-flamegraph > <svg>`
///
/// # Errors
/// Returns an error if either tool fails or the SVG cannot be written
pub fn render_flamegraph(
    runner: &mut dyn CommandRunner,
    script: &Path,
    svg: &Path,
) -> Result<()> {
    runner
        .pipe_to_file(Stage::Rendering, &collapse_command(script), &flamegraph_command(), svg)
        .context("Failed to render flame graph")?;
    info!("flame graph written to {}", svg.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_reads_pulled_script() {
        let cmd = collapse_command(Path::new("/tmp/perf.script"));
        assert_eq!(cmd.to_string(), "inferno-collapse-perf /tmp/perf.script");
        assert!(flamegraph_command().args.is_empty());
    }
}
