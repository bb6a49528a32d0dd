//! Pre-flight checks for devflame
//!
//! Validates that the host tools exist before anything touches the device.
//! Provides clear, actionable error messages when they don't.

use std::env;
use std::path::{Path, PathBuf};

use crate::bridge::BridgeKind;
use crate::domain::{MissingTool, SessionError};

pub const COLLAPSE_TOOL: &str = "inferno-collapse-perf";
pub const FLAMEGRAPH_TOOL: &str = "inferno-flamegraph";

/// Finds executables on the host
pub trait ToolLocator {
    fn find(&self, program: &str) -> Option<PathBuf>;
}

/// Searches the directories listed in `PATH`
#[derive(Debug, Default)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn find(&self, program: &str) -> Option<PathBuf> {
        let path = env::var_os("PATH")?;
        env::split_paths(&path).map(|dir| dir.join(program)).find(|p| is_executable(p))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata().is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Run all pre-flight checks before the first remote command
///
/// # Errors
/// Returns [`SessionError::MissingPrerequisites`] naming every absent tool
pub fn run_preflight_checks(
    locator: &dyn ToolLocator,
    bridge: BridgeKind,
) -> Result<(), SessionError> {
    let missing = missing_tools(locator, bridge);
    if missing.is_empty() {
        return Ok(());
    }
    Err(SessionError::MissingPrerequisites(missing))
}

fn missing_tools(locator: &dyn ToolLocator, bridge: BridgeKind) -> Vec<MissingTool> {
    let mut missing = Vec::new();

    if locator.find(bridge.program()).is_none() {
        missing.push(MissingTool {
            name: bridge.program().to_string(),
            hint: bridge.install_hint().to_string(),
        });
    }

    // Both inferno binaries ship in one crate, report them as one
    if locator.find(COLLAPSE_TOOL).is_none() || locator.find(FLAMEGRAPH_TOOL).is_none() {
        missing.push(MissingTool {
            name: "inferno".to_string(),
            hint: "Install Rust inferno tools:\n    cargo install inferno".to_string(),
        });
    }

    missing
}
