//! Open the rendered flame graph with the host's default handler

use log::warn;
use std::path::Path;

use crate::domain::Stage;
use crate::runner::{CommandRunner, ToolCommand};

pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

pub fn open_command(url: &str) -> ToolCommand {
    if cfg!(target_os = "macos") {
        ToolCommand::new("open").arg(url)
    } else if cfg!(windows) {
        ToolCommand::new("cmd").args(["/C", "start", "", url])
    } else {
        ToolCommand::new("xdg-open").arg(url)
    }
}

/// Best effort: a missing viewer is only a warning
pub fn open_in_viewer(runner: &mut dyn CommandRunner, path: &Path) {
    let url = file_url(path);
    if let Err(e) = runner.run(Stage::Done, &open_command(&url)) {
        warn!("Could not open {url}: {e:#}");
    }
}
