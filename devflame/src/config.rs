//! Session configuration
//!
//! All artifact paths live here instead of in constants so that a session
//! (or a test) can run against its own set of files.

use std::path::PathBuf;
use std::time::Duration;

use crate::bridge::{Bridge, BridgeKind};
use crate::cli::Args;

pub const DEFAULT_REMOTE_DATA: &str = "/tmp/perf.data";
pub const DEFAULT_SCRIPT_PATH: &str = "/tmp/perf.script";
pub const DEFAULT_SVG_PATH: &str = "/tmp/flamegraph.svg";
pub const DEFAULT_FREQUENCY: u32 = 99;
pub const DEFAULT_CALL_GRAPH: &str = "dwarf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub bridge: Bridge,
    /// Binary recording on the device
    pub remote_data: String,
    /// Textual recording; the pull keeps the same path on the host
    pub script_path: String,
    /// Rendered flame graph on the host
    pub svg_path: PathBuf,
    pub frequency: u32,
    pub call_graph: String,
    /// Automatic stop; `None` waits for the operator
    pub duration: Option<Duration>,
    pub open_viewer: bool,
    pub quiet: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bridge: Bridge::default(),
            remote_data: DEFAULT_REMOTE_DATA.to_string(),
            script_path: DEFAULT_SCRIPT_PATH.to_string(),
            svg_path: PathBuf::from(DEFAULT_SVG_PATH),
            frequency: DEFAULT_FREQUENCY,
            call_graph: DEFAULT_CALL_GRAPH.to_string(),
            duration: None,
            open_viewer: true,
            quiet: false,
        }
    }
}

impl SessionConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            bridge: Bridge { kind: args.bridge, serial: args.serial.clone() },
            remote_data: args.remote_data.clone(),
            script_path: args.script.clone(),
            svg_path: args.output.clone(),
            frequency: args.frequency,
            call_graph: args.call_graph.clone(),
            duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
            open_viewer: !args.no_open,
            quiet: args.quiet,
        }
    }

    pub fn bridge_kind(&self) -> BridgeKind {
        self.bridge.kind
    }

    /// Host-side destination of the pull, identical to the remote path
    pub fn local_script(&self) -> PathBuf {
        PathBuf::from(&self.script_path)
    }
}
