//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::bridge::BridgeKind;

#[derive(Parser, Debug)]
#[command(
    name = "devflame",
    version,
    about = "Record perf samples on a device and render a flame graph",
    after_help = "\
EXAMPLES:
    devflame                                  Interactive: choose mode, press Enter to stop
    devflame --mode 3 --duration 10           System-wide for 10 seconds
    devflame --mode 2 --process my-app        Attach to the first process matching my-app
    devflame --bridge adb -s emulator-5554    Use adb with a specific device"
)]
pub struct Args {
    /// Recording mode: 1 = spawn app, 2 = attach by name, 3 = system-wide (prompted if omitted)
    #[arg(long, value_name = "1|2|3")]
    pub mode: Option<String>,

    /// App launch command on the device (spawn mode)
    #[arg(long, value_name = "CMD")]
    pub app: Option<String>,

    /// Process name substring on the device (attach mode)
    #[arg(long, value_name = "SUBSTRING")]
    pub process: Option<String>,

    /// Device bridge executable
    #[arg(long, default_value = "sdb")]
    pub bridge: BridgeKind,

    /// Device serial passed to the bridge as `-s`
    #[arg(short, long)]
    pub serial: Option<String>,

    /// Sampling frequency in Hz
    #[arg(short = 'F', long, default_value = "99")]
    pub frequency: u32,

    /// Call-graph unwinding mode passed to `perf record --call-graph`
    #[arg(long, default_value = "dwarf")]
    pub call_graph: String,

    /// Stop recording after N seconds (0 = wait for Enter)
    #[arg(long, default_value = "0")]
    pub duration: u64,

    /// perf.data path on the device
    #[arg(long, value_name = "PATH", default_value = "/tmp/perf.data")]
    pub remote_data: String,

    /// perf script path, same on device and host
    #[arg(long, value_name = "PATH", default_value = "/tmp/perf.script")]
    pub script: String,

    /// Flame graph output path on the host
    #[arg(short, long, value_name = "FILE", default_value = "/tmp/flamegraph.svg")]
    pub output: PathBuf,

    /// Do not open the flame graph when done
    #[arg(long)]
    pub no_open: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
