//! # devflame - Flame Graphs from Embedded Devices
//!
//! devflame records CPU samples with `perf` on a device reached through a
//! debug bridge (`sdb` for Tizen, `adb` for Android), brings the samples
//! back to the host and renders them with inferno.
//!
//! ## Pipeline
//!
//! ```text
//! host                                   device
//! ────                                   ──────
//! preflight (sdb/adb, inferno on PATH)
//! mode selection ──── ps -eo pid,args ──▶ (attach only)
//! bridge shell ────── perf record ──────▶ /tmp/perf.data
//!   ... Enter / --duration / recorder exit ...
//! SIGTERM recorder
//! bridge shell ────── perf script ──────▶ /tmp/perf.script
//! bridge pull ◀────────────────────────── /tmp/perf.script
//! inferno-collapse-perf | inferno-flamegraph > /tmp/flamegraph.svg
//! xdg-open / open
//! ```
//!
//! ## Module Structure
//!
//! - [`session`]: the state machine tying every step together
//!   - `recording`: stop channel and recorder lifetime
//!   - `pipeline`: convert, pull and render
//! - [`preflight`]: host tool checks
//! - [`mode`]: interactive mode selection
//! - [`process_lookup`]: remote PID resolution for attach mode
//! - [`record`]: `perf record` / `perf script` builders
//! - [`bridge`]: `sdb`/`adb` commands and remote shell quoting
//! - [`runner`]: external process execution
//! - [`viewer`]: open the result
//! - [`config`], [`cli`], [`domain`]: configuration, arguments, core types

pub mod bridge;
pub mod cli;
pub mod config;
pub mod domain;
pub mod mode;
pub mod preflight;
pub mod process_lookup;
pub mod record;
pub mod runner;
pub mod session;
pub mod viewer;
