//! Domain types providing compile-time safety and self-documentation

use std::fmt;
use std::str::FromStr;

/// Process ID on the remote device
///
/// Kept distinct from host PIDs: it is only ever passed to `perf record -p`
/// on the device, never signalled from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemotePid(pub u32);

impl fmt::Display for RemotePid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePid {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>().map(RemotePid)
    }
}

/// What `perf record` should sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingMode {
    /// Launch an application under perf (`-- <launch words>`)
    Spawn { launch: Vec<String> },
    /// Attach to a running process (`-p <pid>`)
    Attach { pid: RemotePid },
    /// Record every CPU (`-a`)
    SystemWide,
}

impl fmt::Display for RecordingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { launch } => write!(f, "spawn `{}`", launch.join(" ")),
            Self::Attach { pid } => write!(f, "attach to pid {pid}"),
            Self::SystemWide => write!(f, "system-wide"),
        }
    }
}

/// Session progress, in the only order it can happen
///
/// Every stage may end in an abort; none is entered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    PrerequisitesChecked,
    ModeSelected,
    TargetResolved,
    Recording,
    Converting,
    Transferring,
    Rendering,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PrerequisitesChecked => "prerequisites-checked",
            Self::ModeSelected => "mode-selected",
            Self::TargetResolved => "target-resolved",
            Self::Recording => "recording",
            Self::Converting => "converting",
            Self::Transferring => "transferring",
            Self::Rendering => "rendering",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_pid_parse() {
        assert_eq!("1234".parse::<RemotePid>().unwrap(), RemotePid(1234));
        assert!("PID".parse::<RemotePid>().is_err());
        assert!("-1".parse::<RemotePid>().is_err());
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Idle < Stage::PrerequisitesChecked);
        assert!(Stage::Recording < Stage::Converting);
        assert!(Stage::Rendering < Stage::Done);
    }

    #[test]
    fn test_mode_display() {
        let mode = RecordingMode::Spawn { launch: vec!["/usr/bin/app".into(), "--fast".into()] };
        assert_eq!(mode.to_string(), "spawn `/usr/bin/app --fast`");
        assert_eq!(RecordingMode::Attach { pid: RemotePid(7) }.to_string(), "attach to pid 7");
    }
}
