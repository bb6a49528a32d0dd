//! `perf record` / `perf script` command builders

use crate::bridge::RemoteCommand;
use crate::config::SessionConfig;
use crate::domain::RecordingMode;

/// Fixed sampling options plus one mode-specific target clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCommand {
    pub frequency: u32,
    pub call_graph: String,
    pub output: String,
    pub mode: RecordingMode,
}

impl RecordCommand {
    pub fn new(config: &SessionConfig, mode: RecordingMode) -> Self {
        Self {
            frequency: config.frequency,
            call_graph: config.call_graph.clone(),
            output: config.remote_data.clone(),
            mode,
        }
    }

    pub fn argv(&self) -> Vec<String> {
        let mut argv: Vec<String> = vec![
            "perf".into(),
            "record".into(),
            "-F".into(),
            self.frequency.to_string(),
            "--call-graph".into(),
            self.call_graph.clone(),
            "-g".into(),
            "-o".into(),
            self.output.clone(),
        ];
        match self.mode {
            RecordingMode::Spawn { ref launch } => {
                argv.push("--".into());
                argv.extend(launch.iter().cloned());
            }
            RecordingMode::Attach { pid } => {
                argv.push("-p".into());
                argv.push(pid.to_string());
            }
            RecordingMode::SystemWide => argv.push("-a".into()),
        }
        argv
    }

    pub fn remote(&self) -> RemoteCommand {
        RemoteCommand::new(self.argv())
    }
}

/// `perf script -i <data> > <script>` on the device
pub fn script_command(config: &SessionConfig) -> RemoteCommand {
    RemoteCommand::new(["perf", "script", "-i", config.remote_data.as_str()])
        .redirect_to(config.script_path.as_str())
}
