//! Structured error types for devflame
//!
//! Using thiserror for automatic Display implementation and error chaining.

use super::types::Stage;
use std::fmt;
use thiserror::Error;

/// A host tool that could not be found on `PATH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub name: String,
    pub hint: String,
}

impl fmt::Display for MissingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found. {}", self.name, self.hint)
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Missing prerequisites:\n\n{}", format_missing(.0))]
    MissingPrerequisites(Vec<MissingTool>),

    #[error("Invalid choice: '{0}' (expected 1, 2 or 3)")]
    InvalidMode(String),

    #[error("No {0} given")]
    EmptyInput(&'static str),

    #[error("No process matching '{0}' found on device")]
    NoMatchingProcess(String),

    #[error("Unexpected PID column '{0}' in remote process list")]
    InvalidPid(String),

    #[error("{program} failed while {stage} ({status})")]
    ToolFailed { stage: Stage, program: String, status: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn format_missing(tools: &[MissingTool]) -> String {
    tools.iter().map(|t| format!("  - {t}")).collect::<Vec<_>>().join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prerequisites_lists_every_tool() {
        let err = SessionError::MissingPrerequisites(vec![
            MissingTool { name: "sdb".into(), hint: "Install the Tizen SDK.".into() },
            MissingTool { name: "inferno".into(), hint: "cargo install inferno".into() },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("  - sdb not found. Install the Tizen SDK."));
        assert!(msg.contains("  - inferno not found. cargo install inferno"));
    }

    #[test]
    fn test_tool_failed_display() {
        let err = SessionError::ToolFailed {
            stage: Stage::Transferring,
            program: "sdb".into(),
            status: "exit status: 1".into(),
        };
        assert_eq!(err.to_string(), "sdb failed while transferring (exit status: 1)");
    }

    #[test]
    fn test_invalid_mode_display() {
        assert!(SessionError::InvalidMode("9".into()).to_string().contains("'9'"));
    }
}
