//! Domain model for devflame
//!
//! Core types shared by the session stages:
//! - Newtypes for remote identifiers
//! - The recording mode chosen by the operator
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{RecordingMode, RemotePid, Stage};

pub use errors::{MissingTool, SessionError};
