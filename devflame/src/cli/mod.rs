//! Command-line interface for devflame
//!
//! This module contains CLI argument parsing

pub mod args;

pub use args::Args;
