//! Interactive recording-mode selection
//!
//! Answers come from CLI presets when given, otherwise from a prompt on the
//! session's input stream.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::bridge::split_words;
use crate::domain::SessionError;

/// The operator's answer, before any remote lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeRequest {
    Spawn { launch: Vec<String> },
    Attach { name: String },
    SystemWide,
}

/// Answers supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub mode: Option<String>,
    pub app: Option<String>,
    pub process: Option<String>,
}

/// Line-oriented prompt over any reader/writer pair
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line. EOF reads as empty.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be written or read
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line).context("Failed to read answer")?;
        Ok(line.trim().to_string())
    }

    /// Print a line of text.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Hand back the input stream (used for the stop key after prompting)
    pub fn into_input(self) -> R {
        self.input
    }
}

const MENU: &str = "\nSelect recording mode:\n \
                    1) Spawn app under perf on device\n \
                    2) Attach to a running app by name on device\n \
                    3) System-wide (-a) recording on device";

/// Ask (or take from presets) the mode and its argument.
///
/// # Errors
/// - [`SessionError::InvalidMode`] for anything but `1`, `2` or `3`
/// - [`SessionError::EmptyInput`] for an empty launch command or name
pub fn select_mode<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    presets: &Presets,
) -> Result<ModeRequest> {
    let choice = match presets.mode {
        Some(ref mode) => mode.trim().to_string(),
        None => {
            prompter.say(MENU)?;
            prompter.ask("Choice [1/2/3]: ")?
        }
    };

    match choice.as_str() {
        "1" => {
            let app = answer(prompter, presets.app.as_deref(), "Enter app launch command (on device): ")?;
            let launch = split_words(&app);
            if launch.is_empty() {
                return Err(SessionError::EmptyInput("launch command").into());
            }
            Ok(ModeRequest::Spawn { launch })
        }
        "2" => {
            let name = answer(prompter, presets.process.as_deref(), "Enter process name substring: ")?;
            if name.is_empty() {
                return Err(SessionError::EmptyInput("process name").into());
            }
            Ok(ModeRequest::Attach { name })
        }
        "3" => Ok(ModeRequest::SystemWide),
        _ => Err(SessionError::InvalidMode(choice).into()),
    }
}

fn answer<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    preset: Option<&str>,
    question: &str,
) -> Result<String> {
    match preset {
        Some(value) => Ok(value.trim().to_string()),
        None => prompter.ask(question),
    }
}
