//! Device bridge commands (`sdb` / `adb`)
//!
//! Both bridges share the `shell <cmd>` and `pull <remote> <local>`
//! subcommands and accept `-s <serial>` to pick a device. Remote commands are
//! built as argument vectors and quoted word by word when rendered for the
//! device shell.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::runner::ToolCommand;

/// Which bridge executable talks to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeKind {
    /// Tizen smart development bridge
    #[default]
    Sdb,
    /// Android debug bridge
    Adb,
}

impl BridgeKind {
    pub fn program(self) -> &'static str {
        match self {
            Self::Sdb => "sdb",
            Self::Adb => "adb",
        }
    }

    /// Remediation text shown when the executable is missing
    pub fn install_hint(self) -> &'static str {
        match self {
            Self::Sdb => {
                "Install the Tizen SDK (provides `sdb`).\n    \
                 Download: https://developer.tizen.org/development/sdk-download"
            }
            Self::Adb => {
                "Install Android SDK platform-tools (provides `adb`).\n    \
                 Download: https://developer.android.com/tools/releases/platform-tools"
            }
        }
    }
}

impl fmt::Display for BridgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for BridgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sdb" => Ok(Self::Sdb),
            "adb" => Ok(Self::Adb),
            other => Err(format!("unknown bridge '{other}' (expected sdb or adb)")),
        }
    }
}

/// A command line to run on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub argv: Vec<String>,
    /// Redirect stdout into this remote file
    pub stdout_to: Option<String>,
}

impl RemoteCommand {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { argv: argv.into_iter().map(Into::into).collect(), stdout_to: None }
    }

    #[must_use]
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.stdout_to = Some(path.into());
        self
    }

    /// Render for the device's POSIX shell
    pub fn render(&self) -> String {
        let mut line = self.argv.iter().map(|w| quote(w)).collect::<Vec<_>>().join(" ");
        if let Some(ref path) = self.stdout_to {
            line.push_str(" > ");
            line.push_str(&quote(path));
        }
        line
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_./:=,+@%-".contains(c)
}

/// Single-quote a word unless it is made only of shell-inert characters
fn quote(word: &str) -> String {
    if !word.is_empty() && word.chars().all(is_plain) {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// A configured bridge (kind plus optional device serial)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bridge {
    pub kind: BridgeKind,
    pub serial: Option<String>,
}

impl Bridge {
    fn base(&self) -> ToolCommand {
        let cmd = ToolCommand::new(self.kind.program());
        match self.serial {
            Some(ref serial) => cmd.arg("-s").arg(serial.clone()),
            None => cmd,
        }
    }

    /// `<bridge> shell <rendered remote command>`
    pub fn shell(&self, remote: &RemoteCommand) -> ToolCommand {
        self.base().arg("shell").arg(remote.render())
    }

    /// `<bridge> pull <remote> <local>`
    pub fn pull(&self, remote: &str, local: &Path) -> ToolCommand {
        self.base().arg("pull").arg(remote).arg(local.to_string_lossy())
    }
}

/// Split an operator-typed command line into words.
///
/// Whitespace separates words; single and double quotes group them and a
/// backslash escapes the next character outside single quotes.
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut open_quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (open_quote, c) {
            (Some(q), c) if c == q => open_quote = None,
            (Some('"') | None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                open_quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words_render_verbatim() {
        let cmd = RemoteCommand::new(["perf", "script", "-i", "/tmp/perf.data"])
            .redirect_to("/tmp/perf.script");
        assert_eq!(cmd.render(), "perf script -i /tmp/perf.data > /tmp/perf.script");
    }

    #[test]
    fn test_metacharacters_are_quoted() {
        let cmd = RemoteCommand::new(["echo", "a; rm -rf /", "it's"]);
        assert_eq!(cmd.render(), r"echo 'a; rm -rf /' 'it'\''s'");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("$(reboot)"), "'$(reboot)'");
    }

    #[test]
    fn test_bridge_with_serial() {
        let bridge = Bridge { kind: BridgeKind::Adb, serial: Some("emulator-5554".into()) };
        let cmd = bridge.shell(&RemoteCommand::new(["ps"]));
        assert_eq!(cmd.program, "adb");
        assert_eq!(cmd.args, ["-s", "emulator-5554", "shell", "ps"]);
    }

    #[test]
    fn test_pull_keeps_paths() {
        let cmd = Bridge::default().pull("/tmp/perf.script", Path::new("/tmp/perf.script"));
        assert_eq!(cmd.to_string(), "sdb pull /tmp/perf.script /tmp/perf.script");
    }

    #[test]
    fn test_bridge_kind_parse() {
        assert_eq!("adb".parse::<BridgeKind>().unwrap(), BridgeKind::Adb);
        assert!("ssh".parse::<BridgeKind>().is_err());
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("  /usr/bin/app --fast  "), ["/usr/bin/app", "--fast"]);
        assert_eq!(split_words(r#"app "two words" 'x y' a\ b"#), ["app", "two words", "x y", "a b"]);
        assert_eq!(split_words("app ''"), ["app", ""]);
        assert!(split_words("   ").is_empty());
    }
}
