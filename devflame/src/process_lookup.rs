//! Resolve a remote PID from a process-name substring.
//!
//! The device is asked for `ps -eo pid,args` and the filtering happens here,
//! so the operator's text never reaches the remote shell.

use anyhow::Result;
use log::{info, warn};

use crate::bridge::{Bridge, RemoteCommand};
use crate::domain::{RemotePid, SessionError, Stage};
use crate::runner::CommandRunner;

/// A remote process line that matched the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProcess {
    pub pid: RemotePid,
    pub command: String,
}

const PS_ARGV: [&str; 3] = ["ps", "-eo", "pid,args"];

/// `ps` invocation listing PID first, then the full command line
pub fn process_list_command() -> RemoteCommand {
    RemoteCommand::new(PS_ARGV)
}

/// Query the device and resolve `name` to a PID.
///
/// When several processes match, the first line wins and the others are
/// reported in a warning.
///
/// # Errors
/// - The bridge query fails
/// - No process matches ([`SessionError::NoMatchingProcess`])
pub fn find_remote_process(
    runner: &mut dyn CommandRunner,
    bridge: &Bridge,
    name: &str,
) -> Result<RemoteProcess> {
    let listing = runner.capture(Stage::TargetResolved, &bridge.shell(&process_list_command()))?;
    let mut matches = matching_processes(&listing, name)?;

    if matches.is_empty() {
        return Err(SessionError::NoMatchingProcess(name.to_string()).into());
    }

    let chosen = matches.remove(0);
    if !matches.is_empty() {
        let ignored: Vec<String> =
            matches.iter().map(|m| format!("  {} ({})", m.pid, m.command)).collect();
        warn!(
            "Multiple processes match '{name}', using {} ({}). Ignored:\n{}",
            chosen.pid,
            chosen.command,
            ignored.join("\n")
        );
    }
    info!("Resolved '{name}' to remote pid {}", chosen.pid);
    Ok(chosen)
}

/// Lines of `listing` containing `name`, in listing order.
///
/// Lines whose first column is not a number (the `PID` header) are skipped,
/// and so is the query itself along with any `sh -c` running it.
fn matching_processes(listing: &str, name: &str) -> Result<Vec<RemoteProcess>, SessionError> {
    let query = PS_ARGV.join(" ");
    let mut matches = Vec::new();
    for line in listing.lines() {
        let line = line.trim();
        let Some((first, rest)) = split_first_column(line) else {
            continue;
        };
        if !first.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if !rest.contains(name) || rest.contains(&query) {
            continue;
        }
        let pid = first.parse().map_err(|_| SessionError::InvalidPid(first.to_string()))?;
        matches.push(RemoteProcess { pid, command: rest.to_string() });
    }
    Ok(matches)
}

fn split_first_column(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((first, rest)) => Some((first, rest.trim_start())),
        None => Some((line, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "  PID COMMAND\n    1 /sbin/init\n  812 /usr/bin/foo-daemon --bg\n 1290 /usr/bin/bar\n 1301 foo --child\n";

    #[test]
    fn test_first_match_wins() {
        let matches = matching_processes(LISTING, "foo").unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].pid, RemotePid(812));
        assert_eq!(matches[0].command, "/usr/bin/foo-daemon --bg");
    }

    #[test]
    fn test_header_is_not_a_match() {
        assert!(matching_processes(LISTING, "COMMAND").unwrap().is_empty());
    }

    #[test]
    fn test_query_does_not_match_itself() {
        let listing = "  PID COMMAND\n  640 /usr/bin/psensor\n 2001 sh -c ps -eo pid,args\n 2002 ps -eo pid,args\n";
        for name in ["ps", "pid", "args"] {
            let matches = matching_processes(listing, name).unwrap();
            assert!(matches.iter().all(|m| m.pid != RemotePid(2001) && m.pid != RemotePid(2002)), "{name}");
        }
        let matches = matching_processes(listing, "ps").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pid, RemotePid(640));
    }

    #[test]
    fn test_pid_column_is_not_searched() {
        assert!(matching_processes(LISTING, "1290").unwrap().is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(matching_processes(LISTING, "qux").unwrap().is_empty());
        assert!(matching_processes("", "foo").unwrap().is_empty());
    }

    #[test]
    fn test_pid_overflow_is_an_error() {
        let err = matching_processes("99999999999 foo\n", "foo").unwrap_err();
        assert!(matches!(err, SessionError::InvalidPid(_)));
    }

    #[test]
    fn test_process_list_command() {
        assert_eq!(process_list_command().render(), "ps -eo pid,args");
    }
}
