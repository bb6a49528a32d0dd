//! # Remote Recording Control
//!
//! The remote `perf record` runs behind a [`RecordingHandle`] while the host
//! waits for a stop request. Requests arrive on a channel so any source can
//! end the recording:
//!
//! - the Enter key ([`spawn_keyboard_listener`])
//! - a `--duration` deadline
//! - the recorder exiting by itself (spawned app finished, perf failed)
//!
//! There is no other timeout: without a duration the wait is unbounded.

use anyhow::Result;
use crossbeam_channel::{after, never, select, tick, unbounded, Receiver, Sender};
use log::{debug, info, warn};
use std::fmt;
use std::io::BufRead;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::runner::RecordingHandle;

/// How often the recorder is checked for an early exit
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Keypress,
    Timer,
    RecorderExited,
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Keypress => "stopped by user",
            Self::Timer => "duration limit reached",
            Self::RecorderExited => "recorder exited",
            Self::Requested => "stop requested",
        };
        f.write_str(text)
    }
}

/// Sending half: clone freely and hand to any stop source
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Sender<StopReason>,
}

impl StopSignal {
    pub fn request_stop(&self, reason: StopReason) {
        debug!("stop requested: {reason}");
        // The receiver only goes away once the session is over
        let _ = self.tx.send(reason);
    }
}

/// Receiving half, owned by the session
#[derive(Debug)]
pub struct StopReceiver {
    rx: Receiver<StopReason>,
}

pub fn stop_channel() -> (StopSignal, StopReceiver) {
    let (tx, rx) = unbounded();
    (StopSignal { tx }, StopReceiver { rx })
}

/// Request a stop when a line (Enter) is read from `input`.
///
/// EOF does not count as a keypress: with a closed stdin the recording ends
/// only through another source.
pub fn spawn_keyboard_listener<R>(mut input: R, signal: StopSignal) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => debug!("stdin closed, Enter key cannot stop the recording"),
            Ok(_) => signal.request_stop(StopReason::Keypress),
            Err(e) => debug!("stdin read failed: {e}"),
        }
    })
}

/// Block until a stop request, the deadline, or the recorder's own exit.
///
/// # Errors
/// Returns an error if the recorder's state cannot be polled
pub fn wait_for_stop(
    handle: &mut dyn RecordingHandle,
    stop: &StopReceiver,
    limit: Option<Duration>,
    poll: Duration,
) -> Result<StopReason> {
    let deadline = limit.map_or_else(never::<Instant>, after);
    let ticker = tick(poll);

    loop {
        select! {
            recv(stop.rx) -> reason => return Ok(reason.unwrap_or(StopReason::Requested)),
            recv(deadline) -> _ => return Ok(StopReason::Timer),
            recv(ticker) -> _ => {
                if handle.has_exited()? {
                    return Ok(StopReason::RecorderExited);
                }
            }
        }
    }
}

/// Wait for a stop, then terminate the recorder and wait for it to finish.
///
/// The recorder is terminated on every path, including a failed poll.
///
/// # Errors
/// Returns an error if polling or terminating the recorder fails
pub fn record_until_stopped(
    handle: &mut dyn RecordingHandle,
    stop: &StopReceiver,
    limit: Option<Duration>,
) -> Result<StopReason> {
    let started = Instant::now();
    let reason = match wait_for_stop(handle, stop, limit, POLL_INTERVAL) {
        Ok(reason) => reason,
        Err(e) => {
            // The bridge process outlives a dropped Child, stop it before bailing
            if let Err(term) = handle.terminate() {
                warn!("Failed to stop recorder after poll error: {term:#}");
            }
            return Err(e);
        }
    };
    info!("recording ended after {:.1}s: {reason}", started.elapsed().as_secs_f64());
    handle.terminate()?;
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeRecorder {
        exited: Arc<AtomicBool>,
        poll_fails: bool,
        terminated: bool,
    }

    impl RecordingHandle for FakeRecorder {
        fn has_exited(&mut self) -> Result<bool> {
            if self.poll_fails {
                anyhow::bail!("waitpid failed");
            }
            Ok(self.exited.load(Ordering::SeqCst))
        }

        fn terminate(&mut self) -> Result<()> {
            self.terminated = true;
            Ok(())
        }
    }

    #[test]
    fn test_explicit_stop_request() {
        let (signal, stop) = stop_channel();
        let mut recorder = FakeRecorder::default();
        signal.request_stop(StopReason::Requested);
        let reason = record_until_stopped(&mut recorder, &stop, None).unwrap();
        assert_eq!(reason, StopReason::Requested);
        assert!(recorder.terminated);
    }

    #[test]
    fn test_keyboard_listener_stops_on_enter() {
        let (signal, stop) = stop_channel();
        spawn_keyboard_listener(Cursor::new(b"\n".to_vec()), signal).join().unwrap();
        let mut recorder = FakeRecorder::default();
        let reason = wait_for_stop(&mut recorder, &stop, None, POLL_INTERVAL).unwrap();
        assert_eq!(reason, StopReason::Keypress);
    }

    #[test]
    fn test_keyboard_listener_ignores_eof() {
        let (signal, stop) = stop_channel();
        spawn_keyboard_listener(Cursor::new(Vec::new()), signal.clone()).join().unwrap();
        let mut recorder = FakeRecorder::default();
        let reason =
            wait_for_stop(&mut recorder, &stop, Some(Duration::from_millis(50)), POLL_INTERVAL)
                .unwrap();
        assert_eq!(reason, StopReason::Timer);
        drop(signal);
    }

    #[test]
    fn test_duration_limit() {
        let (_signal, stop) = stop_channel();
        let mut recorder = FakeRecorder::default();
        let started = Instant::now();
        let reason = record_until_stopped(&mut recorder, &stop, Some(Duration::from_millis(30)))
            .unwrap();
        assert_eq!(reason, StopReason::Timer);
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(recorder.terminated);
    }

    #[test]
    fn test_recorder_exit_ends_wait() {
        let (_signal, stop) = stop_channel();
        let mut recorder = FakeRecorder::default();
        recorder.exited.store(true, Ordering::SeqCst);
        let reason =
            wait_for_stop(&mut recorder, &stop, None, Duration::from_millis(5)).unwrap();
        assert_eq!(reason, StopReason::RecorderExited);
    }

    #[test]
    fn test_stop_from_another_thread() {
        let (signal, stop) = stop_channel();
        let mut recorder = FakeRecorder::default();
        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            signal.request_stop(StopReason::Keypress);
        });
        let reason = wait_for_stop(&mut recorder, &stop, None, POLL_INTERVAL).unwrap();
        sender.join().unwrap();
        assert_eq!(reason, StopReason::Keypress);
    }

    #[test]
    fn test_poll_failure_still_terminates_recorder() {
        let (_signal, stop) = stop_channel();
        let mut recorder = FakeRecorder { poll_fails: true, ..FakeRecorder::default() };
        let err = record_until_stopped(&mut recorder, &stop, None).unwrap_err();
        assert!(err.to_string().contains("waitpid failed"));
        assert!(recorder.terminated);
    }

    #[test]
    fn test_keyboard_listener_uses_buffered_line() {
        // The mode answer was already consumed from this reader; the Enter behind it remains
        let mut input = Cursor::new(b"3\n\n".to_vec());
        let mut answer = String::new();
        input.read_line(&mut answer).unwrap();

        let (signal, stop) = stop_channel();
        spawn_keyboard_listener(input, signal).join().unwrap();
        let mut recorder = FakeRecorder::default();
        let reason =
            wait_for_stop(&mut recorder, &stop, Some(Duration::from_secs(5)), POLL_INTERVAL)
                .unwrap();
        assert_eq!(reason, StopReason::Keypress);
    }
}
