//! External test-suite runner
//!
//! Runs the project's test command through the platform shell, bounded by a
//! timeout, and parses pass/fail counts out of whatever the runner prints.
//! stdout and stderr are drained on helper threads so a chatty runner can't
//! fill its pipe and stall. On unix the runner gets its own process group, and
//! a timeout kills the whole group so no grandchild keeps the pipes open.

use crate::models::TestRunSummary;
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

static PASSED: OnceLock<Regex> = OnceLock::new();
static FAILED: OnceLock<Regex> = OnceLock::new();
static ANSI: OnceLock<Regex> = OnceLock::new();

fn passed_pattern() -> &'static Regex {
    PASSED.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s+(?:tests?\s+)?(?:passed|passing)").expect("valid regex")
    })
}

fn failed_pattern() -> &'static Regex {
    FAILED.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s+(?:tests?\s+)?(?:failed|failing)").expect("valid regex")
    })
}

fn ansi_pattern() -> &'static Regex {
    ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid regex"))
}

/// Outcome of one test command invocation
#[derive(Debug, Clone)]
pub struct TestRunResult {
    /// Whether the process ran to completion (it may still report failures)
    pub completed: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Why the process could not be run
    pub error: Option<String>,
    pub duration: Duration,
}

impl TestRunResult {
    pub fn completed(stdout: String, stderr: String, exit_code: Option<i32>, duration: Duration) -> Self {
        Self {
            completed: true,
            stdout,
            stderr,
            exit_code,
            timed_out: false,
            error: None,
            duration,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            completed: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            timed_out: false,
            error: Some(error),
            duration: Duration::ZERO,
        }
    }

    pub fn timeout(command: &str, timeout_secs: u64) -> Self {
        Self {
            completed: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            timed_out: true,
            error: Some(format!("'{}' timed out after {}s", command, timeout_secs)),
            duration: Duration::from_secs(timeout_secs),
        }
    }

    /// Pass/fail counts from both output streams
    pub fn summary(&self) -> TestRunSummary {
        let (passed, failed) = parse_test_counts(&format!("{}\n{}", self.stdout, self.stderr));
        TestRunSummary {
            passed,
            failed,
            total: passed + failed,
            timed_out: self.timed_out,
            exit_code: self.exit_code,
        }
    }
}

/// Sum `N passed` / `N failed` counts across a runner's output.
///
/// Suite and file tallies (`Test Suites: 2 passed`, `Test Files 2 passed`)
/// are skipped so they don't double-count individual tests.
pub fn parse_test_counts(output: &str) -> (usize, usize) {
    let clean = ansi_pattern().replace_all(output, "");
    let mut passed = 0usize;
    let mut failed = 0usize;

    for line in clean.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("Test Suites") || trimmed.starts_with("Test Files") {
            continue;
        }
        for caps in passed_pattern().captures_iter(line) {
            if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
                passed = passed.saturating_add(n);
            }
        }
        for caps in failed_pattern().captures_iter(line) {
            if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
                failed = failed.saturating_add(n);
            }
        }
    }
    (passed, failed)
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

/// Put the runner in its own process group
#[cfg(unix)]
fn isolate(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_cmd: &mut Command) {}

/// Kill the runner and everything it spawned, then reap it
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
            debug!("Failed to kill process group {}: {}", child.id(), e);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Run `command` in `cwd` through the shell, killing it after
/// `timeout_secs` (0 = no timeout)
pub fn run_test_command(command: &str, cwd: &Path, timeout_secs: u64) -> TestRunResult {
    let command = command.trim();
    if command.is_empty() {
        return TestRunResult::failure("Empty test command".to_string());
    }

    debug!("Running test command in {:?}: {}", cwd, command);
    let mut cmd = shell_command(command);
    cmd.current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    isolate(&mut cmd);

    let mut child: Child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return TestRunResult::failure(format!("Failed to run '{}': {}", command, e));
        }
    };

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return TestRunResult::completed(
                    collect(stdout),
                    collect(stderr),
                    status.code(),
                    start.elapsed(),
                );
            }
            Ok(None) => {
                if timeout_secs > 0 && start.elapsed() > timeout {
                    kill_tree(&mut child);
                    warn!("'{}' timed out after {}s", command, timeout_secs);
                    // Drain threads end once the group's pipes close; a
                    // child that left the group must not block the caller
                    drop((stdout, stderr));
                    return TestRunResult::timeout(command, timeout_secs);
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_tree(&mut child);
                return TestRunResult::failure(format!("Failed to wait for '{}': {}", command, e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jest_output() {
        let out = "Test Suites: 1 failed, 2 passed, 3 total\nTests:       2 failed, 10 passed, 12 total\n";
        assert_eq!(parse_test_counts(out), (10, 2));
    }

    #[test]
    fn test_parse_pytest_and_mocha() {
        assert_eq!(parse_test_counts("===== 7 passed, 1 failed in 0.31s ====="), (7, 1));
        assert_eq!(parse_test_counts("  5 passing (20ms)\n  1 failing\n"), (5, 1));
    }

    #[test]
    fn test_parse_sums_cargo_binaries() {
        let out = "test result: ok. 4 passed; 0 failed; 0 ignored\ntest result: ok. 2 passed; 0 failed;\n";
        assert_eq!(parse_test_counts(out), (6, 0));
    }

    #[test]
    fn test_parse_strips_color_codes() {
        assert_eq!(
            parse_test_counts("\x1b[32m3 passed\x1b[0m, \x1b[31m1 failed\x1b[0m"),
            (3, 1)
        );
        assert_eq!(parse_test_counts("no summary here"), (0, 0));
    }

    #[test]
    fn test_empty_command_fails() {
        let result = run_test_command("   ", Path::new("."), 5);
        assert!(!result.completed);
        assert!(result.error.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_shell_command_and_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_test_command("echo '3 passed'; echo '1 failed' >&2; exit 1", dir.path(), 10);
        assert!(result.completed);
        assert_eq!(result.exit_code, Some(1));
        let summary = result.summary();
        assert_eq!((summary.passed, summary.failed, summary.total), (3, 1, 4));
        assert!(!summary.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_process() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_test_command("sleep 5", dir.path(), 1);
        assert!(result.timed_out);
        assert!(!result.completed);
        assert!(result.summary().timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_background_children() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let command = format!("(sleep 2; touch '{}') & sleep 30", marker.display());

        let start = Instant::now();
        let result = run_test_command(&command, dir.path(), 1);
        assert!(result.timed_out);
        assert!(start.elapsed() < Duration::from_secs(10));

        thread::sleep(Duration::from_millis(3500));
        assert!(!marker.exists(), "background child outlived the timeout");
    }
}
