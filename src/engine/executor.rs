use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::DialogError;
use crate::{log_trace, log_warn};

/// Pause between polls inside the forced synchronous drain.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Finished,
}

/// Captured outcome of a finished command.
///
/// `exit_code` is `None` when the child was terminated by a signal (or was
/// killed on timeout) and its status carries no plain exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: Option<i32>,
}

/// Owns the lifecycle of one spawned helper command: start, non-blocking
/// poll, forced synchronous drain, and result retrieval.
///
/// At most one child process is owned at a time; starting a new command on
/// a non-idle executor first drains and discards the previous one. Dropping
/// the executor also drains, so a still-running child never leaks its
/// process handle or pipe.
pub struct Executor {
    state: State,
    output: Vec<u8>,
    exit_code: Option<i32>,
    launch_error: Option<String>,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    timed_out: bool,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            output: Vec::new(),
            exit_code: None,
            launch_error: None,
            timeout: None,
            deadline: None,
            timed_out: false,
            child: None,
            stdout: None,
        }
    }

    /// Launch `command` through the platform shell with stdout captured for
    /// non-blocking reads. Any previous command is drained and discarded
    /// first. A failed launch leaves the executor idle with the failure
    /// reason recorded for [`result`](Self::result).
    pub fn start(&mut self, command: &str) {
        self.start_with_timeout(command, None);
    }

    /// Like [`start`](Self::start), but attaches a deadline: if the command
    /// is still running when a drain passes the deadline, the child is
    /// killed and [`result`](Self::result) reports a timeout.
    pub fn start_with_timeout(&mut self, command: &str, timeout: Option<Duration>) {
        self.stop();
        self.reset();
        self.timeout = timeout;

        log_trace!("{command}");

        match spawn_shell(command) {
            Ok(mut child) => {
                self.stdout = child.stdout.take();
                #[cfg(unix)]
                if let Some(stdout) = self.stdout.as_ref() {
                    if let Err(err) = set_nonblocking(stdout) {
                        let _ = child.kill();
                        let _ = child.wait();
                        self.stdout = None;
                        self.launch_error = Some(err.to_string());
                        return;
                    }
                }
                self.deadline = timeout.map(|t| Instant::now() + t);
                self.child = Some(child);
                self.state = State::Running;
            }
            Err(err) => {
                log_warn!("failed to spawn dialog command: {err}");
                self.launch_error = Some(err.to_string());
            }
        }
    }

    /// Record the outcome of a blocking native call directly, skipping the
    /// child-process machinery. The executor transitions straight to the
    /// finished state.
    pub fn run_blocking<F>(&mut self, call: F)
    where
        F: FnOnce() -> (String, i32),
    {
        self.stop();
        self.reset();
        let (text, code) = call();
        self.output = text.into_bytes();
        self.exit_code = Some(code);
        self.state = State::Finished;
    }

    /// Mark the executor as failed without ever having started a child.
    pub(crate) fn fail(&mut self, reason: String) {
        self.stop();
        self.reset();
        self.launch_error = Some(reason);
    }

    /// Non-blocking progress check. Returns true once the underlying
    /// command has finished (or never started). While running, performs a
    /// single non-blocking read attempt and accumulates any output.
    pub fn ready(&mut self) -> bool {
        if self.state != State::Running {
            return true;
        }
        if self.poll_once() {
            self.state = State::Finished;
            return true;
        }
        false
    }

    /// Forced synchronous drain: poll [`ready`](Self::ready) with a bounded
    /// sleep until the command finishes, then reap the child and capture
    /// its exit code. The only blocking operation in this type.
    pub fn stop(&mut self) {
        if self.state == State::Idle {
            return;
        }

        let mut expired = false;
        while !self.ready() {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    expired = true;
                    break;
                }
            }
            thread::sleep(POLL_INTERVAL);
        }

        if expired {
            if let Some(child) = self.child.as_mut() {
                let _ = child.kill();
            }
            self.timed_out = true;
        }

        self.drain_remaining();

        if let Some(mut child) = self.child.take() {
            if let Ok(status) = child.wait() {
                if !self.timed_out {
                    self.exit_code = status.code();
                }
            }
        }

        self.state = State::Idle;
    }

    /// Drain (forcing completion) and return the captured output text with
    /// the exit code. Idempotent: repeated calls return the same capture.
    pub fn result(&mut self) -> Result<CommandOutput, DialogError> {
        self.stop();

        if let Some(reason) = &self.launch_error {
            return Err(DialogError::Launch(reason.clone()));
        }
        if self.timed_out {
            return Err(DialogError::Timeout(self.timeout.unwrap_or(POLL_INTERVAL)));
        }
        Ok(CommandOutput {
            text: String::from_utf8_lossy(&self.output).into_owned(),
            exit_code: self.exit_code,
        })
    }

    fn reset(&mut self) {
        self.output.clear();
        self.exit_code = None;
        self.launch_error = None;
        self.timeout = None;
        self.deadline = None;
        self.timed_out = false;
    }

    // Pick up whatever is still buffered in the pipe once the child is done
    // (everything, on platforms where ready() polls the process instead of
    // the pipe; the tail after a timeout kill elsewhere).
    fn drain_remaining(&mut self) {
        if let Some(mut stdout) = self.stdout.take() {
            let mut buf = [0u8; 4096];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => self.output.extend_from_slice(&buf[..n]),
                    Err(_) => break,
                }
            }
        }
    }

    // One non-blocking poll. True means the command is done.
    #[cfg(unix)]
    fn poll_once(&mut self) -> bool {
        let Some(stdout) = self.stdout.as_mut() else {
            return true;
        };
        let mut buf = [0u8; 4096];
        match stdout.read(&mut buf) {
            // EOF: the child closed its end of the pipe.
            Ok(0) => true,
            Ok(n) => {
                self.output.extend_from_slice(&buf[..n]);
                false
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => false,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => false,
            Err(_) => true,
        }
    }

    #[cfg(windows)]
    fn poll_once(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };
        matches!(child.try_wait(), Ok(Some(_)) | Err(_))
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn spawn_shell(command: &str) -> std::io::Result<Child> {
    Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
}

#[cfg(windows)]
fn spawn_shell(command: &str) -> std::io::Result<Child> {
    use std::os::windows::process::CommandExt;
    use windows_sys::Win32::System::Threading::CREATE_NO_WINDOW;

    let mut cmd = Command::new("cmd");
    cmd.arg("/C");
    cmd.raw_arg(command);
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd.stdin(Stdio::null()).stdout(Stdio::piped());
    cmd.spawn()
}

// Switch the read end of the pipe to O_NONBLOCK so ready() never stalls.
#[cfg(unix)]
fn set_nonblocking(stdout: &ChildStdout) -> std::io::Result<()> {
    use std::os::fd::AsRawFd;

    let fd = stdout.as_raw_fd();
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn drain(exec: &mut Executor) {
        while !exec.ready() {
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_echo_hello() {
        let mut exec = Executor::new();
        exec.start("echo hello");
        drain(&mut exec);
        let out = exec.result().unwrap();
        assert_eq!(out.text, "hello\n");
        assert_eq!(out.exit_code, Some(0));
    }

    #[cfg(unix)]
    #[test]
    fn test_result_is_idempotent() {
        let mut exec = Executor::new();
        exec.start("echo once");
        let first = exec.result().unwrap();
        let second = exec.result().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.text, "once\n");
    }

    #[test]
    fn test_ready_before_start() {
        let mut exec = Executor::new();
        assert!(exec.ready());
        // Never started: no output, no exit code.
        let out = exec.result().unwrap();
        assert_eq!(out.text, "");
        assert_eq!(out.exit_code, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_ready_does_not_block() {
        let mut exec = Executor::new();
        exec.start("sleep 0.5");
        let t0 = Instant::now();
        let done = exec.ready();
        assert!(!done);
        assert!(t0.elapsed() < Duration::from_millis(200), "ready() blocked");
        // Drop drains the remaining half second.
    }

    #[cfg(unix)]
    #[test]
    fn test_output_accumulates_across_polls() {
        let mut exec = Executor::new();
        exec.start("printf 'a\\n'; sleep 0.3; printf 'b\\n'");
        drain(&mut exec);
        let out = exec.result().unwrap();
        assert_eq!(out.text, "a\nb\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_program_yields_empty_output() {
        let mut exec = Executor::new();
        exec.start("definitely-not-an-installed-program-5577 2>/dev/null");
        let out = exec.result().unwrap();
        assert_eq!(out.text, "");
        // 127 is "command not found" from sh.
        assert_eq!(out.exit_code, Some(127));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let mut exec = Executor::new();
        let timeout = Duration::from_millis(300);
        exec.start_with_timeout("sleep 30", Some(timeout));
        let t0 = Instant::now();
        let err = exec.result().unwrap_err();
        assert_eq!(err, DialogError::Timeout(timeout));
        assert!(t0.elapsed() < Duration::from_secs(5), "timeout did not fire");
    }

    #[cfg(unix)]
    #[test]
    fn test_restart_discards_previous_command() {
        let mut exec = Executor::new();
        exec.start("echo first");
        exec.start("echo second");
        let out = exec.result().unwrap();
        assert_eq!(out.text, "second\n");
    }

    #[test]
    fn test_run_blocking_completes_immediately() {
        let mut exec = Executor::new();
        exec.run_blocking(|| ("picked".to_string(), 6));
        assert!(exec.ready());
        let out = exec.result().unwrap();
        assert_eq!(out.text, "picked");
        assert_eq!(out.exit_code, Some(6));
    }

    #[test]
    fn test_fail_surfaces_launch_error() {
        let mut exec = Executor::new();
        exec.fail("no backend".into());
        assert!(exec.ready());
        assert_eq!(exec.result(), Err(DialogError::Launch("no backend".into())));
        // Still failed on the second ask.
        assert!(exec.result().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_file_content_through_shell() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from a scratch file").unwrap();
        let mut exec = Executor::new();
        exec.start(&format!("cat {}", crate::utils::shell_quote(&file.path().to_string_lossy())));
        let out = exec.result().unwrap();
        assert_eq!(out.text, "from a scratch file\n");
        assert_eq!(out.exit_code, Some(0));
    }

    #[cfg(target_os = "linux")]
    fn open_fd_count() -> usize {
        std::fs::read_dir("/proc/self/fd").map(|d| d.count()).unwrap_or(0)
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_drop_does_not_leak_process_or_fds() {
        let before = open_fd_count();
        {
            let mut exec = Executor::new();
            exec.start("sleep 0.2");
            // Dropped while still running: Drop drains and reaps.
        }
        let after = open_fd_count();
        assert_eq!(before, after);
    }
}
