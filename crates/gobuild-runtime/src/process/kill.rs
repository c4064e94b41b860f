//! Whole-tree process termination.
//!
//! A supervised `go run` spawns the compiled temporary binary as a child of
//! its own, so signalling only the direct child would leave that binary
//! running. Two mechanisms cover the supported platforms:
//! - `SignalTreeKiller`: children are spawned as process group leaders and
//!   the whole group receives SIGTERM
//! - `TaskkillTreeKiller`: `taskkill /F /T` walks the tree on Windows

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;
use tracing::debug;

/// Terminates a process and everything it spawned.
pub trait ProcessTreeKiller: Send + Sync + fmt::Debug {
    /// Terminate the tree rooted at `pid`.
    ///
    /// A tree that is already gone is not an error.
    fn kill_tree(&self, pid: u32) -> io::Result<()>;
}

/// Sends SIGTERM to the process group led by the child.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalTreeKiller;

#[cfg(unix)]
impl ProcessTreeKiller for SignalTreeKiller {
    fn kill_tree(&self, pid: u32) -> io::Result<()> {
        let raw = i32::try_from(pid).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("pid {pid} out of range"))
        })?;

        match killpg(Pid::from_raw(raw), Signal::SIGTERM) {
            Ok(()) => {
                debug!(pid = %pid, "Sent SIGTERM to process group");
                Ok(())
            }
            Err(Errno::ESRCH) => {
                debug!(pid = %pid, "Process group already gone");
                Ok(())
            }
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

/// Runs `taskkill /F /T /PID <pid>`.
#[derive(Debug, Clone)]
pub struct TaskkillTreeKiller {
    program: PathBuf,
}

impl TaskkillTreeKiller {
    pub fn new() -> Self {
        Self::with_program("taskkill")
    }

    /// Use a specific `taskkill` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TaskkillTreeKiller {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTreeKiller for TaskkillTreeKiller {
    fn kill_tree(&self, pid: u32) -> io::Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["/F", "/T", "/PID", &pid.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let status = cmd.status()?;
        if status.success() {
            debug!(pid = %pid, "taskkill terminated process tree");
            Ok(())
        } else {
            Err(io::Error::other(format!("taskkill exited with {status}")))
        }
    }
}

/// The tree killer for the current platform.
pub fn default_tree_killer() -> Arc<dyn ProcessTreeKiller> {
    #[cfg(unix)]
    {
        Arc::new(SignalTreeKiller)
    }

    #[cfg(not(unix))]
    {
        Arc::new(TaskkillTreeKiller::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_taskkill_reports_error() {
        let killer = TaskkillTreeKiller::with_program("/nonexistent/taskkill");
        assert!(killer.kill_tree(1).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_killer_ignores_missing_group() {
        // Reap a short-lived group leader so its pgid is certainly free
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();

        assert!(SignalTreeKiller.kill_tree(pid).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_killer_rejects_out_of_range_pid() {
        let err = SignalTreeKiller.kill_tree(u32::MAX).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
