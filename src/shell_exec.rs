//! Bounded execution of external tools (`git`, code-host CLIs).
//!
//! Every invocation carries a timeout. Pipes are drained on reader threads
//! while the child runs so a large listing cannot fill the pipe buffer and
//! stall the wait.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use crate::git::GitError;

/// Timeout applied when the caller does not pick one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to wait for reader threads once the child has exited
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Captured result of a finished command
#[derive(Debug)]
pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Builder for a single external invocation.
///
/// ```ignore
/// let output = Cmd::new("git")
///     .args(["worktree", "list", "--porcelain"])
///     .current_dir(&repo_root)
///     .timeout(Duration::from_secs(10))
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
    timeout: Duration,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The command line as shown in logs and error messages.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Run to completion or until the timeout fires.
    ///
    /// Exit status is returned, not interpreted: a nonzero exit is still `Ok`.
    pub fn run(self) -> Result<CmdOutput, GitError> {
        let display = self.display();
        match &self.current_dir {
            Some(dir) => log::debug!("$ {display} [{}]", dir.display()),
            None => log::debug!("$ {display}"),
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let start = Instant::now();
        let mut child = command.spawn().map_err(|e| {
            // A missing working directory also reports NotFound
            let dir_exists = self.current_dir.as_ref().is_none_or(|dir| dir.is_dir());
            if e.kind() == std::io::ErrorKind::NotFound && dir_exists {
                GitError::ToolNotFound {
                    tool: self.program.clone(),
                }
            } else {
                GitError::CommandFailed {
                    command: display.clone(),
                    error: e.to_string(),
                }
            }
        })?;

        let stdout_rx = drain(child.stdout.take());
        let stderr_rx = drain(child.stderr.take());

        let waited = child
            .wait_timeout(self.timeout)
            .map_err(|e| GitError::CommandFailed {
                command: display.clone(),
                error: e.to_string(),
            })?;

        let Some(status) = waited else {
            kill(&mut child);
            log::debug!("Timed out after {:?}: {display}", self.timeout);
            return Err(GitError::CommandTimedOut {
                command: display,
                timeout: self.timeout,
            });
        };

        log::trace!("Finished in {:?}: {display}", start.elapsed());

        let stdout = collect(&stdout_rx, "stdout", &display)?;
        let stderr = collect(&stderr_rx, "stderr", &display)?;

        Ok(CmdOutput {
            status,
            stdout,
            stderr,
        })
    }
}

/// Read a child pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    match pipe {
        Some(mut pipe) => {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = tx.send(buf);
            });
        }
        None => {
            let _ = tx.send(Vec::new());
        }
    }
    rx
}

/// Wait for a drained pipe. A pipe still held open by a descendant after the
/// child exited is a failure, never an empty result.
fn collect(rx: &mpsc::Receiver<Vec<u8>>, stream: &str, command: &str) -> Result<Vec<u8>, GitError> {
    rx.recv_timeout(OUTPUT_COLLECTION_TIMEOUT).map_err(|_| {
        log::debug!("Gave up collecting {stream} after {OUTPUT_COLLECTION_TIMEOUT:?}: {command}");
        GitError::CommandFailed {
            command: command.to_string(),
            error: format!(
                "{stream} was not collected within {}s of the command exiting; a background process may still hold it open",
                OUTPUT_COLLECTION_TIMEOUT.as_secs()
            ),
        }
    })
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Failed to kill timed-out child: {e}");
    }
    // Reap so the process does not linger as a zombie
    let _ = child.wait();
}
