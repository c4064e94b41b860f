//! Supervised process handle.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use gobuild_core::{
    DEFAULT_READ_CHUNK_SIZE, OutputChunk, ProcessError, ProcessOutcome, StreamKind,
};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::drain::StreamDrain;
use super::kill::{ProcessTreeKiller, default_tree_killer};
use crate::sync::lock;

/// Knobs for [`ProcessHandle::start_with`].
#[derive(Debug, Clone)]
pub struct StartOptions {
    /// Bytes per read from stdout/stderr.
    pub chunk_size: usize,
    /// How the process tree is terminated on cancel.
    pub killer: Arc<dyn ProcessTreeKiller>,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_READ_CHUNK_SIZE,
            killer: default_tree_killer(),
        }
    }
}

#[derive(Debug, Default)]
struct TerminalState {
    /// Live child pid; cleared once the child is reaped or signalled.
    pid: Option<u32>,
    outcome: Option<ProcessOutcome>,
    finished: Option<Instant>,
}

/// One spawned subprocess.
///
/// The outcome and finish time are recorded together, exactly once, by
/// whichever of [`terminate`](Self::terminate) and the internal finalize task
/// gets the state lock first.
pub struct ProcessHandle {
    args: Vec<String>,
    cwd: PathBuf,
    env: HashMap<String, String>,
    started: Instant,
    started_at: DateTime<Utc>,
    killer: Arc<dyn ProcessTreeKiller>,
    state: Mutex<TerminalState>,
    outcome: watch::Sender<Option<ProcessOutcome>>,
    output: Mutex<Option<mpsc::UnboundedReceiver<OutputChunk>>>,
}

impl ProcessHandle {
    /// Spawn `args` in `cwd` with exactly `env` as its environment.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        args: Vec<String>,
        cwd: impl Into<PathBuf>,
        env: HashMap<String, String>,
    ) -> Result<Arc<Self>, ProcessError> {
        Self::start_with(args, cwd, env, StartOptions::default())
    }

    pub fn start_with(
        args: Vec<String>,
        cwd: impl Into<PathBuf>,
        env: HashMap<String, String>,
        opts: StartOptions,
    ) -> Result<Arc<Self>, ProcessError> {
        let cwd = cwd.into();
        let Some(program) = args.first().cloned() else {
            return Err(ProcessError::EmptyCommand);
        };

        let mut cmd = Command::new(&program);
        cmd.args(&args[1..])
            .current_dir(&cwd)
            .env_clear()
            .envs(&env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Group leader, so cancellation can signal the whole tree
        #[cfg(unix)]
        cmd.process_group(0);

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let started = Instant::now();
        let started_at = Utc::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| ProcessError::spawn(program.clone(), e))?;
        let pid = child.id();

        let (tx, rx) = mpsc::unbounded_channel();
        let mut drains = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            let drain = StreamDrain::new(StreamKind::Stdout, opts.chunk_size);
            drains.push(drain.spawn(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            let drain = StreamDrain::new(StreamKind::Stderr, opts.chunk_size);
            drains.push(drain.spawn(stderr, tx.clone()));
        }

        let (outcome, _) = watch::channel(None);
        let handle = Arc::new(Self {
            args,
            cwd,
            env,
            started,
            started_at,
            killer: opts.killer,
            state: Mutex::new(TerminalState {
                pid,
                ..TerminalState::default()
            }),
            outcome,
            output: Mutex::new(Some(rx)),
        });

        info!(pid = ?pid, program = %program, cwd = %handle.cwd.display(), "Started process");
        tokio::spawn(Arc::clone(&handle).finalize(child, drains, tx));

        Ok(handle)
    }

    /// Reap the child once both streams are drained and push the final `Eof`.
    async fn finalize(
        self: Arc<Self>,
        mut child: Child,
        drains: Vec<JoinHandle<u64>>,
        tx: mpsc::UnboundedSender<OutputChunk>,
    ) {
        for drain in drains {
            if let Err(e) = drain.await {
                warn!(error = %e, "Stream drain task failed");
            }
        }

        // Not under the state lock: terminate() must stay callable meanwhile
        let exit = child.wait().await;

        let mut state = lock(&self.state);
        state.pid = None;
        if state.outcome.is_none() {
            let outcome = match &exit {
                Ok(status) => ProcessOutcome::from_exit_success(status.success()),
                Err(e) => {
                    warn!(error = %e, "Failed to reap process");
                    ProcessOutcome::Error
                }
            };
            self.record(&mut state, outcome);
            info!(outcome = ?outcome, status = ?exit.ok(), "Process exited");
        } else {
            debug!(outcome = ?state.outcome, "Process reaped after cancellation");
        }

        // Nothing is sent after this; the drains already dropped their senders
        let _ = tx.send(OutputChunk::Eof);
    }

    fn record(&self, state: &mut TerminalState, outcome: ProcessOutcome) {
        state.outcome = Some(outcome);
        state.finished = Some(Instant::now());
        self.outcome.send_replace(Some(outcome));
    }

    /// Terminate the whole process tree.
    ///
    /// Returns `false` without doing anything when the process already has a
    /// terminal result. Otherwise signals the tree, records `Cancelled` and
    /// returns `true`. Safe to call any number of times from any thread.
    pub fn terminate(&self) -> bool {
        let mut state = lock(&self.state);
        if state.outcome.is_some() {
            debug!(outcome = ?state.outcome, "Terminate ignored, process already finished");
            return false;
        }

        let pid = state.pid.take();
        self.record(&mut state, ProcessOutcome::Cancelled);
        drop(state);

        // Killers may block (taskkill), so the state lock is released first
        if let Some(pid) = pid {
            if let Err(e) = self.killer.kill_tree(pid) {
                warn!(pid = %pid, error = %e, "Failed to terminate process tree");
            }
        }
        info!(pid = ?pid, "Process cancelled");
        true
    }

    /// Wait for the terminal result.
    pub async fn wait(&self) -> ProcessOutcome {
        let mut rx = self.outcome.subscribe();
        let outcome = rx.wait_for(Option::is_some).await.ok().and_then(|v| *v);
        outcome.unwrap_or(ProcessOutcome::Error)
    }

    /// Take the merged output channel. Only the first caller gets it.
    pub fn take_output(&self) -> Option<mpsc::UnboundedReceiver<OutputChunk>> {
        lock(&self.output).take()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Environment snapshot the process was started with.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Wall-clock start time.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Finish minus start, or time since start while still running.
    pub fn elapsed(&self) -> Duration {
        let finished = lock(&self.state).finished;
        finished.map_or_else(|| self.started.elapsed(), |f| f.duration_since(self.started))
    }

    pub fn outcome(&self) -> Option<ProcessOutcome> {
        lock(&self.state).outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    /// Pid of the child while it is alive and unsignalled.
    pub fn pid(&self) -> Option<u32> {
        lock(&self.state).pid
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("ProcessHandle")
            .field("args", &self.args)
            .field("cwd", &self.cwd)
            .field("pid", &state.pid)
            .field("outcome", &state.outcome)
            .finish_non_exhaustive()
    }
}
