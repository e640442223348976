//! Dedicated monitor thread lifecycle
//!
//! Each backend owns one [`WorkerSlot`], which holds at most one live
//! [`Worker`]. Spawning blocks the caller until the thread reports ready
//! (or fails), and joining is bounded by a timeout. Thread exit is observed
//! through a channel whose sender lives on the worker's stack, so it
//! disconnects on return and on unwind alike.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::ports::StopOutcome;
use crate::domain::environment::DetectionStrategy;
use crate::domain::error::MonitorError;

const STRATEGY_NONE: u8 = 0;
const STRATEGY_PUSH: u8 = 1;
const STRATEGY_POLL: u8 = 2;

/// State shared between a backend and its worker thread
#[derive(Debug, Default)]
pub struct MonitorState {
    running: AtomicBool,
    strategy: AtomicU8,
}

impl MonitorState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn strategy(&self) -> Option<DetectionStrategy> {
        if !self.is_running() {
            return None;
        }
        match self.strategy.load(Ordering::SeqCst) {
            STRATEGY_PUSH => Some(DetectionStrategy::NativePush),
            STRATEGY_POLL => Some(DetectionStrategy::Polling),
            _ => None,
        }
    }

    pub fn set_strategy(&self, strategy: DetectionStrategy) {
        let raw = match strategy {
            DetectionStrategy::NativePush => STRATEGY_PUSH,
            DetectionStrategy::Polling => STRATEGY_POLL,
        };
        self.strategy.store(raw, Ordering::SeqCst);
    }

    fn begin(&self) {
        self.strategy.store(STRATEGY_NONE, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.strategy.store(STRATEGY_NONE, Ordering::SeqCst);
    }
}

/// One-shot signal from the worker to the thread blocked in `start()`
pub struct ReadyGate {
    tx: SyncSender<Result<(), MonitorError>>,
    state: Arc<MonitorState>,
}

impl ReadyGate {
    /// Native resources are acquired and the worker is listening.
    /// Returns the run's state for later strategy changes.
    pub fn ready(self, strategy: DetectionStrategy) -> Arc<MonitorState> {
        self.state.set_strategy(strategy);
        let _ = self.tx.send(Ok(()));
        self.state
    }

    /// Setup failed; the worker should return right after this
    pub fn fail(self, error: MonitorError) {
        let _ = self.tx.send(Err(error));
    }
}

/// Sender half of a stop request
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    /// Request the worker to stop. Consumes the handle; dropping the
    /// sender is what wakes the worker.
    pub fn signal(self) {
        drop(self.tx);
    }
}

/// Receiver half of a stop request, owned by the worker
pub struct StopToken {
    rx: Receiver<()>,
}

impl StopToken {
    /// Sleep for up to `interval`. Returns true if a stop was requested.
    pub fn wait(&self, interval: Duration) -> bool {
        match self.rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }

    /// Non-blocking check for a stop request
    pub fn is_stopped(&self) -> bool {
        !matches!(self.rx.try_recv(), Err(TryRecvError::Empty))
    }
}

pub fn stop_channel() -> (StopHandle, StopToken) {
    let (tx, rx) = mpsc::channel();
    (StopHandle { tx }, StopToken { rx })
}

/// Handle to a running monitor thread
pub struct Worker {
    name: String,
    handle: JoinHandle<()>,
    ready: Receiver<Result<(), MonitorError>>,
    exited: Receiver<()>,
}

/// Clears the running flag and disconnects the exit channel when the
/// worker body returns or unwinds
struct ExitGuard {
    state: Arc<MonitorState>,
    _exited: Sender<()>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.state.finish();
    }
}

impl Worker {
    /// Spawn `body` on a new named thread.
    ///
    /// The body receives a [`ReadyGate`] and must call `ready` or `fail`
    /// exactly once; returning without either counts as a failed start.
    pub fn spawn<F>(name: &str, state: Arc<MonitorState>, body: F) -> Result<Self, MonitorError>
    where
        F: FnOnce(ReadyGate) + Send + 'static,
    {
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (exit_tx, exit_rx) = mpsc::channel();

        state.begin();
        let guard = ExitGuard {
            state: Arc::clone(&state),
            _exited: exit_tx,
        };
        let gate = ReadyGate {
            tx: ready_tx,
            state: Arc::clone(&state),
        };

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _guard = guard;
                body(gate);
            })
            .map_err(|e| {
                state.finish();
                MonitorError::ThreadSpawn(e.to_string())
            })?;

        debug!(thread = name, "monitor thread spawned");

        Ok(Self {
            name: name.to_string(),
            handle,
            ready: ready_rx,
            exited: exit_rx,
        })
    }

    /// Block until the worker reports ready, fails, or the timeout elapses
    pub fn wait_ready(&self, timeout: Duration) -> Result<(), MonitorError> {
        match self.ready.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                Err(MonitorError::StartTimeout(timeout.as_millis() as u64))
            }
            Err(RecvTimeoutError::Disconnected) => Err(MonitorError::WorkerExited),
        }
    }

    /// True while the thread body has not returned
    pub fn is_alive(&self) -> bool {
        matches!(self.exited.try_recv(), Err(TryRecvError::Empty))
    }

    /// Wait up to `timeout` for the thread body to return.
    /// Returns false if it is still running.
    pub fn wait_exit(&self, timeout: Duration) -> bool {
        !matches!(
            self.exited.recv_timeout(timeout),
            Err(RecvTimeoutError::Timeout)
        )
    }

    /// Wait up to `timeout` for the thread to exit, then join it.
    ///
    /// On timeout the thread is detached and the outcome is reported as
    /// [`StopOutcome::TimedOut`].
    pub fn join(self, timeout: Duration) -> StopOutcome {
        match self.exited.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    thread = %self.name,
                    timeout_ms = timeout.as_millis() as u64,
                    "monitor thread did not exit in time; detaching it"
                );
                StopOutcome::TimedOut
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    warn!(thread = %self.name, "monitor thread panicked");
                }
                debug!(thread = %self.name, "monitor thread joined");
                StopOutcome::Stopped
            }
        }
    }
}

/// A backend's worker across start/stop cycles.
///
/// Every run gets a fresh [`MonitorState`], so a thread detached after a
/// stop timeout can only clear its own flags. While such a thread is
/// still alive, `start` refuses to spawn another one.
pub struct WorkerSlot {
    name: String,
    state: Arc<MonitorState>,
    current: Option<(Worker, StopHandle)>,
    detached: Option<Worker>,
}

impl WorkerSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: MonitorState::new(),
            current: None,
            detached: None,
        }
    }

    /// State of the current run, or of the last one if stopped
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// True if a run is attached. A worker whose thread already returned
    /// on its own is joined and forgotten first.
    pub fn is_started(&mut self) -> bool {
        if self.current.as_ref().is_some_and(|(worker, _)| !worker.is_alive()) {
            if let Some((worker, _stop)) = self.current.take() {
                worker.join(Duration::ZERO);
            }
        }
        self.current.is_some()
    }

    /// Spawn `body` as a new run and block until it reports ready.
    ///
    /// No-op while a run is attached. `wake` unblocks a body stuck in a
    /// native wait and is called after the stop signal if setup fails.
    pub fn start<F, W>(
        &mut self,
        start_timeout: Duration,
        stop_timeout: Duration,
        wake: W,
        body: F,
    ) -> Result<(), MonitorError>
    where
        F: FnOnce(ReadyGate, StopToken) + Send + 'static,
        W: FnOnce(),
    {
        if self.is_started() {
            return Ok(());
        }
        self.reap_detached(stop_timeout)?;

        let state = MonitorState::new();
        let (stop, token) = stop_channel();
        let worker = Worker::spawn(&self.name, Arc::clone(&state), move |gate| {
            body(gate, token)
        })?;
        self.state = state;

        if let Err(e) = worker.wait_ready(start_timeout) {
            stop.signal();
            wake();
            self.settle(worker, stop_timeout);
            return Err(e);
        }

        self.current = Some((worker, stop));
        Ok(())
    }

    /// Signal the current run, call `wake`, and wait for the thread
    pub fn stop<W: FnOnce()>(&mut self, stop_timeout: Duration, wake: W) -> StopOutcome {
        let Some((worker, stop)) = self.current.take() else {
            return StopOutcome::AlreadyStopped;
        };
        stop.signal();
        wake();
        self.settle(worker, stop_timeout)
    }

    fn settle(&mut self, worker: Worker, timeout: Duration) -> StopOutcome {
        if worker.wait_exit(timeout) {
            return worker.join(Duration::ZERO);
        }

        warn!(
            thread = %self.name,
            timeout_ms = timeout.as_millis() as u64,
            "monitor thread did not exit in time; detaching it"
        );
        // The detached run keeps its own state; report this monitor stopped
        self.state = MonitorState::new();
        self.detached = Some(worker);
        StopOutcome::TimedOut
    }

    fn reap_detached(&mut self, timeout: Duration) -> Result<(), MonitorError> {
        let Some(worker) = self.detached.take() else {
            return Ok(());
        };
        if !worker.wait_exit(timeout) {
            self.detached = Some(worker);
            return Err(MonitorError::StillStopping);
        }
        debug!(thread = %self.name, "detached monitor thread finally exited");
        worker.join(Duration::ZERO);
        Ok(())
    }
}
