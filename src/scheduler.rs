//! Timed, cancellable run loop.
//!
//! [`RunScheduler::start`] spawns a task that sleeps for the configured delay and then
//! applies one step, repeating until the machine halts or the run is cancelled.
//! Every step is applied while holding the machine lock, so observers only ever see
//! whole steps. Cancellation is cooperative: it suppresses the next tick but never
//! interrupts a step that already holds the lock.

use crate::config::RunConfig;
use crate::machine::{Step, TuringMachine};
use crate::types::{ExecutionStep, HaltReason, MachineError, RunStatus, Symbol};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A machine shared between the scheduler's task and its readers.
pub type SharedMachine = Arc<Mutex<TuringMachine>>;

/// Locks a shared machine. Steps never panic halfway, so a poisoned lock still
/// guards a consistent machine.
pub fn lock(machine: &SharedMachine) -> MutexGuard<'_, TuringMachine> {
    machine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Notifications emitted in the order the machine changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Started,
    Step(ExecutionStep),
    Halted(HaltReason),
    Cancelled,
}

/// What a call to [`RunScheduler::start`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Started,
    /// The scheduler was already running, so the call cancelled it.
    Cancelled,
    /// The machine had already halted; nothing was started.
    Halted(HaltReason),
}

#[derive(Debug, Clone, Default)]
struct Subscribers {
    senders: Arc<Mutex<Vec<mpsc::UnboundedSender<RunEvent>>>>,
}

impl Subscribers {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<RunEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Sends to every live receiver, forgetting closed ones.
    fn emit(&self, event: RunEvent) {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[derive(Debug)]
struct ActiveRun {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives a [`TuringMachine`] with a fixed delay between steps.
///
/// `start` toggles: calling it while running cancels the run. Manual steps go
/// through [`RunScheduler::step`], which the machine refuses while running.
#[derive(Debug)]
pub struct RunScheduler {
    machine: SharedMachine,
    runtime: Handle,
    run: Option<ActiveRun>,
    events: Subscribers,
}

impl RunScheduler {
    /// Creates a scheduler for `machine` on the current Tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::NoRuntime)` when called outside a Tokio runtime.
    pub fn new(machine: TuringMachine) -> Result<Self, MachineError> {
        Self::with_shared(Arc::new(Mutex::new(machine)))
    }

    pub fn with_shared(machine: SharedMachine) -> Result<Self, MachineError> {
        let runtime = Handle::try_current().map_err(|_| MachineError::NoRuntime)?;
        Ok(Self {
            machine,
            runtime,
            run: None,
            events: Subscribers::default(),
        })
    }

    /// Handle to the machine for rendering between steps.
    pub fn machine(&self) -> SharedMachine {
        Arc::clone(&self.machine)
    }

    /// Receives every event emitted from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<RunEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> RunStatus {
        lock(&self.machine).status()
    }

    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// Initializes the machine with `input`. Refused while running.
    pub fn initialize<I, S>(&self, input: I) -> Result<(), MachineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        lock(&self.machine).initialize(input)
    }

    pub fn initialize_str(&self, input: &str) -> Result<(), MachineError> {
        lock(&self.machine).initialize_str(input)
    }

    /// Single manual step. Refused with `MachineError::Running` during a run.
    pub fn step(&self) -> Result<Step, MachineError> {
        let mut machine = lock(&self.machine);
        let before = machine.step_count();
        let step = machine.step()?;
        if machine.step_count() > before {
            if let Some(record) = machine.trace().last() {
                self.events.emit(RunEvent::Step(record.clone()));
            }
            if let Step::Halt(reason) = step {
                self.events.emit(RunEvent::Halted(reason));
            }
        }
        Ok(step)
    }

    /// Starts the timed run loop, or cancels it if it is already running.
    ///
    /// The first step happens one delay after this call.
    ///
    /// # Returns
    ///
    /// * `Ok(Toggle::Started)` if a run was started.
    /// * `Ok(Toggle::Cancelled)` if a run was in progress and has been cancelled.
    /// * `Ok(Toggle::Halted(_))` if the machine had already halted.
    /// * `Err(MachineError::NotInitialized)` before `initialize`.
    pub fn start(&mut self, config: &RunConfig) -> Result<Toggle, MachineError> {
        let mut machine = lock(&self.machine);
        match machine.status() {
            RunStatus::Running => {
                drop(machine);
                self.cancel();
                return Ok(Toggle::Cancelled);
            }
            RunStatus::Halted(reason) => return Ok(Toggle::Halted(reason)),
            RunStatus::Idle => {
                warn!("run refused before initialize");
                return Err(MachineError::NotInitialized);
            }
            RunStatus::Ready => {}
        }

        let delay = config.delay();
        let token = CancellationToken::new();
        machine.set_status(RunStatus::Running);
        self.events.emit(RunEvent::Started);
        info!(delay_ms = delay.as_millis() as u64, "run started");

        let handle = self.runtime.spawn(run_loop(
            Arc::clone(&self.machine),
            token.clone(),
            delay,
            self.events.clone(),
        ));
        drop(machine);

        if let Some(previous) = self.run.replace(ActiveRun { token, handle }) {
            previous.token.cancel();
        }
        Ok(Toggle::Started)
    }

    /// Requests that the run stop before its next tick.
    ///
    /// A step already in progress completes first. The machine keeps the tape,
    /// configuration and trace of the last completed step and becomes `Ready`.
    /// Returns `false` if nothing was running.
    pub fn cancel(&mut self) -> bool {
        let Some(run) = &self.run else {
            return false;
        };

        let mut machine = lock(&self.machine);
        run.token.cancel();
        if !machine.status().is_running() {
            return false;
        }

        machine.set_status(RunStatus::Ready);
        self.events.emit(RunEvent::Cancelled);
        info!(steps = machine.step_count(), "run cancelled");
        true
    }

    /// Cancels any run and discards tape, configuration and trace.
    ///
    /// Subscribers see `RunEvent::Cancelled` if a run was interrupted.
    pub fn reset(&mut self) {
        let mut machine = lock(&self.machine);
        if let Some(run) = &self.run {
            run.token.cancel();
        }
        let interrupted = machine.status().is_running();
        machine.reset();
        if interrupted {
            self.events.emit(RunEvent::Cancelled);
            info!("run cancelled by reset");
        }
    }

    /// Waits for the current run task to finish and returns the final status.
    pub async fn wait(&mut self) -> RunStatus {
        if let Some(run) = self.run.take() {
            if let Err(e) = run.handle.await {
                warn!(error = %e, "run task ended abnormally");
            }
        }
        self.status()
    }
}

/// Dropping the scheduler cancels its run, so a machine shared through
/// [`RunScheduler::with_shared`] is left `Ready` rather than stuck `Running`.
impl Drop for RunScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_loop(
    machine: SharedMachine,
    token: CancellationToken,
    delay: Duration,
    events: Subscribers,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        if !tick(&machine, &token, &events) {
            return;
        }
    }
}

/// Applies one scheduled step. Returns whether another tick should be scheduled.
fn tick(machine: &SharedMachine, token: &CancellationToken, events: &Subscribers) -> bool {
    let mut guard = lock(machine);
    if token.is_cancelled() || !guard.status().is_running() {
        return false;
    }

    match guard.advance().map(|record| record.cloned()) {
        Ok(Some(record)) => events.emit(RunEvent::Step(record)),
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "run stopped");
            guard.set_status(RunStatus::Ready);
            return false;
        }
    }

    match guard.status() {
        RunStatus::Halted(reason) => {
            events.emit(RunEvent::Halted(reason));
            false
        }
        _ => true,
    }
}
