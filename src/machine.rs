//! This module defines the `TuringMachine` struct, the execution session for a single-tape
//! machine. It owns the tape, the configuration and the trace, and reads the machine
//! definition through a [`SharedDefinition`] on every step.

use crate::definition::SharedDefinition;
use crate::engine;
use crate::table::TransitionTable;
use crate::tape::{Tape, TapeCell};
use crate::trace::Trace;
use crate::types::{
    Configuration, ExecutionStep, HaltReason, MachineError, RunStatus, Symbol, Transition,
    DEFAULT_TAPE_WINDOW, MAX_EXECUTION_STEPS,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Represents the outcome of a `step` or `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and can continue.
    Continue,
    /// The machine has halted, either now or on an earlier step.
    Halt(HaltReason),
}

/// Owned view of a session for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub status: RunStatus,
    pub configuration: Option<Configuration>,
    /// Tape cells around the written region and the head.
    pub cells: Vec<TapeCell>,
    pub trace: Vec<ExecutionStep>,
}

/// Tape and cursor, created together by initialize and discarded together by reset.
#[derive(Debug, Clone)]
struct Session {
    tape: Tape,
    configuration: Configuration,
}

/// Represents a single-tape Turing Machine session.
///
/// The session starts `Idle`. [`TuringMachine::initialize`] writes the input onto a
/// fresh tape and makes it `Ready`; each step then either continues or halts it.
/// Once halted, further steps are no-ops until the next initialize or reset.
#[derive(Debug)]
pub struct TuringMachine {
    definition: SharedDefinition,
    session: Option<Session>,
    trace: Trace,
    status: RunStatus,
}

impl TuringMachine {
    /// Creates a new, idle `TuringMachine` bound to a live definition.
    ///
    /// # Arguments
    ///
    /// * `definition` - The definition the editor keeps mutating; the machine re-reads it on every step.
    pub fn new(definition: impl Into<SharedDefinition>) -> Self {
        Self {
            definition: definition.into(),
            session: None,
            trace: Trace::new(),
            status: RunStatus::Idle,
        }
    }

    /// Creates a fresh tape from `input` and places the head at position 0 in the start state.
    ///
    /// The start state is the first state marked `start`, or the first declared state.
    /// The trace is cleared. Symbols are not checked against any alphabet, and the
    /// tape stores no blank: unwritten cells read as whatever blank the definition
    /// holds at the time of the read.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the machine is now `Ready`.
    /// * `Err(MachineError::Running)` while the run scheduler drives this machine.
    /// * `Err(MachineError::InvalidDefinition)` if the definition has no states.
    pub fn initialize<I, S>(&mut self, input: I) -> Result<(), MachineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        if self.status.is_running() {
            warn!("initialize refused while running");
            return Err(MachineError::Running);
        }

        let definition = self.definition.read();
        definition.check()?;
        let start = definition
            .start_state()
            .map(|s| s.id.clone())
            .ok_or_else(|| MachineError::InvalidDefinition("machine has no states".into()))?;
        let tape = Tape::from_input(input);
        drop(definition);

        info!(start = %start, cells = tape.len(), "machine initialized");

        self.session = Some(Session {
            tape,
            configuration: Configuration {
                current_state: start,
                head_position: 0,
            },
        });
        self.trace.clear();
        self.status = RunStatus::Ready;
        Ok(())
    }

    /// Convenience for [`TuringMachine::initialize`] treating every `char` as one symbol.
    pub fn initialize_str(&mut self, input: &str) -> Result<(), MachineError> {
        self.initialize(input.chars().map(String::from))
    }

    /// Executes a single step of the machine's computation.
    ///
    /// Manual stepping is refused while the run scheduler is running so the same
    /// configuration is never advanced twice.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if the machine performed a step and is not halted.
    /// * `Ok(Step::Halt(_))` if the machine halted on this step or had already halted.
    /// * `Err(MachineError::Running)` while the scheduler is running.
    /// * `Err(MachineError::NotInitialized)` before `initialize`.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        if self.status.is_running() {
            warn!("manual step refused while running");
            return Err(MachineError::Running);
        }

        self.advance()?;
        Ok(self.outcome())
    }

    /// Steps until the machine halts or `MAX_EXECUTION_STEPS` steps were taken.
    pub fn run(&mut self) -> Result<Step, MachineError> {
        for _ in 0..MAX_EXECUTION_STEPS {
            if let Step::Halt(reason) = self.step()? {
                return Ok(Step::Halt(reason));
            }
        }

        Ok(self.outcome())
    }

    /// Applies one engine step and records it. Shared by manual stepping and the
    /// run scheduler, which is why it does not look at `Running`.
    ///
    /// Returns the new trace entry, or `None` if the machine had already halted.
    pub(crate) fn advance(&mut self) -> Result<Option<&ExecutionStep>, MachineError> {
        if self.status.is_halted() {
            return Ok(None);
        }
        let session = self.session.as_mut().ok_or(MachineError::NotInitialized)?;

        let result = {
            let definition = self.definition.read();
            engine::step(&definition, &mut session.tape, &session.configuration)
        };

        session.configuration = result.configuration;
        if let Some(reason) = result.halt {
            info!(
                %reason,
                state = %session.configuration.current_state,
                head = session.configuration.head_position,
                steps = self.trace.len() + 1,
                "machine halted"
            );
            self.status = RunStatus::Halted(reason);
        }

        let entry = self.trace.record(result.record);
        debug!(
            step = entry.step_number,
            state = %entry.state_before,
            head = entry.head_position_before,
            symbol = %entry.symbol_read,
            outcome = %entry.outcome,
            "step recorded"
        );
        Ok(Some(entry))
    }

    /// Discards tape, configuration and trace, returning to `Idle`.
    pub fn reset(&mut self) {
        self.session = None;
        self.trace.clear();
        self.status = RunStatus::Idle;
        info!("machine reset");
    }

    pub(crate) fn set_status(&mut self, status: RunStatus) {
        self.status = status;
    }

    fn outcome(&self) -> Step {
        match self.status {
            RunStatus::Halted(reason) => Step::Halt(reason),
            _ => Step::Continue,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status.is_halted()
    }

    pub fn definition(&self) -> &SharedDefinition {
        &self.definition
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.session.as_ref().map(|s| &s.configuration)
    }

    /// Returns the current state, if initialized.
    pub fn state(&self) -> Option<&str> {
        self.configuration().map(|c| c.current_state.as_str())
    }

    pub fn head(&self) -> Option<i64> {
        self.configuration().map(|c| c.head_position)
    }

    pub fn tape(&self) -> Option<&Tape> {
        self.session.as_ref().map(|s| &s.tape)
    }

    /// Returns the blank symbol the definition currently declares.
    pub fn blank(&self) -> Symbol {
        self.definition.read().blank.clone()
    }

    /// Returns the symbol under the head, if initialized.
    pub fn symbol(&self) -> Option<Symbol> {
        let session = self.session.as_ref()?;
        let definition = self.definition.read();
        Some(
            session
                .tape
                .read(session.configuration.head_position, &definition.blank)
                .to_string(),
        )
    }

    /// Finds the transition the next step would apply under the current definition.
    pub fn transition(&self) -> Option<Transition> {
        let session = self.session.as_ref()?;
        let definition = self.definition.read();
        TransitionTable::new(&definition)
            .lookup(
                &session.configuration.current_state,
                session
                    .tape
                    .read(session.configuration.head_position, &definition.blank),
            )
            .cloned()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Returns the total number of steps recorded since the last initialize.
    pub fn step_count(&self) -> usize {
        self.trace.len()
    }

    /// Copies everything a presentation layer renders.
    pub fn snapshot(&self) -> MachineSnapshot {
        let blank = self.blank();
        MachineSnapshot {
            status: self.status,
            configuration: self.configuration().cloned(),
            cells: self
                .session
                .as_ref()
                .map(|s| {
                    s.tape
                        .window(s.configuration.head_position, DEFAULT_TAPE_WINDOW, &blank)
                })
                .unwrap_or_default(),
            trace: self.trace.as_slice().to_vec(),
        }
    }
}
