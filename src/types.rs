//! This module defines the core data structures and types used throughout the Turing Machine
//! engine: states, transitions, machine definitions, the execution cursor, trace records,
//! run status and the error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A tape symbol. Symbols are opaque string tokens, compared by value.
pub type Symbol = String;
/// Identifier of a state inside a [`MachineDefinition`].
pub type StateId = String;

/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: &str = "B";
/// The maximum number of steps [`crate::TuringMachine::run`] executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;
/// Number of blank cells shown on either side of the written tape region.
pub const DEFAULT_TAPE_WINDOW: i64 = 10;

/// The role a state plays when it becomes the destination of a transition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    /// Candidate for the effective start state.
    Start,
    /// Entering this state halts with [`HaltReason::Accepted`].
    Accept,
    /// Entering this state halts with [`HaltReason::Rejected`].
    Reject,
    #[default]
    Regular,
}

impl StateKind {
    /// Kinds that at most one state should carry at a time.
    pub fn is_exclusive(self) -> bool {
        !matches!(self, StateKind::Regular)
    }
}

/// A single state of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "type")]
    pub kind: StateKind,
}

impl State {
    /// Creates a state whose label is its id.
    pub fn new(id: impl Into<StateId>, kind: StateKind) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind,
        }
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    #[serde(alias = "L")]
    Left,
    /// Move the head one position to the right.
    #[serde(alias = "R")]
    Right,
    /// Keep the head in the same position.
    #[serde(alias = "S")]
    Stay,
}

impl Direction {
    /// Head displacement produced by this direction.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Stay => "S",
        };
        f.write_str(short)
    }
}

/// A single transition rule: `δ(from, read) = (to, write, direction)`.
///
/// Several transitions may share the same `(from, read)` pair; only the one
/// declared first is ever applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    pub from: StateId,
    pub read: Symbol,
    pub to: StateId,
    pub write: Symbol,
    #[serde(rename = "move", alias = "direction")]
    pub direction: Direction,
}

/// A complete machine definition as supplied by the editor.
///
/// The engine only ever reads it. States and transitions keep their declaration
/// order, which decides both the effective start state and first-match lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input_alphabet: Vec<Symbol>,
    #[serde(default)]
    pub tape_alphabet: Vec<Symbol>,
    #[serde(default = "default_blank")]
    pub blank: Symbol,
    pub states: Vec<State>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

fn default_blank() -> Symbol {
    DEFAULT_BLANK_SYMBOL.to_string()
}

impl Default for MachineDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            input_alphabet: vec!["0".into(), "1".into()],
            tape_alphabet: vec!["0".into(), "1".into(), default_blank()],
            blank: default_blank(),
            states: vec![
                State::new("q0", StateKind::Start),
                State::new("q_accept1", StateKind::Accept),
                State::new("q_reject1", StateKind::Reject),
            ],
            transitions: Vec::new(),
        }
    }
}

impl MachineDefinition {
    /// Returns the effective start state: the first state marked `start`, or the
    /// first declared state when none is marked.
    pub fn start_state(&self) -> Option<&State> {
        self.states
            .iter()
            .find(|s| s.kind == StateKind::Start)
            .or_else(|| self.states.first())
    }

    /// Finds the first state declared with the given id.
    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Whether any state with this id is currently flagged as accepting.
    pub fn is_accepting(&self, id: &str) -> bool {
        self.states
            .iter()
            .any(|s| s.id == id && s.kind == StateKind::Accept)
    }

    /// Whether any state with this id is currently flagged as rejecting.
    pub fn is_rejecting(&self, id: &str) -> bool {
        self.states
            .iter()
            .any(|s| s.id == id && s.kind == StateKind::Reject)
    }

    /// Minimal structural check: a machine needs at least one state to start in.
    pub fn check(&self) -> Result<(), MachineError> {
        if self.states.is_empty() {
            return Err(MachineError::InvalidDefinition(
                "machine has no states".to_string(),
            ));
        }
        Ok(())
    }
}

/// The mutable execution cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub current_state: StateId,
    pub head_position: i64,
}

/// Why a machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HaltReason {
    Accepted,
    Rejected,
    /// No transition matched the current state and symbol.
    Undefined,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HaltReason::Accepted => "accepted",
            HaltReason::Rejected => "rejected",
            HaltReason::Undefined => "undefined",
        })
    }
}

/// Result recorded for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Continued,
    Accepted,
    Rejected,
    Undefined,
}

impl Outcome {
    /// The halt reason this outcome implies, if any.
    pub fn halt_reason(self) -> Option<HaltReason> {
        match self {
            Outcome::Continued => None,
            Outcome::Accepted => Some(HaltReason::Accepted),
            Outcome::Rejected => Some(HaltReason::Rejected),
            Outcome::Undefined => Some(HaltReason::Undefined),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.halt_reason() {
            Some(reason) => write!(f, "{reason}"),
            None => f.write_str("continued"),
        }
    }
}

/// Lifecycle status of a machine session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Nothing initialized yet, or reset.
    #[default]
    Idle,
    /// Initialized and paused.
    Ready,
    /// Driven by the run scheduler.
    Running,
    Halted(HaltReason),
}

impl RunStatus {
    pub fn is_running(self) -> bool {
        matches!(self, RunStatus::Running)
    }

    pub fn is_halted(self) -> bool {
        matches!(self, RunStatus::Halted(_))
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Idle => f.write_str("idle"),
            RunStatus::Ready => f.write_str("ready"),
            RunStatus::Running => f.write_str("running"),
            RunStatus::Halted(reason) => write!(f, "halted ({reason})"),
        }
    }
}

/// What a single engine step observed and did, before it is numbered by the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub state_before: StateId,
    pub head_position_before: i64,
    pub symbol_read: Symbol,
    pub transition: Option<Transition>,
    pub outcome: Outcome,
}

impl StepRecord {
    pub(crate) fn numbered(self, step_number: usize) -> ExecutionStep {
        ExecutionStep {
            step_number,
            state_before: self.state_before,
            head_position_before: self.head_position_before,
            symbol_read: self.symbol_read,
            transition: self.transition,
            outcome: self.outcome,
        }
    }
}

/// An immutable entry of the execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// 1-based, contiguous within a trace.
    pub step_number: usize,
    pub state_before: StateId,
    pub head_position_before: i64,
    pub symbol_read: Symbol,
    pub transition: Option<Transition>,
    pub outcome: Outcome,
}

impl fmt::Display for ExecutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} @{} read '{}'",
            self.step_number, self.state_before, self.head_position_before, self.symbol_read
        )?;
        match &self.transition {
            Some(t) => write!(f, " -> {} write '{}' {}", t.to, t.write, t.direction)?,
            None => f.write_str(" (no transition)")?,
        }
        write!(f, " [{}]", self.outcome)
    }
}

/// Errors returned by the engine's command surface and the definition loader.
///
/// Halting is never an error: undefined transitions and accept/reject states are
/// reported through [`HaltReason`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// A command that must not overlap with the run loop was issued while it runs.
    #[error("Machine is running; cancel the run first")]
    Running,
    /// A step or run was requested before the tape was initialized.
    #[error("Machine is not initialized")]
    NotInitialized,
    /// The scheduler was used outside of a Tokio runtime.
    #[error("No async runtime available to drive the run loop")]
    NoRuntime,
    #[error("Unknown state: {0}")]
    UnknownState(String),
    #[error("Unknown transition: {0}")]
    UnknownTransition(String),
    /// The blank symbol must stay in the tape alphabet.
    #[error("Cannot remove blank symbol {0:?} from the tape alphabet")]
    BlankSymbolRemoval(Symbol),
    #[error("Invalid machine definition: {0}")]
    InvalidDefinition(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates a definition that could not be decoded.
    #[error("Format error: {0}")]
    FormatError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(left_json, "\"Left\"");

        let short: Direction = serde_json::from_str("\"R\"").unwrap();
        assert_eq!(short, Direction::Right);
    }

    #[test]
    fn test_direction_offsets() {
        assert_eq!(Direction::Left.offset(), -1);
        assert_eq!(Direction::Stay.offset(), 0);
        assert_eq!(Direction::Right.offset(), 1);
    }

    #[test]
    fn test_start_state_prefers_first_marked_start() {
        let mut definition = MachineDefinition::default();
        definition.states = vec![
            State::new("a", StateKind::Regular),
            State::new("b", StateKind::Start),
            State::new("c", StateKind::Start),
        ];
        assert_eq!(definition.start_state().unwrap().id, "b");
    }

    #[test]
    fn test_start_state_falls_back_to_first_declared() {
        let mut definition = MachineDefinition::default();
        definition.states = vec![
            State::new("x", StateKind::Accept),
            State::new("y", StateKind::Regular),
        ];
        assert_eq!(definition.start_state().unwrap().id, "x");

        definition.states.clear();
        assert!(definition.start_state().is_none());
        assert!(definition.check().is_err());
    }

    #[test]
    fn test_duplicate_state_ids_are_both_accepting_and_rejecting() {
        let mut definition = MachineDefinition::default();
        definition.states = vec![
            State::new("q", StateKind::Reject),
            State::new("q", StateKind::Accept),
        ];
        assert!(definition.is_accepting("q"));
        assert!(definition.is_rejecting("q"));
    }

    #[test]
    fn test_definition_deserializes_with_defaults() {
        let json = r#"{
            "states": [{ "id": "q0", "type": "start" }],
            "transitions": [
                { "id": "t1", "from": "q0", "read": "1", "to": "q0", "write": "0", "move": "R" }
            ]
        }"#;
        let definition: MachineDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(definition.blank, DEFAULT_BLANK_SYMBOL);
        assert_eq!(definition.states[0].kind, StateKind::Start);
        assert_eq!(definition.transitions[0].direction, Direction::Right);
    }

    #[test]
    fn test_execution_step_display() {
        let step = ExecutionStep {
            step_number: 3,
            state_before: "q1".to_string(),
            head_position_before: 2,
            symbol_read: "1".to_string(),
            transition: Some(Transition {
                id: "t".to_string(),
                from: "q1".to_string(),
                read: "1".to_string(),
                to: "q2".to_string(),
                write: "0".to_string(),
                direction: Direction::Right,
            }),
            outcome: Outcome::Continued,
        };
        assert_eq!(step.to_string(), "#3 q1 @2 read '1' -> q2 write '0' R [continued]");

        let halted = ExecutionStep {
            transition: None,
            outcome: Outcome::Undefined,
            ..step
        };
        assert_eq!(halted.to_string(), "#3 q1 @2 read '1' (no transition) [undefined]");
    }

    #[test]
    fn test_error_display() {
        let error = MachineError::UnknownState("q9".to_string());
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Unknown state"));
        assert!(error_msg.contains("q9"));
    }
}
