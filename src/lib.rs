//! This crate provides the execution engine for a single-tape Turing Machine.
//! It includes the sparse tape, first-match transition lookup, the single-step engine,
//! the execution trace, and a cancellable timed run loop, plus helpers for editing,
//! loading and sampling machine definitions.

pub mod config;
pub mod definition;
pub mod engine;
pub mod loader;
pub mod machine;
pub mod samples;
pub mod scheduler;
pub mod table;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the run parameters.
pub use config::RunConfig;
/// Re-exports the live definition handle.
pub use definition::SharedDefinition;
/// Re-exports `DefinitionLoader` and `DefinitionCatalog` from the loader module.
pub use loader::{DefinitionCatalog, DefinitionLoader};
/// Re-exports the execution session from the machine module.
pub use machine::{MachineSnapshot, Step, TuringMachine};
/// Re-exports `SampleInfo`, `SampleManager`, and `SAMPLES` from the samples module.
pub use samples::{SampleInfo, SampleManager, SAMPLES};
/// Re-exports the run loop from the scheduler module.
pub use scheduler::{RunEvent, RunScheduler, SharedMachine, Toggle};
pub use table::TransitionTable;
pub use tape::{Tape, TapeCell};
pub use trace::Trace;
/// Re-exports the data model and error type from the types module.
pub use types::{
    Configuration, Direction, ExecutionStep, HaltReason, MachineDefinition, MachineError,
    Outcome, RunStatus, State, StateKind, Symbol, Transition,
};
