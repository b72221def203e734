//! The single-step transition function.
//!
//! [`step`] applies exactly one transition to a tape and configuration. It holds
//! no state of its own: the definition is passed in on every call, so edits made
//! between steps (including changes to which states accept or reject) are seen by
//! the very next step.

use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{Configuration, HaltReason, MachineDefinition, Outcome, StepRecord, Transition};
use tracing::trace;

/// Everything a single step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    /// Configuration after the step. Unchanged for an undefined halt.
    pub configuration: Configuration,
    /// Unnumbered trace entry describing the step.
    pub record: StepRecord,
    pub halt: Option<HaltReason>,
}

/// Classifies a destination state by its current kind.
///
/// Accept is checked before reject, so a state flagged as both is accepting.
pub fn classify(definition: &MachineDefinition, destination: &str) -> Outcome {
    if definition.is_accepting(destination) {
        Outcome::Accepted
    } else if definition.is_rejecting(destination) {
        Outcome::Rejected
    } else {
        Outcome::Continued
    }
}

/// Executes one step of the machine.
///
/// 1. Reads the symbol under the head, substituting the definition's current blank.
/// 2. Resolves the first matching transition for `(state, symbol)`.
/// 3. With no match, halts as [`HaltReason::Undefined`] leaving tape and
///    configuration untouched.
/// 4. Otherwise writes, moves the head and classifies the destination state.
pub fn step(
    definition: &MachineDefinition,
    tape: &mut Tape,
    configuration: &Configuration,
) -> StepResult {
    let head = configuration.head_position;
    let symbol = tape.read(head, &definition.blank).to_string();
    let table = TransitionTable::new(definition);

    let Some(transition) = table.lookup(&configuration.current_state, &symbol) else {
        trace!(
            state = %configuration.current_state,
            head,
            symbol = %symbol,
            "no transition"
        );
        return StepResult {
            configuration: configuration.clone(),
            record: record(configuration, symbol, None, Outcome::Undefined),
            halt: Some(HaltReason::Undefined),
        };
    };

    tape.write(head, transition.write.as_str());
    let next = Configuration {
        current_state: transition.to.clone(),
        head_position: head + transition.direction.offset(),
    };
    let outcome = classify(definition, &transition.to);

    trace!(
        from = %configuration.current_state,
        to = %transition.to,
        head,
        symbol = %symbol,
        write = %transition.write,
        direction = %transition.direction,
        %outcome,
        "transition applied"
    );

    StepResult {
        configuration: next,
        record: record(configuration, symbol, Some(transition.clone()), outcome),
        halt: outcome.halt_reason(),
    }
}

fn record(
    before: &Configuration,
    symbol_read: String,
    transition: Option<Transition>,
    outcome: Outcome,
) -> StepRecord {
    StepRecord {
        state_before: before.current_state.clone(),
        head_position_before: before.head_position,
        symbol_read,
        transition,
        outcome,
    }
}
