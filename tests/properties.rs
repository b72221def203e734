//! Property-based tests for the execution engine.
//!
//! These tests use proptest to check the stepping laws over randomly
//! generated machines and inputs.

use proptest::prelude::*;
use tmsim::{
    Direction, HaltReason, MachineDefinition, Outcome, RunStatus, State, StateKind, Step,
    Transition, TuringMachine,
};

const SYMBOLS: [&str; 3] = ["0", "1", "B"];
const STATES: [&str; 4] = ["q0", "q1", "qA", "qR"];

prop_compose! {
    fn arbitrary_direction()(variant in 0..3u8) -> Direction {
        match variant {
            0 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::Stay,
        }
    }
}

prop_compose! {
    fn arbitrary_transition()(
        id in 0..1000u32,
        from in 0..2usize,
        read in 0..3usize,
        to in 0..4usize,
        write in 0..3usize,
        direction in arbitrary_direction(),
    ) -> Transition {
        Transition {
            id: format!("t{id}"),
            from: STATES[from].to_string(),
            read: SYMBOLS[read].to_string(),
            to: STATES[to].to_string(),
            write: SYMBOLS[write].to_string(),
            direction,
        }
    }
}

prop_compose! {
    fn arbitrary_definition()(
        transitions in prop::collection::vec(arbitrary_transition(), 0..12),
    ) -> MachineDefinition {
        MachineDefinition {
            states: vec![
                State::new("q0", StateKind::Start),
                State::new("q1", StateKind::Regular),
                State::new("qA", StateKind::Accept),
                State::new("qR", StateKind::Reject),
            ],
            transitions,
            ..MachineDefinition::default()
        }
    }
}

fn arbitrary_input() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["0", "1"]), 0..8)
        .prop_map(|symbols| symbols.into_iter().map(String::from).collect())
}

fn run_bounded(machine: &mut TuringMachine, limit: usize) {
    for _ in 0..limit {
        if let Step::Halt(_) = machine.step().unwrap() {
            break;
        }
    }
}

proptest! {
    #[test]
    fn repeated_runs_produce_identical_traces(
        definition in arbitrary_definition(),
        input in arbitrary_input(),
    ) {
        let mut first = TuringMachine::new(definition.clone());
        first.initialize(input.clone()).unwrap();
        run_bounded(&mut first, 200);

        let mut second = TuringMachine::new(definition);
        second.initialize(input).unwrap();
        run_bounded(&mut second, 200);

        prop_assert_eq!(first.trace(), second.trace());
        prop_assert_eq!(first.tape(), second.tape());
        prop_assert_eq!(first.configuration(), second.configuration());
    }

    #[test]
    fn step_numbers_are_contiguous(
        definition in arbitrary_definition(),
        input in arbitrary_input(),
    ) {
        let mut machine = TuringMachine::new(definition);
        machine.initialize(input).unwrap();
        run_bounded(&mut machine, 200);

        for (index, step) in machine.trace().iter().enumerate() {
            prop_assert_eq!(step.step_number, index + 1);
        }
    }

    #[test]
    fn each_step_obeys_head_and_write_laws(
        definition in arbitrary_definition(),
        input in arbitrary_input(),
    ) {
        let mut machine = TuringMachine::new(definition);
        machine.initialize(input).unwrap();

        for _ in 0..100 {
            let tape_before = machine.tape().unwrap().clone();
            let before = machine.configuration().unwrap().clone();
            let expected = machine.transition();

            machine.step().unwrap();
            let record = machine.trace().last().unwrap().clone();
            let after = machine.configuration().unwrap().clone();
            let tape_after = machine.tape().unwrap();

            prop_assert_eq!(&record.state_before, &before.current_state);
            prop_assert_eq!(record.head_position_before, before.head_position);
            prop_assert_eq!(&record.transition, &expected);

            match &record.transition {
                Some(t) => {
                    prop_assert_eq!(after.head_position - before.head_position, t.direction.offset());
                    prop_assert_eq!(&after.current_state, &t.to);
                    prop_assert_eq!(tape_after.read(before.head_position, "B"), t.write.as_str());

                    let (lo, hi) = tape_before.written_extent().unwrap_or((0, 0));
                    for position in (lo - 2)..=(hi + 2) {
                        if position != before.head_position {
                            prop_assert_eq!(tape_after.read(position, "B"), tape_before.read(position, "B"));
                        }
                    }
                }
                None => {
                    prop_assert_eq!(record.outcome, Outcome::Undefined);
                    prop_assert_eq!(&after, &before);
                    prop_assert_eq!(tape_after, &tape_before);
                }
            }

            if machine.is_halted() {
                break;
            }
        }
    }

    #[test]
    fn halted_machine_ignores_further_steps(
        definition in arbitrary_definition(),
        input in arbitrary_input(),
        extra in 1..10usize,
    ) {
        let mut machine = TuringMachine::new(definition);
        machine.initialize(input).unwrap();
        run_bounded(&mut machine, 200);
        prop_assume!(machine.is_halted());

        let snapshot = machine.snapshot();
        for _ in 0..extra {
            prop_assert!(matches!(machine.step(), Ok(Step::Halt(_))));
        }
        prop_assert_eq!(machine.snapshot(), snapshot);
    }

    #[test]
    fn only_first_duplicate_is_ever_applied(
        definition in arbitrary_definition(),
        input in arbitrary_input(),
    ) {
        let mut machine = TuringMachine::new(definition.clone());
        machine.initialize(input).unwrap();
        run_bounded(&mut machine, 200);

        for step in machine.trace() {
            if let Some(applied) = &step.transition {
                let first = definition
                    .transitions
                    .iter()
                    .find(|t| t.from == applied.from && t.read == applied.read)
                    .unwrap();
                prop_assert_eq!(&applied.id, &first.id);
                prop_assert_eq!(applied, first);
            }
        }
    }

    #[test]
    fn halt_status_matches_last_outcome(
        definition in arbitrary_definition(),
        input in arbitrary_input(),
    ) {
        let mut machine = TuringMachine::new(definition);
        machine.initialize(input).unwrap();
        run_bounded(&mut machine, 200);

        let last = machine.trace().last().map(|s| s.outcome);
        match machine.status() {
            RunStatus::Halted(HaltReason::Accepted) => prop_assert_eq!(last, Some(Outcome::Accepted)),
            RunStatus::Halted(HaltReason::Rejected) => prop_assert_eq!(last, Some(Outcome::Rejected)),
            RunStatus::Halted(HaltReason::Undefined) => prop_assert_eq!(last, Some(Outcome::Undefined)),
            status => {
                prop_assert_eq!(status, RunStatus::Ready);
                prop_assert_eq!(machine.trace().len(), 200);
            }
        }
    }
}
