//! First-match transition lookup over the ordered rule list of a definition.

use crate::types::{MachineDefinition, Transition};

/// A read-only view of a definition's transitions, queried by `(state, symbol)`.
///
/// The table borrows the live definition, so it is rebuilt on every step and
/// never goes stale after an edit.
#[derive(Debug, Clone, Copy)]
pub struct TransitionTable<'a> {
    transitions: &'a [Transition],
}

impl<'a> TransitionTable<'a> {
    pub fn new(definition: &'a MachineDefinition) -> Self {
        Self::from_rules(&definition.transitions)
    }

    pub fn from_rules(transitions: &'a [Transition]) -> Self {
        Self { transitions }
    }

    /// Returns the first transition in declaration order leaving `state` on `symbol`.
    ///
    /// Later transitions with the same `(from, read)` pair are unreachable.
    pub fn lookup(&self, state: &str, symbol: &str) -> Option<&'a Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == state && t.read == symbol)
    }

    /// Transitions that share their `(from, read)` pair with an earlier one.
    pub fn shadowed(&self) -> impl Iterator<Item = &'a Transition> {
        let transitions = self.transitions;
        transitions.iter().enumerate().filter_map(move |(i, t)| {
            transitions[..i]
                .iter()
                .any(|earlier| earlier.from == t.from && earlier.read == t.read)
                .then_some(t)
        })
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn rule(id: &str, from: &str, read: &str, to: &str) -> Transition {
        Transition {
            id: id.to_string(),
            from: from.to_string(),
            read: read.to_string(),
            to: to.to_string(),
            write: read.to_string(),
            direction: Direction::Right,
        }
    }

    #[test]
    fn test_lookup_matches_state_and_symbol() {
        let rules = vec![rule("a", "q0", "0", "q1"), rule("b", "q0", "1", "q2")];
        let table = TransitionTable::from_rules(&rules);

        assert_eq!(table.lookup("q0", "1").unwrap().id, "b");
        assert!(table.lookup("q1", "1").is_none());
        assert!(table.lookup("q0", "B").is_none());
    }

    #[test]
    fn test_first_declared_duplicate_wins() {
        let rules = vec![
            rule("first", "q0", "1", "qA"),
            rule("second", "q0", "1", "qR"),
        ];
        let table = TransitionTable::from_rules(&rules);

        for _ in 0..3 {
            assert_eq!(table.lookup("q0", "1").unwrap().id, "first");
        }
        let shadowed: Vec<_> = table.shadowed().map(|t| t.id.as_str()).collect();
        assert_eq!(shadowed, vec!["second"]);
    }

    #[test]
    fn test_symbols_compare_as_whole_tokens() {
        let rules = vec![rule("a", "q0", "10", "q1")];
        let table = TransitionTable::from_rules(&rules);

        assert!(table.lookup("q0", "1").is_none());
        assert!(table.lookup("q0", "10").is_some());
    }
}
