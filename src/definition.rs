//! The live machine definition and the edit operations an editor applies to it.
//!
//! A [`SharedDefinition`] is handed to both the editor and the engine. The editor
//! mutates it at any time; the engine takes a read guard once per step and never
//! keeps a copy, so edits land on the next step.

use crate::types::{Direction, MachineDefinition, MachineError, State, StateKind, Symbol, Transition};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Cheaply clonable handle to a definition shared between editor and engine.
#[derive(Debug, Clone, Default)]
pub struct SharedDefinition {
    inner: Arc<RwLock<MachineDefinition>>,
}

impl SharedDefinition {
    pub fn new(definition: MachineDefinition) -> Self {
        Self {
            inner: Arc::new(RwLock::new(definition)),
        }
    }

    /// Read access. Writers never leave a definition half-edited, so a poisoned
    /// lock still holds a usable value.
    pub fn read(&self) -> RwLockReadGuard<'_, MachineDefinition> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, MachineDefinition> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies an edit under the write lock.
    pub fn update<R>(&self, edit: impl FnOnce(&mut MachineDefinition) -> R) -> R {
        edit(&mut self.write())
    }

    /// Owned copy of the current definition.
    pub fn snapshot(&self) -> MachineDefinition {
        self.read().clone()
    }
}

impl From<MachineDefinition> for SharedDefinition {
    fn from(definition: MachineDefinition) -> Self {
        Self::new(definition)
    }
}

impl MachineDefinition {
    /// Appends a `regular` state named after the first free `q<n>` id.
    pub fn add_state(&mut self) -> &State {
        let id = (self.states.len()..)
            .map(|n| format!("q{n}"))
            .find(|id| self.state(id).is_none())
            .unwrap_or_default();
        self.states.push(State::new(id, StateKind::Regular));
        &self.states[self.states.len() - 1]
    }

    /// Removes every state with this id. Transitions referring to it stay in
    /// place; a transition into a missing state simply continues.
    pub fn remove_state(&mut self, id: &str) -> Result<(), MachineError> {
        let before = self.states.len();
        self.states.retain(|s| s.id != id);
        if self.states.len() == before {
            return Err(MachineError::UnknownState(id.to_string()));
        }
        Ok(())
    }

    /// Changes a state's kind. Start, accept and reject are exclusive: any
    /// other state holding the same kind is demoted to `regular`.
    pub fn set_state_kind(&mut self, id: &str, kind: StateKind) -> Result<(), MachineError> {
        if self.state(id).is_none() {
            return Err(MachineError::UnknownState(id.to_string()));
        }

        for state in &mut self.states {
            if state.id == id {
                state.kind = kind;
            } else if kind.is_exclusive() && state.kind == kind {
                debug!(state = %state.id, ?kind, "demoted to regular");
                state.kind = StateKind::Regular;
            }
        }
        Ok(())
    }

    pub fn rename_state(&mut self, id: &str, label: impl Into<String>) -> Result<(), MachineError> {
        let label = label.into();
        let state = self
            .states
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| MachineError::UnknownState(id.to_string()))?;
        state.label = label;
        Ok(())
    }

    /// Appends a transition with a generated id. Duplicated `(from, read)` pairs
    /// are accepted; the earlier rule keeps winning.
    pub fn add_transition(
        &mut self,
        from: impl Into<String>,
        read: impl Into<Symbol>,
        to: impl Into<String>,
        write: impl Into<Symbol>,
        direction: Direction,
    ) -> &Transition {
        let from = from.into();
        let to = to.into();
        let id = (0_usize..)
            .map(|n| format!("e{from}-{to}-{n}"))
            .find(|id| self.transitions.iter().all(|t| &t.id != id))
            .unwrap_or_default();

        self.transitions.push(Transition {
            id,
            from,
            read: read.into(),
            to,
            write: write.into(),
            direction,
        });
        &self.transitions[self.transitions.len() - 1]
    }

    pub fn remove_transition(&mut self, id: &str) -> Result<Transition, MachineError> {
        let index = self
            .transitions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| MachineError::UnknownTransition(id.to_string()))?;
        Ok(self.transitions.remove(index))
    }

    /// Adds an input symbol, also making it a tape symbol.
    pub fn add_input_symbol(&mut self, symbol: impl Into<Symbol>) {
        let symbol = symbol.into();
        if !self.input_alphabet.contains(&symbol) {
            self.input_alphabet.push(symbol.clone());
        }
        self.add_tape_symbol(symbol);
    }

    pub fn remove_input_symbol(&mut self, symbol: &str) {
        self.input_alphabet.retain(|s| s != symbol);
    }

    pub fn add_tape_symbol(&mut self, symbol: impl Into<Symbol>) {
        let symbol = symbol.into();
        if !self.tape_alphabet.contains(&symbol) {
            self.tape_alphabet.push(symbol);
        }
    }

    /// Removes a tape symbol. The blank symbol cannot be removed.
    pub fn remove_tape_symbol(&mut self, symbol: &str) -> Result<(), MachineError> {
        if symbol == self.blank {
            return Err(MachineError::BlankSymbolRemoval(symbol.to_string()));
        }
        self.tape_alphabet.retain(|s| s != symbol);
        Ok(())
    }

    /// Sets the blank symbol, adding it to the tape alphabet if needed.
    ///
    /// Takes effect for tapes created by the next initialize.
    pub fn set_blank(&mut self, symbol: impl Into<Symbol>) {
        let symbol = symbol.into();
        self.add_tape_symbol(symbol.clone());
        self.blank = symbol;
    }
}
