//! Sparse, bidirectionally unbounded tape.
//!
//! Only explicitly written cells are stored. Every other position reads as the
//! blank symbol, so the head may wander arbitrarily far in either direction
//! without any allocation. The blank itself belongs to the machine definition
//! and is passed in on every read, so editing it takes effect immediately.

use crate::types::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single cell as shown to a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeCell {
    pub index: i64,
    pub symbol: Symbol,
}

/// Tape contents keyed by position. Ordered so the written extent is cheap to find.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tape {
    cells: BTreeMap<i64, Symbol>,
}

impl Tape {
    /// Creates an empty tape where every position reads as blank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tape holding `input` at positions `0..n`.
    pub fn from_input<I, S>(input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let mut tape = Self::new();
        for (position, symbol) in (0_i64..).zip(input) {
            tape.write(position, symbol);
        }
        tape
    }

    /// Returns the symbol at `position`, or `blank` if nothing was written there.
    pub fn read<'a>(&'a self, position: i64, blank: &'a str) -> &'a str {
        self.cells
            .get(&position)
            .map(String::as_str)
            .unwrap_or(blank)
    }

    /// Stores `symbol` at `position`, replacing any previous value.
    pub fn write(&mut self, position: i64, symbol: impl Into<Symbol>) {
        self.cells.insert(position, symbol.into());
    }

    /// Smallest and largest positions ever written, or `None` for an untouched tape.
    pub fn written_extent(&self) -> Option<(i64, i64)> {
        let (min, _) = self.cells.first_key_value()?;
        let (max, _) = self.cells.last_key_value()?;
        Some((*min, *max))
    }

    /// Number of explicitly written cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Written cells in position order.
    pub fn cells(&self) -> impl Iterator<Item = (i64, &str)> {
        self.cells.iter().map(|(&i, s)| (i, s.as_str()))
    }

    /// Contiguous cells covering the written extent and the head, padded by
    /// `buffer` cells on each side. Unwritten cells show `blank`.
    pub fn window(&self, head: i64, buffer: i64, blank: &str) -> Vec<TapeCell> {
        let (min_written, max_written) = self.written_extent().unwrap_or((0, 0));
        let start = min_written.min(head) - buffer;
        let end = max_written.max(head) + buffer;

        (start..=end)
            .map(|index| TapeCell {
                index,
                symbol: self.read(index, blank).to_string(),
            })
            .collect()
    }

    /// Renders the written extent as a single string, interior gaps shown as `blank`.
    pub fn contents(&self, blank: &str) -> String {
        match self.written_extent() {
            Some((min, max)) => (min..=max).map(|i| self.read(i, blank)).collect(),
            None => String::new(),
        }
    }
}
