use crate::loader::DefinitionLoader;
use crate::types::{MachineDefinition, MachineError};

use std::sync::{PoisonError, RwLock};
use tracing::warn;

/// Embedded sample machines, each with an input it is meant to be run on.
const SAMPLE_TEXTS: [(&str, &str); 4] = [
    (include_str!("../machines/accept-one.json"), "1"),
    (include_str!("../machines/binary-increment.json"), "1011"),
    (include_str!("../machines/even-length.json"), "0110"),
    (include_str!("../machines/palindrome.json"), "10101"),
];

/// A built-in definition together with its suggested input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub definition: MachineDefinition,
    pub input: String,
}

lazy_static::lazy_static! {
    pub static ref SAMPLES: RwLock<Vec<Sample>> = RwLock::new(Vec::new());
}

pub struct SampleManager;

impl SampleManager {
    /// Decodes the embedded samples into `SAMPLES`. Cheap to call repeatedly.
    pub fn load() {
        let mut samples = SAMPLES.write().unwrap_or_else(PoisonError::into_inner);
        if !samples.is_empty() {
            return;
        }

        for (text, input) in SAMPLE_TEXTS {
            match DefinitionLoader::load_from_str(text) {
                Ok(definition) => samples.push(Sample {
                    definition,
                    input: input.to_string(),
                }),
                Err(e) => warn!(error = %e, "failed to decode sample"),
            }
        }
    }

    /// Get the number of available samples
    pub fn count() -> usize {
        Self::load();
        SAMPLES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Get a sample by its index
    pub fn by_index(index: usize) -> Result<Sample, MachineError> {
        Self::load();
        SAMPLES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
            .ok_or_else(|| {
                MachineError::InvalidDefinition(format!("Sample index {} out of range", index))
            })
    }

    /// Get a sample by name, ignoring case
    pub fn by_name(name: &str) -> Result<Sample, MachineError> {
        Self::load();
        SAMPLES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|sample| sample.definition.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| MachineError::InvalidDefinition(format!("Sample '{}' not found", name)))
    }

    /// List all sample names
    pub fn names() -> Vec<String> {
        Self::load();
        SAMPLES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|sample| sample.definition.name.clone())
            .collect()
    }

    /// Get information about a sample by its index
    pub fn info(index: usize) -> Result<SampleInfo, MachineError> {
        let sample = Self::by_index(index)?;

        Ok(SampleInfo {
            index,
            name: sample.definition.name.clone(),
            input: sample.input,
            state_count: sample.definition.states.len(),
            transition_count: sample.definition.transitions.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInfo {
    pub index: usize,
    pub name: String,
    pub input: String,
    pub state_count: usize,
    pub transition_count: usize,
}
