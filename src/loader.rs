//! This module provides the `DefinitionLoader` struct, responsible for reading machine
//! definitions from JSON files and strings for front-ends that keep them on disk.

use crate::types::{MachineDefinition, MachineError};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `DefinitionLoader` is a utility struct for loading machine definitions.
/// It provides methods to load definitions from individual files, from string content,
/// and to collect all `.json` files within a directory into a [`DefinitionCatalog`].
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a single machine definition from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.json` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(MachineDefinition)` if the file is successfully read and decoded.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::FormatError)` if the file content is not a valid definition.
    pub fn load(path: &Path) -> Result<MachineDefinition, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_from_str(&content)
    }

    /// Loads a single machine definition from the provided string content.
    ///
    /// The definition must have at least one state. Nothing else is validated:
    /// symbols are not checked against alphabets and transitions may overlap.
    pub fn load_from_str(content: &str) -> Result<MachineDefinition, MachineError> {
        let definition: MachineDefinition =
            serde_json::from_str(content).map_err(|e| MachineError::FormatError(e.to_string()))?;
        definition.check()?;

        Ok(definition)
    }

    /// Loads every `.json` file directly inside `directory` into a catalog keyed by
    /// machine name.
    ///
    /// Files are visited in path order. A definition without a name is keyed by its
    /// file stem. A file that fails to load, or whose name is already taken by an
    /// earlier file, is listed in `failures` instead.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::FileError)` if the directory itself cannot be read.
    pub fn load_dir(directory: &Path) -> Result<DefinitionCatalog, MachineError> {
        let entries = fs::read_dir(directory).map_err(|e| {
            MachineError::FileError(format!(
                "Failed to read directory {}: {}",
                directory.display(),
                e
            ))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => warn!(error = %e, "skipping unreadable directory entry"),
            }
        }
        paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"));
        paths.sort();

        let mut catalog = DefinitionCatalog::default();
        for path in paths {
            let definition = match Self::load(&path) {
                Ok(definition) => definition,
                Err(e) => {
                    catalog.failures.push((path, e));
                    continue;
                }
            };

            let name = if definition.name.is_empty() {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default()
            } else {
                definition.name.clone()
            };

            match catalog.definitions.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert((path, definition));
                }
                Entry::Occupied(taken) => {
                    let error = MachineError::InvalidDefinition(format!(
                        "machine name '{}' already used by {}",
                        taken.key(),
                        taken.get().0.display()
                    ));
                    catalog.failures.push((path, error));
                }
            }
        }

        debug!(
            directory = %directory.display(),
            loaded = catalog.definitions.len(),
            failed = catalog.failures.len(),
            "definitions loaded"
        );
        Ok(catalog)
    }
}

/// Definitions found in one directory.
#[derive(Debug, Default)]
pub struct DefinitionCatalog {
    /// Loaded definitions with the file each came from, keyed by machine name.
    pub definitions: BTreeMap<String, (PathBuf, MachineDefinition)>,
    pub failures: Vec<(PathBuf, MachineError)>,
}

impl DefinitionCatalog {
    pub fn get(&self, name: &str) -> Option<&MachineDefinition> {
        self.definitions.get(name).map(|(_, definition)| definition)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}
