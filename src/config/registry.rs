// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command registry: the owner of the versioned binding collection
//!
//! The registry loads the collection from the settings store, migrates it
//! to the latest schema (persisting the upgrade so migrations run at most
//! once per stored file), and serves lookups to the resolver. It is also
//! the single writer back to the store: the settings-pane edit flow goes
//! through `add` / `remove` / `replace` / `save`.
//!
//! Fail-safes on load:
//! - absent or blank settings → built-in defaults, no write-back;
//! - version newer than this build understands → empty collection, a
//!   warning, and no write-back (never clobber a newer file);
//! - structurally invalid JSON → an explicit error.

use tracing::{debug, warn};

use crate::config::{defaults, migrate, SettingsError, SettingsStore};
use crate::core::overlap::OverlapIndex;
use crate::core::types::{CommandBinding, CommandCollection};
use crate::core::validator::validate_binding;

/// Fixed settings key of the command collection.
pub const COMMANDS_SETTING_KEY: &str = "key_bind.json";

/// Owns the in-memory command collection for the lifetime of a pane.
#[derive(Debug)]
pub struct CommandRegistry {
    collection: CommandCollection,
}

impl CommandRegistry {
    /// Loads, migrates and returns the command registry.
    ///
    /// When any migration step ran, the upgraded collection is persisted
    /// before this function returns.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Malformed` for structurally invalid JSON and
    /// propagates store I/O failures.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filebind::config::{CommandRegistry, FileSettingsStore};
    /// use std::path::PathBuf;
    ///
    /// let mut store = FileSettingsStore::open(PathBuf::from("~/.config/filebind"))?;
    /// let registry = CommandRegistry::load(&mut store)?;
    /// println!("{} bindings", registry.bindings().len());
    /// # Ok::<(), filebind::config::SettingsError>(())
    /// ```
    pub fn load(store: &mut dyn SettingsStore) -> Result<Self, SettingsError> {
        let raw = store.read(COMMANDS_SETTING_KEY)?;

        let collection = match raw {
            None => {
                debug!("no command settings found, synthesizing defaults");
                defaults::default_collection()
            }
            Some(text) if text.trim().is_empty() => {
                debug!("blank command settings, synthesizing defaults");
                defaults::default_collection()
            }
            Some(text) => {
                let parsed: CommandCollection = serde_json::from_str(&text)
                    .map_err(|e| SettingsError::Malformed(e.to_string()))?;

                if parsed.version > migrate::LATEST {
                    warn!(
                        found = parsed.version,
                        latest = migrate::LATEST,
                        "command settings were written by a newer build; ignoring them"
                    );
                    CommandCollection::new(migrate::LATEST, Vec::new())
                } else {
                    let (migrated, changed) = migrate::migrate_to_latest(parsed, store)?;
                    if changed {
                        debug!(version = migrated.version, "persisting migrated command settings");
                        persist(&migrated, store)?;
                    }
                    migrated
                }
            }
        };

        Ok(Self { collection })
    }

    /// Wraps an already-built collection (tests, embedding).
    pub fn from_collection(collection: CommandCollection) -> Self {
        Self { collection }
    }

    /// The ordered binding list.
    pub fn bindings(&self) -> &[CommandBinding] {
        &self.collection.data
    }

    /// Bindings satisfying a predicate, in registry order.
    pub fn filter<P>(&self, predicate: P) -> Vec<&CommandBinding>
    where
        P: Fn(&CommandBinding) -> bool,
    {
        self.collection.data.iter().filter(|b| predicate(b)).collect()
    }

    /// Rebuilds the shared-key index over the current bindings.
    pub fn overlap_index(&self) -> OverlapIndex {
        let mut index = OverlapIndex::new();
        for binding in &self.collection.data {
            index.add_binding(binding.clone());
        }
        index
    }

    /// Appends a binding (settings-pane "+" flow).
    pub fn add(&mut self, binding: CommandBinding) {
        self.collection.data.push(binding);
    }

    /// Removes and returns the binding at `index`.
    pub fn remove(&mut self, index: usize) -> Result<CommandBinding, SettingsError> {
        if index >= self.collection.data.len() {
            return Err(SettingsError::IndexOutOfRange(index));
        }
        Ok(self.collection.data.remove(index))
    }

    /// Replaces the binding at `index`.
    pub fn replace(&mut self, index: usize, binding: CommandBinding) -> Result<(), SettingsError> {
        let slot = self
            .collection
            .data
            .get_mut(index)
            .ok_or(SettingsError::IndexOutOfRange(index))?;
        *slot = binding;
        Ok(())
    }

    /// Validates and persists the collection, always at the latest version.
    pub fn save(&mut self, store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
        for binding in &self.collection.data {
            validate_binding(binding)?;
        }
        self.collection.version = migrate::LATEST;
        persist(&self.collection, store)
    }
}

/// Serializes and writes the collection under the fixed settings key.
fn persist(
    collection: &CommandCollection,
    store: &mut dyn SettingsStore,
) -> Result<(), SettingsError> {
    let text = serde_json::to_string_pretty(collection)
        .map_err(|e| SettingsError::Malformed(e.to_string()))?;
    store.write(COMMANDS_SETTING_KEY, &text)
}
