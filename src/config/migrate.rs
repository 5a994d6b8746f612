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

//! Schema versions and the settings migration pipeline
//!
//! The persisted command collection is versioned. Migrations are a pipeline
//! of independently testable steps applied in increasing version order; each
//! step transforms the whole collection and may write companion entries
//! (externalized script bodies) through the settings store. Steps are
//! cumulative and idempotent: a collection already at the latest version
//! passes through unchanged.
//!
//! # Version history
//!
//! 1. `first`: bindings have no `valid_on_addressbar`; shell actions carry
//!    their script text inline.
//! 2. `add_valid_on_addressbar`: the addressbar flag exists and is forced
//!    to `false` for upgraded bindings.
//! 3. `external_scripts`: shell actions reference a settings-store key
//!    (`commands/<name>.ps1`); the script body lives in its own entry.

use tracing::debug;

use crate::config::{SettingsError, SettingsStore};
use crate::core::types::{Action, CommandCollection};

/// Initial schema version.
pub const FIRST: u32 = 1;
/// Bindings gain the `valid_on_addressbar` flag.
pub const ADD_VALID_ON_ADDRESSBAR: u32 = 2;
/// Shell script bodies move out of the collection into their own entries.
pub const EXTERNAL_SCRIPTS: u32 = 3;
/// Highest version this build understands.
pub const LATEST: u32 = EXTERNAL_SCRIPTS;

/// The settings-store key holding the script body for a command name.
///
/// Equal display names collide; the last externalized body wins.
pub fn script_reference_for(display_name: &str) -> String {
    format!("commands/{}.ps1", display_name)
}

type MigrationFn =
    fn(CommandCollection, &mut dyn SettingsStore) -> Result<CommandCollection, SettingsError>;

/// One migration step, bringing a collection up to `to_version`.
pub struct Migration {
    pub to_version: u32,
    pub name: &'static str,
    run: MigrationFn,
}

/// All migration steps, in increasing version order.
pub const MIGRATIONS: [Migration; 2] = [
    Migration {
        to_version: ADD_VALID_ON_ADDRESSBAR,
        name: "add-valid-on-addressbar",
        run: add_valid_on_addressbar,
    },
    Migration {
        to_version: EXTERNAL_SCRIPTS,
        name: "externalize-scripts",
        run: externalize_scripts,
    },
];

/// Applies every outstanding migration step in order.
///
/// Returns the upgraded collection and whether any step actually ran; the
/// caller persists the collection when it did, so migrations execute at
/// most once per stored file.
pub fn migrate_to_latest(
    mut collection: CommandCollection,
    store: &mut dyn SettingsStore,
) -> Result<(CommandCollection, bool), SettingsError> {
    let mut changed = false;

    for migration in &MIGRATIONS {
        if collection.version < migration.to_version {
            debug!(
                step = migration.name,
                to_version = migration.to_version,
                "applying settings migration"
            );
            collection = (migration.run)(collection, store)?;
            collection.version = migration.to_version;
            changed = true;
        }
    }

    Ok((collection, changed))
}

/// 1 → 2: introduce the addressbar flag.
///
/// Version-1 files predate the field entirely, so every upgraded binding
/// starts conservative: not valid while the addressbar has focus.
fn add_valid_on_addressbar(
    mut collection: CommandCollection,
    _store: &mut dyn SettingsStore,
) -> Result<CommandCollection, SettingsError> {
    for binding in &mut collection.data {
        binding.valid_on_addressbar = false;
    }
    Ok(collection)
}

/// 2 → 3: move inline script text into its own store entry.
///
/// The shell action's `command` field is rewritten from the script text to
/// the derived store key. Name collisions are not deduplicated; the last
/// write wins.
fn externalize_scripts(
    mut collection: CommandCollection,
    store: &mut dyn SettingsStore,
) -> Result<CommandCollection, SettingsError> {
    for binding in &mut collection.data {
        if let Action::PowerShell(inline) = &binding.action {
            let reference = script_reference_for(&binding.display_name);
            store.write(&reference, inline)?;
            binding.action = Action::PowerShell(reference);
        }
    }
    Ok(collection)
}
