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

//! File system watcher for live settings monitoring
//!
//! Uses OS-level file watching (Linux inotify) via the notify crate.
//! Zero CPU overhead when the settings file is unchanged; the CLI `watch`
//! command polls `check_for_changes` and reloads the registry on edits.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::Path,
    sync::mpsc::{channel, Receiver},
};

use crate::config::SettingsError;

/// Watches the command settings file for modifications.
pub struct SettingsWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
}

impl SettingsWatcher {
    /// Installs a non-recursive watch on the given settings file.
    pub fn new(path: &Path) -> Result<Self, SettingsError> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )
        .map_err(|e| SettingsError::WatchFailed(e.to_string()))?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| SettingsError::WatchFailed(e.to_string()))?;

        Ok(SettingsWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drains pending events; true when the file content changed.
    ///
    /// Creation counts as a change because the store replaces files via
    /// atomic rename.
    pub fn check_for_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(event_result) = self.rx.try_recv() {
            if let Ok(event) = event_result {
                if matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) {
                    changed = true;
                }
            }
        }
        changed
    }
}
