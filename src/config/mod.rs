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

//! Settings storage with atomic writes and backup support.
//!
//! This module provides the durable key→text storage backing the command
//! registry and externalized script bodies. Key features:
//!
//! - **Atomic writes**: Uses temp-file-then-rename to prevent corruption
//! - **Automatic backups**: Overwriting an existing entry creates a
//!   timestamped backup first
//! - **Key safety**: Keys are relative paths under the settings directory;
//!   traversal outside it is rejected
//!
//! # Example
//!
//! ```no_run
//! use filebind::config::{FileSettingsStore, SettingsStore};
//! use std::path::PathBuf;
//!
//! let mut store = FileSettingsStore::open(PathBuf::from("/home/user/.config/filebind"))?;
//! store.write("commands/Copy here.ps1", "Copy-Item $selecting_item_path_ary $opposite_dir")?;
//! let body = store.read("commands/Copy here.ps1")?;
//! assert!(body.is_some());
//! # Ok::<(), filebind::config::SettingsError>(())
//! ```

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

pub mod defaults;
pub mod error;
pub mod migrate;
pub mod registry;
pub mod watcher;

pub use error::SettingsError;
pub use registry::{CommandRegistry, COMMANDS_SETTING_KEY};
pub use watcher::SettingsWatcher;

#[cfg(test)]
mod tests;

/// Durable key→text storage for setting files.
///
/// Reads return the full text or `None` for missing entries; writes are
/// whole-entry overwrites. The registry is the only writer of the command
/// collection; the migration pipeline also writes externalized script
/// bodies through this trait.
pub trait SettingsStore {
    /// Reads the full text stored under `key`, or `None` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Overwrites the text stored under `key`.
    fn write(&mut self, key: &str, content: &str) -> Result<(), SettingsError>;
}

/// Filesystem-backed settings store rooted at a settings directory.
///
/// Keys map to files below the root (`key_bind.json`,
/// `commands/<name>.ps1`). Every overwrite of an existing file first copies
/// the old content into `<root>/backups/` with a timestamp suffix.
#[derive(Debug)]
pub struct FileSettingsStore {
    root: PathBuf,
    backup_dir: PathBuf,
}

impl FileSettingsStore {
    /// Opens (creating if needed) a settings directory.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Io` if the directory cannot be created and
    /// `SettingsError::BackupDirNotWritable` if the backup directory is
    /// read-only.
    pub fn open(root: PathBuf) -> Result<Self, SettingsError> {
        fs::create_dir_all(&root)?;

        let backup_dir = root.join("backups");
        if !backup_dir.exists() {
            fs::create_dir_all(&backup_dir)
                .map_err(|_| SettingsError::BackupDirNotWritable(backup_dir.clone()))?;
        }
        if backup_dir.metadata()?.permissions().readonly() {
            return Err(SettingsError::BackupDirNotWritable(backup_dir));
        }

        Ok(Self { root, backup_dir })
    }

    /// The settings directory this store is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the file backing `key`.
    ///
    /// Keys are relative paths; absolute keys and `..` components are
    /// rejected so a key can never escape the settings directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, SettingsError> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if key.is_empty() || escapes {
            return Err(SettingsError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Copies the current content of `path` into the backup directory.
    fn backup_existing(&self, path: &Path) -> Result<PathBuf, SettingsError> {
        let content = fs::read_to_string(path)?;
        let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");
        let original_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SettingsError::BackupFailed(format!("{}", path.display())))?;

        let backup_path = self
            .backup_dir
            .join(format!("{}.{}", original_name, timestamp));
        fs::write(&backup_path, &content)?;
        Ok(backup_path)
    }
}

impl SettingsStore for FileSettingsStore {
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SettingsError::Io(err)),
        }
    }

    fn write(&mut self, key: &str, content: &str) -> Result<(), SettingsError> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.exists() {
            self.backup_existing(&path)?;
        }

        let mut file = AtomicWriteFile::options().open(&path).map_err(|e| {
            SettingsError::WriteFailed(format!("Failed to open for atomic write: {}", e))
        })?;
        file.write_all(content.as_bytes())
            .map_err(|e| SettingsError::WriteFailed(format!("Failed to write content: {}", e)))?;
        file.commit().map_err(|e| {
            SettingsError::WriteFailed(format!("Failed to commit atomic write: {}", e))
        })?;

        Ok(())
    }
}

/// In-memory settings store.
///
/// Backs unit tests and headless embedding; behaves like `FileSettingsStore`
/// minus durability. Tracks the number of writes so tests can assert that a
/// load path performed none.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: HashMap<String, String>,
    write_count: usize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry without counting it as a write.
    pub fn seed(&mut self, key: &str, content: &str) {
        self.entries.insert(key.to_string(), content.to_string());
    }

    /// Number of writes performed through the trait.
    pub fn write_count(&self) -> usize {
        self.write_count
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, content: &str) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), content.to_string());
        self.write_count += 1;
        Ok(())
    }
}
