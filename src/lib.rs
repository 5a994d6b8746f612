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

//! filebind: keybinding command engine for a dual-pane file manager
//!
//! Binds keyboard combinations to actions that are either built-in pane
//! operations or externally stored PowerShell scripts, persists the
//! bindings in a versioned settings file, and turns a matched command into
//! an external invocation carrying the caller's context (current directory,
//! selection, companion-pane directory, optional dialog input).
//!
//! # Features
//!
//! - **Versioned configuration:** Schema migrations run at most once per
//!   stored file and are individually testable
//! - **Deterministic key matching:** Canonical, locale-independent key
//!   strings with case-insensitive equality
//! - **Disambiguation:** Multiple bindings on one combination surface as a
//!   menu in registry order, never a silent pick
//! - **Modal input dialog:** An owned state machine collects free text
//!   before execution when a binding asks for it
//! - **Safe-by-structure templating:** A fixed-order variable preamble is
//!   prepended to the stored script body
//! - **Non-blocking execution:** Scripts run on a worker thread; results
//!   come back as correlated log events
//!
//! # Architecture
//!
//! - **`core`:** Business logic (types, key matching, resolution, overlap
//!   indexing, validation)
//! - **`config`:** Settings storage (atomic writes, backups, registry,
//!   migrations, file watching)
//! - **`exec`:** Dispatch flow (dialog protocol, templating, execution
//!   worker)
//!
//! # Examples
//!
//! ## Loading the registry
//!
//! ```no_run
//! use filebind::config::{CommandRegistry, FileSettingsStore};
//! use std::path::PathBuf;
//!
//! let mut store = FileSettingsStore::open(PathBuf::from("/home/user/.config/filebind"))?;
//! let registry = CommandRegistry::load(&mut store)?;
//! println!("{} bindings", registry.bindings().len());
//! # Ok::<(), filebind::config::SettingsError>(())
//! ```
//!
//! ## Resolving a key event
//!
//! ```no_run
//! use filebind::core::keyexpr::KeyInput;
//! use filebind::core::resolver::{resolve, InputFocus};
//! # use filebind::config::{CommandRegistry, FileSettingsStore};
//! # use std::path::PathBuf;
//! # let mut store = FileSettingsStore::open(PathBuf::from("/tmp/filebind"))?;
//! # let registry = CommandRegistry::load(&mut store)?;
//!
//! let event = KeyInput::new(true, false, false, "p");
//! let candidates = resolve(registry.bindings(), &event, InputFocus::PaneList);
//! match candidates.len() {
//!     0 => println!("not a command"),
//!     1 => println!("auto-execute {}", candidates[0].display_name),
//!     _ => println!("disambiguation menu with {} entries", candidates.len()),
//! }
//! # Ok::<(), filebind::config::SettingsError>(())
//! ```

pub mod config;
pub mod core;
pub mod exec;

// Re-export commonly used types for convenience
pub use crate::config::{CommandRegistry, FileSettingsStore, SettingsError, SettingsStore};
pub use crate::core::{
    Action, BuiltinCommand, CommandBinding, CommandCollection, DialogKind, KeyInput,
};
pub use crate::exec::{CommandEngine, ExecLog, ExecutionDispatcher, KeyDispatch, PathSeparator};
