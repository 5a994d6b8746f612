//! src/core/types.rs
//!
//! Core type definitions for the command-binding engine
//!
//! This module defines the fundamental types used throughout the application:
//! - `DialogKind`: Which (if any) modal input dialog precedes execution
//! - `BuiltinCommand`: The closed set of natively implemented operations
//! - `Action`: What a binding does (built-in operation or external script)
//! - `CommandBinding`: One user-configured key-to-action binding
//! - `CommandCollection`: The versioned envelope persisted to the settings store
//!
//! All types serialize to the stable wire format of `key_bind.json`; the
//! field and tag names below are load-bearing and must not change without a
//! schema migration (see `config::migrate`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which modal dialog is shown before a command executes.
///
/// `None` bypasses the dialog entirely; the other two kinds open a modal
/// session that collects free text (see `exec::dialog`).
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    /// Execute immediately with empty dialog input
    #[default]
    None,
    /// Single editable text area, starts empty
    MultiLine,
    /// Read-only pane seeded from the selection next to an editable copy
    ReferenceSelection,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogKind::None => write!(f, "none"),
            DialogKind::MultiLine => write!(f, "multi_line"),
            DialogKind::ReferenceSelection => write!(f, "reference_selection"),
        }
    }
}

/// Built-in operations implemented natively by the surrounding pane.
///
/// This is a closed set: adding an operation is a compile-time-checked
/// change (exhaustive matches in the dispatch layer), not a string compare.
/// The wire values are camelCase to match the persisted settings format.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuiltinCommand {
    AccessCurrentItem,
    AccessParentDir,
    MoveUp,
    MoveUpSelect,
    MoveDown,
    MoveDownSelect,
    MoveTop,
    MoveTopSelect,
    MoveBottom,
    MoveBottomSelect,
    SelectAll,
    ClearSelection,
    ToggleSelection,
    SelectCurrentOnly,
    AddNewTab,
    RemoveTab,
    ToPrevTab,
    ToNextTab,
    FocusAddressbar,
    FocusOppositePane,
}

impl fmt::Display for BuiltinCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltinCommand::AccessCurrentItem => "accessCurrentItem",
            BuiltinCommand::AccessParentDir => "accessParentDir",
            BuiltinCommand::MoveUp => "moveUp",
            BuiltinCommand::MoveUpSelect => "moveUpSelect",
            BuiltinCommand::MoveDown => "moveDown",
            BuiltinCommand::MoveDownSelect => "moveDownSelect",
            BuiltinCommand::MoveTop => "moveTop",
            BuiltinCommand::MoveTopSelect => "moveTopSelect",
            BuiltinCommand::MoveBottom => "moveBottom",
            BuiltinCommand::MoveBottomSelect => "moveBottomSelect",
            BuiltinCommand::SelectAll => "selectAll",
            BuiltinCommand::ClearSelection => "clearSelection",
            BuiltinCommand::ToggleSelection => "toggleSelection",
            BuiltinCommand::SelectCurrentOnly => "selectCurrentOnly",
            BuiltinCommand::AddNewTab => "addNewTab",
            BuiltinCommand::RemoveTab => "removeTab",
            BuiltinCommand::ToPrevTab => "toPrevTab",
            BuiltinCommand::ToNextTab => "toNextTab",
            BuiltinCommand::FocusAddressbar => "focusAddressbar",
            BuiltinCommand::FocusOppositePane => "focusOppositePane",
        };
        write!(f, "{}", name)
    }
}

/// What a binding does when it fires.
///
/// Serialized adjacently tagged so the wire shape is
/// `{ "type": "build_in", "command": "moveDown" }` or
/// `{ "type": "power_shell", "command": "commands/Copy here.ps1" }`.
///
/// For `PowerShell`, the payload is a settings-store key referencing the
/// script body (schema version 3). Collections older than version 3 carry
/// the script text inline in the same field; the externalize-scripts
/// migration rewrites it (see `config::migrate`). An empty reference is
/// legal and executes an empty script.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "command")]
pub enum Action {
    /// Fixed operation handled natively by the pane
    #[serde(rename = "build_in")]
    BuildIn(BuiltinCommand),
    /// Externally stored script body, templated with context at execution
    #[serde(rename = "power_shell")]
    PowerShell(String),
}

impl Action {
    /// Returns true for script-backed actions.
    pub fn is_shell(&self) -> bool {
        matches!(self, Action::PowerShell(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::BuildIn(op) => write!(f, "build_in: {}", op),
            Action::PowerShell(reference) => write!(f, "power_shell: {}", reference),
        }
    }
}

/// One user-configured binding of a key combination to an action.
///
/// `key` holds the canonical key-combination string (see `core::keyexpr`);
/// it may be empty, meaning the binding is unbound and never matches.
/// `valid_on_addressbar` controls whether the binding fires while a
/// text-entry field has focus. Both fields default when absent so that
/// version-1 settings files (which predate them) still deserialize.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CommandBinding {
    /// Human-readable label, shown in the disambiguation menu and logs
    #[serde(rename = "command_name")]
    pub display_name: String,

    /// Canonical key-combination string (e.g. "ctrl+shift+A"), possibly empty
    pub key: String,

    /// Whether this binding fires while the addressbar has focus
    #[serde(default)]
    pub valid_on_addressbar: bool,

    /// Which modal dialog (if any) collects input before execution
    #[serde(default)]
    pub dialog_type: DialogKind,

    /// What the binding executes
    pub action: Action,
}

impl fmt::Display for CommandBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.key.is_empty() { "(unbound)" } else { &self.key };
        write!(f, "{} = {} ({})", key, self.display_name, self.action)
    }
}

/// The versioned envelope persisted under the `key_bind.json` settings key.
///
/// `data` order is significant: it is both display order and the order in
/// which candidates are offered during disambiguation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CommandCollection {
    /// Schema version (see `config::migrate` for the version history)
    pub version: u32,

    /// Ordered binding definitions
    pub data: Vec<CommandBinding>,
}

impl CommandCollection {
    /// Creates a collection at the given schema version.
    pub fn new(version: u32, data: Vec<CommandBinding>) -> Self {
        Self { version, data }
    }
}
