//! Built-in default command collection
//!
//! Synthesized when no command settings exist yet (fresh profile, or the
//! settings file is blank). Defaults are never written back automatically;
//! they persist the first time the user saves from the settings pane.

use crate::config::migrate;
use crate::core::types::{
    Action, BuiltinCommand, CommandBinding, CommandCollection, DialogKind,
};

fn builtin(name: &str, key: &str, op: BuiltinCommand) -> CommandBinding {
    CommandBinding {
        display_name: name.to_string(),
        key: key.to_string(),
        valid_on_addressbar: false,
        dialog_type: DialogKind::None,
        action: Action::BuildIn(op),
    }
}

/// The starter binding set for a fresh profile.
///
/// Covers list navigation, selection, tab control and pane switching with
/// conventional file-manager keys. All defaults are built-in actions; shell
/// commands are a user-authored concern.
pub fn default_collection() -> CommandCollection {
    CommandCollection::new(
        migrate::LATEST,
        vec![
            builtin("Open", "Enter", BuiltinCommand::AccessCurrentItem),
            builtin("Go to parent", "Backspace", BuiltinCommand::AccessParentDir),
            builtin("Cursor up", "ArrowUp", BuiltinCommand::MoveUp),
            builtin("Extend selection up", "shift+ArrowUp", BuiltinCommand::MoveUpSelect),
            builtin("Cursor down", "ArrowDown", BuiltinCommand::MoveDown),
            builtin("Extend selection down", "shift+ArrowDown", BuiltinCommand::MoveDownSelect),
            builtin("Jump to top", "Home", BuiltinCommand::MoveTop),
            builtin("Extend selection to top", "shift+Home", BuiltinCommand::MoveTopSelect),
            builtin("Jump to bottom", "End", BuiltinCommand::MoveBottom),
            builtin("Extend selection to bottom", "shift+End", BuiltinCommand::MoveBottomSelect),
            builtin("Select all", "ctrl+A", BuiltinCommand::SelectAll),
            builtin("Clear selection", "Escape", BuiltinCommand::ClearSelection),
            builtin("Toggle selection", "Space", BuiltinCommand::ToggleSelection),
            builtin("New tab", "ctrl+T", BuiltinCommand::AddNewTab),
            builtin("Close tab", "ctrl+W", BuiltinCommand::RemoveTab),
            builtin("Previous tab", "ctrl+shift+Tab", BuiltinCommand::ToPrevTab),
            builtin("Next tab", "ctrl+Tab", BuiltinCommand::ToNextTab),
            builtin("Focus addressbar", "ctrl+L", BuiltinCommand::FocusAddressbar),
            builtin("Focus opposite pane", "Tab", BuiltinCommand::FocusOppositePane),
        ],
    )
}
