use super::super::*;
use std::fs;
use tempfile::TempDir;

use crate::config::migrate::LATEST;
use crate::core::types::{Action, BuiltinCommand, CommandBinding, CommandCollection, DialogKind};

/// Helper: opens a file store rooted in a fresh temp directory.
fn open_store() -> (TempDir, FileSettingsStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSettingsStore::open(temp_dir.path().join("filebind")).unwrap();
    (temp_dir, store)
}

/// A version-1 settings file: no addressbar flag, inline script text.
const V1_SETTINGS: &str = r#"{
  "version": 1,
  "data": [
    {
      "command_name": "Copy to opposite",
      "key": "F5",
      "action": { "type": "power_shell", "command": "Copy-Item $selecting_item_path_ary $opposite_dir" }
    },
    {
      "command_name": "Open",
      "key": "Enter",
      "action": { "type": "build_in", "command": "accessCurrentItem" }
    }
  ]
}"#;

#[test]
fn test_missing_settings_yield_defaults_without_write_back() {
    let mut store = MemorySettingsStore::new();

    let registry = CommandRegistry::load(&mut store).unwrap();

    assert!(!registry.bindings().is_empty());
    assert_eq!(store.write_count(), 0);
    assert!(store.read(COMMANDS_SETTING_KEY).unwrap().is_none());
}

#[test]
fn test_blank_settings_yield_defaults() {
    let mut store = MemorySettingsStore::new();
    store.seed(COMMANDS_SETTING_KEY, "  \n");

    let registry = CommandRegistry::load(&mut store).unwrap();

    assert!(!registry.bindings().is_empty());
    assert_eq!(store.write_count(), 0);
}

#[test]
fn test_version_too_new_yields_empty_collection_without_write_back() {
    let mut store = MemorySettingsStore::new();
    let future = format!(r#"{{ "version": {}, "data": [] }}"#, LATEST + 1);
    store.seed(COMMANDS_SETTING_KEY, &future);

    let registry = CommandRegistry::load(&mut store).unwrap();

    assert!(registry.bindings().is_empty());
    // The newer file must survive untouched
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.read(COMMANDS_SETTING_KEY).unwrap().as_deref(), Some(future.as_str()));
}

#[test]
fn test_malformed_settings_are_an_explicit_error() {
    let mut store = MemorySettingsStore::new();
    store.seed(COMMANDS_SETTING_KEY, r#"{ "version": "three", "data": 7 }"#);

    assert!(matches!(
        CommandRegistry::load(&mut store),
        Err(SettingsError::Malformed(_))
    ));
}

#[test]
fn test_v1_load_migrates_and_persists_once() {
    let mut store = MemorySettingsStore::new();
    store.seed(COMMANDS_SETTING_KEY, V1_SETTINGS);

    let registry = CommandRegistry::load(&mut store).unwrap();

    // The in-memory collection is fully migrated
    assert_eq!(registry.bindings().len(), 2);
    assert!(!registry.bindings()[0].valid_on_addressbar);
    assert_eq!(
        registry.bindings()[0].action,
        Action::PowerShell("commands/Copy to opposite.ps1".to_string())
    );

    // Script body and upgraded envelope are both on disk
    assert_eq!(
        store.read("commands/Copy to opposite.ps1").unwrap().as_deref(),
        Some("Copy-Item $selecting_item_path_ary $opposite_dir")
    );
    let persisted: CommandCollection =
        serde_json::from_str(&store.read(COMMANDS_SETTING_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted.version, LATEST);

    // A second load runs zero migrations and performs zero writes
    let writes_after_first = store.write_count();
    let registry_again = CommandRegistry::load(&mut store).unwrap();
    assert_eq!(registry_again.bindings(), registry.bindings());
    assert_eq!(store.write_count(), writes_after_first);
}

#[test]
fn test_v1_load_migrates_through_file_store() {
    let (_temp_dir, mut store) = open_store();
    store.write(COMMANDS_SETTING_KEY, V1_SETTINGS).unwrap();

    let registry = CommandRegistry::load(&mut store).unwrap();

    assert_eq!(registry.bindings().len(), 2);
    assert!(store.root().join("commands").join("Copy to opposite.ps1").exists());

    let persisted =
        fs::read_to_string(store.root().join(COMMANDS_SETTING_KEY)).unwrap();
    let parsed: CommandCollection = serde_json::from_str(&persisted).unwrap();
    assert_eq!(parsed.version, LATEST);
}

#[test]
fn test_edit_flow_round_trip() {
    let mut store = MemorySettingsStore::new();
    let mut registry = CommandRegistry::from_collection(CommandCollection::new(LATEST, vec![]));

    registry.add(CommandBinding {
        display_name: "Pack archive".to_string(),
        key: "ctrl+P".to_string(),
        valid_on_addressbar: false,
        dialog_type: DialogKind::ReferenceSelection,
        action: Action::PowerShell("commands/Pack archive.ps1".to_string()),
    });
    registry.add(CommandBinding {
        display_name: "Open".to_string(),
        key: "Enter".to_string(),
        valid_on_addressbar: false,
        dialog_type: DialogKind::None,
        action: Action::BuildIn(BuiltinCommand::AccessCurrentItem),
    });
    registry.save(&mut store).unwrap();

    let reloaded = CommandRegistry::load(&mut store).unwrap();
    assert_eq!(reloaded.bindings(), registry.bindings());

    // Remove the first binding, save, reload
    let mut registry = reloaded;
    let removed = registry.remove(0).unwrap();
    assert_eq!(removed.display_name, "Pack archive");
    registry.save(&mut store).unwrap();

    let reloaded = CommandRegistry::load(&mut store).unwrap();
    assert_eq!(reloaded.bindings().len(), 1);
    assert_eq!(reloaded.bindings()[0].display_name, "Open");
}

#[test]
fn test_save_rejects_unnamed_binding() {
    let mut store = MemorySettingsStore::new();
    let mut registry = CommandRegistry::from_collection(CommandCollection::new(LATEST, vec![]));

    registry.add(CommandBinding {
        display_name: String::new(),
        key: "F7".to_string(),
        valid_on_addressbar: false,
        dialog_type: DialogKind::None,
        action: Action::PowerShell(String::new()),
    });

    assert!(matches!(
        registry.save(&mut store),
        Err(SettingsError::Validation(_))
    ));
    assert_eq!(store.write_count(), 0);
}

#[test]
fn test_save_always_tags_latest_version() {
    let mut store = MemorySettingsStore::new();
    // A collection whose in-memory version lags behind (edit flow on a
    // collection constructed elsewhere)
    let mut registry = CommandRegistry::from_collection(CommandCollection::new(
        1,
        vec![CommandBinding {
            display_name: "Open".to_string(),
            key: "Enter".to_string(),
            valid_on_addressbar: false,
            dialog_type: DialogKind::None,
            action: Action::BuildIn(BuiltinCommand::AccessCurrentItem),
        }],
    ));
    registry.save(&mut store).unwrap();

    let persisted: CommandCollection =
        serde_json::from_str(&store.read(COMMANDS_SETTING_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted.version, LATEST);
}

#[test]
fn test_replace_and_index_bounds() {
    let mut registry = CommandRegistry::from_collection(CommandCollection::new(LATEST, vec![]));
    assert!(matches!(
        registry.remove(0),
        Err(SettingsError::IndexOutOfRange(0))
    ));

    registry.add(CommandBinding {
        display_name: "Open".to_string(),
        key: "Enter".to_string(),
        valid_on_addressbar: false,
        dialog_type: DialogKind::None,
        action: Action::BuildIn(BuiltinCommand::AccessCurrentItem),
    });

    let replacement = CommandBinding {
        display_name: "Open item".to_string(),
        key: "Enter".to_string(),
        valid_on_addressbar: true,
        dialog_type: DialogKind::None,
        action: Action::BuildIn(BuiltinCommand::AccessCurrentItem),
    };
    registry.replace(0, replacement.clone()).unwrap();
    assert_eq!(registry.bindings()[0], replacement);

    assert!(matches!(
        registry.replace(5, replacement),
        Err(SettingsError::IndexOutOfRange(5))
    ));
}

#[test]
fn test_filter_preserves_order() {
    let mut store = MemorySettingsStore::new();
    store.seed(COMMANDS_SETTING_KEY, V1_SETTINGS);
    let registry = CommandRegistry::load(&mut store).unwrap();

    let shells = registry.filter(|b| b.action.is_shell());
    assert_eq!(shells.len(), 1);
    assert_eq!(shells[0].display_name, "Copy to opposite");
}
