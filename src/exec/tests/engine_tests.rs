use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use crate::config::{migrate, CommandRegistry, MemorySettingsStore};
use crate::core::keyexpr::KeyInput;
use crate::core::resolver::InputFocus;
use crate::core::types::{
    Action, BuiltinCommand, CommandBinding, CommandCollection, DialogKind,
};
use crate::exec::{
    BuiltinHandler, CommandEngine, DispatchError, ExecLog, ExecutionDispatcher, KeyDispatch,
    PaneState, ShellInterpreter,
};

const RESULT_WAIT: Duration = Duration::from_secs(10);
const NO_RESULT_WAIT: Duration = Duration::from_millis(300);

/// Records dispatched built-in operations instead of performing them.
#[derive(Default)]
struct RecordingBuiltins {
    ops: Vec<BuiltinCommand>,
}

impl BuiltinHandler for RecordingBuiltins {
    fn dispatch(&mut self, op: BuiltinCommand) {
        self.ops.push(op);
    }
}

fn binding(
    name: &str,
    key: &str,
    dialog: DialogKind,
    action: Action,
) -> CommandBinding {
    CommandBinding {
        display_name: name.to_string(),
        key: key.to_string(),
        valid_on_addressbar: false,
        dialog_type: dialog,
        action,
    }
}

fn shell_ref(name: &str) -> String {
    format!("commands/{}.ps1", name)
}

/// Registry + store fixture covering every dispatch shape.
fn fixture() -> (CommandRegistry, MemorySettingsStore) {
    let mut store = MemorySettingsStore::new();
    store.seed(&shell_ref("Pack"), "Compress-Archive $selecting_item_path_ary pack.zip");
    store.seed(&shell_ref("Rename many"), "Rename-Item $dialog_input_str_ary");
    store.seed(&shell_ref("Also ctrl p"), "Write-Output also");

    let registry = CommandRegistry::from_collection(CommandCollection::new(
        migrate::LATEST,
        vec![
            binding(
                "Rename",
                "F2",
                DialogKind::None,
                Action::BuildIn(BuiltinCommand::SelectCurrentOnly),
            ),
            binding(
                "Pack",
                "ctrl+P",
                DialogKind::None,
                Action::PowerShell(shell_ref("Pack")),
            ),
            binding(
                "Also ctrl p",
                "ctrl+P",
                DialogKind::None,
                Action::PowerShell(shell_ref("Also ctrl p")),
            ),
            binding(
                "Rename many",
                "ctrl+R",
                DialogKind::ReferenceSelection,
                Action::PowerShell(shell_ref("Rename many")),
            ),
            binding(
                "Empty script",
                "F9",
                DialogKind::None,
                Action::PowerShell(String::new()),
            ),
            binding(
                "Dangling",
                "F10",
                DialogKind::None,
                Action::PowerShell("commands/Missing.ps1".to_string()),
            ),
        ],
    ));

    (registry, store)
}

fn engine() -> (CommandEngine<RecordingBuiltins>, Receiver<ExecLog>) {
    let (events_tx, events_rx) = channel();
    let dispatcher = ExecutionDispatcher::spawn(ShellInterpreter::new("sh", "-c"), events_tx);
    (
        CommandEngine::new(RecordingBuiltins::default(), dispatcher),
        events_rx,
    )
}

fn pane() -> PaneState {
    PaneState {
        current_dir: "/tmp".to_string(),
        opposite_dir: "/var".to_string(),
        selected_names: vec!["a.txt".to_string(), "b txt".to_string()],
        separator: crate::exec::PathSeparator::Slash,
    }
}

fn press(key: &str, ctrl: bool) -> KeyInput {
    KeyInput::new(ctrl, false, false, key)
}

#[test]
fn test_builtin_auto_exec_skips_templating() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    let dispatch = engine
        .handle_key(&registry, &store, &press("F2", false), InputFocus::PaneList, &pane())
        .unwrap();

    assert!(matches!(dispatch, KeyDispatch::Executed));
    assert!(dispatch.suppresses_default());
    // The builtin collaborator got the operation; nothing hit the interpreter
    assert!(events_rx.recv_timeout(NO_RESULT_WAIT).is_err());
}

#[test]
fn test_builtin_operations_reach_handler_in_order() {
    let (registry, store) = fixture();
    let (mut engine, _events_rx) = engine();

    engine
        .handle_key(&registry, &store, &press("F2", false), InputFocus::PaneList, &pane())
        .unwrap();

    let up = binding(
        "Up",
        "ArrowUp",
        DialogKind::None,
        Action::BuildIn(BuiltinCommand::MoveUp),
    );
    engine.execute(&up, &store, &pane()).unwrap();

    assert_eq!(
        engine.builtins().ops,
        vec![BuiltinCommand::SelectCurrentOnly, BuiltinCommand::MoveUp]
    );
}

#[test]
fn test_shared_key_triggers_menu_not_auto_exec() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    let dispatch = engine
        .handle_key(&registry, &store, &press("p", true), InputFocus::PaneList, &pane())
        .unwrap();

    match dispatch {
        KeyDispatch::Menu(candidates) => {
            assert_eq!(candidates.len(), 2);
            assert_eq!(candidates[0].display_name, "Pack");
            assert_eq!(candidates[1].display_name, "Also ctrl p");
        }
        other => panic!("expected Menu, got {:?}", other),
    }
    // Presenting a menu executes nothing
    assert!(events_rx.recv_timeout(NO_RESULT_WAIT).is_err());
}

#[test]
fn test_menu_selection_executes_chosen_binding() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    let dispatch = engine
        .handle_key(&registry, &store, &press("p", true), InputFocus::PaneList, &pane())
        .unwrap();
    let candidates = match dispatch {
        KeyDispatch::Menu(candidates) => candidates,
        other => panic!("expected Menu, got {:?}", other),
    };

    engine.execute(&candidates[1], &store, &pane()).unwrap();

    let log = events_rx.recv_timeout(RESULT_WAIT).unwrap();
    assert_eq!(log.title, "Also ctrl p");
    assert!(log.command.ends_with("Write-Output also"));
}

#[test]
fn test_shell_submission_carries_preamble_and_body() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    // "Pack"/"Also ctrl p" share ctrl+P, so drive Pack via execute directly
    let pack = registry.bindings()[1].clone();
    let dispatch = engine.execute(&pack, &store, &pane()).unwrap();
    assert!(matches!(dispatch, KeyDispatch::Executed));

    let log = events_rx.recv_timeout(RESULT_WAIT).unwrap();
    let lines: Vec<&str> = log.command.lines().collect();
    assert_eq!(lines[0], r#"$selecting_item_path_ary = @("/tmp/a.txt","/tmp/b txt");"#);
    assert_eq!(lines[1], r#"$selecting_item_name_ary = @("a.txt","b txt");"#);
    assert_eq!(lines[2], r#"$current_dir = "/tmp";"#);
    assert_eq!(lines[3], r#"$opposite_dir = "/var";"#);
    assert_eq!(lines[4], r#"$dialog_input_str_ary = @("");"#);
    assert_eq!(lines[5], "Compress-Archive $selecting_item_path_ary pack.zip");
}

#[test]
fn test_dialog_flow_confirm_executes_exactly_once() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    let dispatch = engine
        .handle_key(&registry, &store, &press("r", true), InputFocus::PaneList, &pane())
        .unwrap();
    assert!(matches!(dispatch, KeyDispatch::DialogOpened));

    // Reference pane seeded from the selection, one name per line
    let session = engine.dialog().session().unwrap();
    assert_eq!(session.title, "Rename many");
    assert_eq!(session.reference_text, "a.txt\nb txt");
    assert_eq!(session.editable_text, "a.txt\nb txt");

    engine.edit_dialog_text("renamed-a.txt\nrenamed-b.txt");
    assert!(engine.confirm_dialog(&store).unwrap());

    let log = events_rx.recv_timeout(RESULT_WAIT).unwrap();
    assert!(log
        .command
        .contains(r#"$dialog_input_str_ary = @("renamed-a.txt","renamed-b.txt");"#));

    // Confirming again does nothing: the session is gone
    assert!(!engine.confirm_dialog(&store).unwrap());
    assert!(events_rx.recv_timeout(NO_RESULT_WAIT).is_err());
}

#[test]
fn test_dialog_cancel_never_executes() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    engine
        .handle_key(&registry, &store, &press("r", true), InputFocus::PaneList, &pane())
        .unwrap();
    engine.edit_dialog_text("this text is discarded");
    engine.cancel_dialog();

    assert!(!engine.dialog().is_open());
    assert!(!engine.confirm_dialog(&store).unwrap());
    assert!(events_rx.recv_timeout(NO_RESULT_WAIT).is_err());
}

#[test]
fn test_key_events_are_ignored_while_dialog_is_open() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    engine
        .handle_key(&registry, &store, &press("r", true), InputFocus::PaneList, &pane())
        .unwrap();

    // A second match arrives while the session is open
    let dispatch = engine
        .handle_key(&registry, &store, &press("F2", false), InputFocus::PaneList, &pane())
        .unwrap();
    assert!(matches!(dispatch, KeyDispatch::Busy));

    // The live session is untouched and still confirmable
    assert_eq!(engine.dialog().session().unwrap().title, "Rename many");
    assert!(engine.confirm_dialog(&store).unwrap());
    assert!(events_rx.recv_timeout(RESULT_WAIT).is_ok());
}

#[test]
fn test_empty_script_reference_executes_empty_body() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    let dispatch = engine
        .handle_key(&registry, &store, &press("F9", false), InputFocus::PaneList, &pane())
        .unwrap();
    assert!(matches!(dispatch, KeyDispatch::Executed));

    let log = events_rx.recv_timeout(RESULT_WAIT).unwrap();
    assert!(log.command.ends_with("$dialog_input_str_ary = @(\"\");\n"));
}

#[test]
fn test_dangling_script_reference_aborts_before_submission() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    let result =
        engine.handle_key(&registry, &store, &press("F10", false), InputFocus::PaneList, &pane());

    match result {
        Err(DispatchError::ScriptMissing(reference)) => {
            assert_eq!(reference, "commands/Missing.ps1");
        }
        other => panic!("expected ScriptMissing, got {:?}", other),
    }
    assert!(events_rx.recv_timeout(NO_RESULT_WAIT).is_err());
}

#[test]
fn test_unmatched_events_fall_through() {
    let (registry, store) = fixture();
    let (mut engine, _events_rx) = engine();

    let dispatch = engine
        .handle_key(&registry, &store, &press("z", false), InputFocus::PaneList, &pane())
        .unwrap();
    assert!(matches!(dispatch, KeyDispatch::Search('z')));
    assert!(!dispatch.suppresses_default());

    let dispatch = engine
        .handle_key(&registry, &store, &press("z", true), InputFocus::PaneList, &pane())
        .unwrap();
    assert!(matches!(dispatch, KeyDispatch::NoMatch));
    assert!(!dispatch.suppresses_default());
}

#[test]
fn test_addressbar_focus_filters_candidates() {
    let (registry, store) = fixture();
    let (mut engine, events_rx) = engine();

    // None of the fixture bindings are valid on the addressbar
    let dispatch = engine
        .handle_key(&registry, &store, &press("F2", false), InputFocus::Addressbar, &pane())
        .unwrap();
    assert!(matches!(dispatch, KeyDispatch::NoMatch));
    assert!(events_rx.recv_timeout(NO_RESULT_WAIT).is_err());
}
