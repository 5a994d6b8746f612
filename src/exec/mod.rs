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

//! Command dispatch: from a matched binding to a running process
//!
//! `CommandEngine` glues the pieces together for one pane:
//! resolve the key event against the registry, apply the dispatch policy
//! (auto-execute / disambiguation menu / fall through), optionally open the
//! modal dialog, template the script, and submit it to the execution
//! worker. Built-in actions skip all of that and go straight to the
//! `BuiltinHandler` collaborator.
//!
//! Within one invocation the ordering is strict: script-body resolution
//! completes before templating, templating before submission. Across
//! invocations there is no ordering guarantee.

use thiserror::Error;
use tracing::debug;

use crate::config::{CommandRegistry, SettingsError, SettingsStore};
use crate::core::keyexpr::KeyInput;
use crate::core::resolver::{self, InputFocus};
use crate::core::types::{Action, BuiltinCommand, CommandBinding, DialogKind};

pub mod dialog;
pub mod dispatcher;
pub mod template;

pub use dialog::{DialogCoordinator, DialogSession};
pub use dispatcher::{ExecLog, ExecutionDispatcher, ShellInterpreter};
pub use template::PathSeparator;

/// Errors that can occur while dispatching a matched command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The shell script body could not be resolved; nothing was submitted.
    #[error("Script body not found under settings key '{0}'")]
    ScriptMissing(String),
    /// Settings store failure while resolving the script body.
    #[error(transparent)]
    Store(#[from] SettingsError),
}

/// Snapshot of the pane supplying an invocation's context.
///
/// Assembled by the caller from the selection and companion-pane queries.
#[derive(Clone, Debug)]
pub struct PaneState {
    pub current_dir: String,
    pub opposite_dir: String,
    /// Selected entry names in selection order, no duplicates
    pub selected_names: Vec<String>,
    pub separator: PathSeparator,
}

/// Everything one shell invocation needs, frozen at match time.
///
/// Transient: built per invocation, discarded once execution is submitted
/// (or the dialog is cancelled). Never persisted.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    pub command_label: String,
    pub dialog_kind: DialogKind,
    pub script_reference: String,
    pub current_dir: String,
    pub selected_names: Vec<String>,
    pub opposite_dir: String,
    pub separator: PathSeparator,
}

impl ExecutionContext {
    /// Freezes a pane snapshot into the context for one invocation.
    pub fn for_binding(binding: &CommandBinding, script_reference: &str, pane: &PaneState) -> Self {
        Self {
            command_label: binding.display_name.clone(),
            dialog_kind: binding.dialog_type,
            script_reference: script_reference.to_string(),
            current_dir: pane.current_dir.clone(),
            selected_names: pane.selected_names.clone(),
            opposite_dir: pane.opposite_dir.clone(),
            separator: pane.separator,
        }
    }
}

/// The external operation-handling collaborator for built-in actions.
pub trait BuiltinHandler {
    fn dispatch(&mut self, op: BuiltinCommand);
}

/// What happened to a key event.
#[derive(Debug)]
pub enum KeyDispatch {
    /// No binding matched and the event is not search-eligible
    NoMatch,
    /// No binding matched; offer this character to incremental search
    Search(char),
    /// Exactly one binding matched and was executed (or submitted)
    Executed,
    /// Exactly one binding matched and its dialog is now open
    DialogOpened,
    /// Two or more bindings matched; present them in this order
    Menu(Vec<CommandBinding>),
    /// A dialog session is open; the event was ignored
    Busy,
}

impl KeyDispatch {
    /// Whether the caller should suppress the platform's default handling.
    pub fn suppresses_default(&self) -> bool {
        !matches!(self, KeyDispatch::NoMatch | KeyDispatch::Search(_))
    }
}

/// Resolves a script reference to its body text.
///
/// An empty reference is legal and yields an empty script; a dangling one
/// aborts the invocation before anything is spawned.
pub fn resolve_script_body(
    store: &dyn SettingsStore,
    reference: &str,
) -> Result<String, DispatchError> {
    if reference.is_empty() {
        return Ok(String::new());
    }
    store
        .read(reference)?
        .ok_or_else(|| DispatchError::ScriptMissing(reference.to_string()))
}

/// Per-pane dispatch flow: resolver → dialog → templater → dispatcher.
pub struct CommandEngine<H: BuiltinHandler> {
    builtins: H,
    dialog: DialogCoordinator,
    dispatcher: ExecutionDispatcher,
}

impl<H: BuiltinHandler> CommandEngine<H> {
    pub fn new(builtins: H, dispatcher: ExecutionDispatcher) -> Self {
        Self {
            builtins,
            dialog: DialogCoordinator::new(),
            dispatcher,
        }
    }

    /// The dialog state machine, for rendering and editing the open session.
    pub fn dialog(&self) -> &DialogCoordinator {
        &self.dialog
    }

    /// The built-in operation collaborator.
    pub fn builtins(&self) -> &H {
        &self.builtins
    }

    /// Replaces the open dialog's editable text.
    pub fn edit_dialog_text(&mut self, text: &str) {
        self.dialog.edit(text);
    }

    /// Applies the dispatch policy to one keyboard event.
    ///
    /// Zero candidates → `NoMatch` or `Search`; one → executed immediately
    /// (possibly via its dialog); two or more → `Menu` in registry order,
    /// from which the caller feeds the picked binding back into
    /// [`execute`](Self::execute). While a dialog session is open every
    /// event is ignored (`Busy`).
    pub fn handle_key(
        &mut self,
        registry: &CommandRegistry,
        store: &dyn SettingsStore,
        input: &KeyInput,
        focus: InputFocus,
        pane: &PaneState,
    ) -> Result<KeyDispatch, DispatchError> {
        if self.dialog.is_open() {
            debug!(key = %input.canonical(), "dialog session open, ignoring key event");
            return Ok(KeyDispatch::Busy);
        }

        let candidates = resolver::resolve(registry.bindings(), input, focus);

        if candidates.is_empty() {
            return Ok(match resolver::search_fallback(input, focus) {
                Some(c) => KeyDispatch::Search(c),
                None => KeyDispatch::NoMatch,
            });
        }

        if candidates.len() >= 2 {
            debug!(
                key = %input.canonical(),
                count = candidates.len(),
                "multiple bindings matched, requesting disambiguation"
            );
            return Ok(KeyDispatch::Menu(
                candidates.into_iter().cloned().collect(),
            ));
        }

        let binding = candidates[0].clone();
        self.execute(&binding, store, pane)
    }

    /// Executes one binding (the auto-exec path and the menu-selection path).
    pub fn execute(
        &mut self,
        binding: &CommandBinding,
        store: &dyn SettingsStore,
        pane: &PaneState,
    ) -> Result<KeyDispatch, DispatchError> {
        match &binding.action {
            Action::BuildIn(op) => {
                debug!(op = %op, "dispatching built-in operation");
                self.builtins.dispatch(*op);
                Ok(KeyDispatch::Executed)
            }
            Action::PowerShell(reference) => {
                let context = ExecutionContext::for_binding(binding, reference, pane);

                if binding.dialog_type == DialogKind::None {
                    self.run_shell(store, context, "")?;
                    return Ok(KeyDispatch::Executed);
                }

                match self.dialog.open(context) {
                    Ok(_) => Ok(KeyDispatch::DialogOpened),
                    Err(_) => Ok(KeyDispatch::Busy),
                }
            }
        }
    }

    /// Confirms the open dialog; returns whether an execution was submitted.
    pub fn confirm_dialog(&mut self, store: &dyn SettingsStore) -> Result<bool, DispatchError> {
        match self.dialog.confirm() {
            Some((context, dialog_input)) => {
                self.run_shell(store, context, &dialog_input)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Cancels the open dialog; nothing executes.
    pub fn cancel_dialog(&mut self) {
        self.dialog.cancel();
    }

    /// Resolve → template → submit, in that order, for one invocation.
    fn run_shell(
        &mut self,
        store: &dyn SettingsStore,
        context: ExecutionContext,
        dialog_input: &str,
    ) -> Result<(), DispatchError> {
        let body = resolve_script_body(store, &context.script_reference)?;
        let script = template::build_script(&body, &context, dialog_input);
        let working_dir = template::apply_separator(&context.current_dir, context.separator);
        self.dispatcher
            .submit(&script, &working_dir, &context.command_label);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
