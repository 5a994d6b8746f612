//! src/exec/dialog.rs
//!
//! Modal dialog protocol: collect free text before a command executes
//!
//! A `DialogCoordinator` is a small owned state machine
//! (`Idle → Open → {Confirmed, Cancelled} → Idle`) scoped to one pane. At
//! most one session is live at a time; the engine ignores further matches
//! while a session is open. `DialogKind::None` commands never reach the
//! coordinator.
//!
//! Seeding rules on open:
//! - `reference_selection`: both the read-only reference pane and the
//!   editable pane start as the selected names, one per line. The panes do
//!   not re-sync after the initial seed.
//! - `multi_line`: both start empty; no reference pane is shown.

use thiserror::Error;

use crate::core::types::DialogKind;
use crate::exec::ExecutionContext;

/// A dialog session is already open; the new match is ignored.
#[derive(Debug, Error, PartialEq)]
#[error("A dialog session is already open")]
pub struct DialogBusy;

/// The live state of one modal session.
#[derive(Debug)]
pub struct DialogSession {
    /// Dialog title: the matched command's label
    pub title: String,
    /// Read-only pane content, seeded once from the selection
    pub reference_text: String,
    /// Editable pane content; becomes the dialog input on confirm
    pub editable_text: String,
    /// The invocation waiting on this session
    context: ExecutionContext,
}

impl DialogSession {
    /// Whether a read-only reference pane is rendered.
    pub fn shows_reference_pane(&self) -> bool {
        !self.reference_text.is_empty()
    }
}

/// Owned modal state machine for one pane.
#[derive(Debug, Default)]
pub struct DialogCoordinator {
    session: Option<DialogSession>,
}

impl DialogCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&DialogSession> {
        self.session.as_ref()
    }

    /// Opens a session for the given pending invocation.
    ///
    /// Seeds the panes according to the context's dialog kind. Fails with
    /// `DialogBusy` when a session is already open; the pending invocation
    /// is handed back to the caller untouched.
    pub fn open(&mut self, context: ExecutionContext) -> Result<&DialogSession, (DialogBusy, ExecutionContext)> {
        if self.session.is_some() {
            return Err((DialogBusy, context));
        }

        let seed = match context.dialog_kind {
            DialogKind::ReferenceSelection => context.selected_names.join("\n"),
            _ => String::new(),
        };

        let session = self.session.insert(DialogSession {
            title: context.command_label.clone(),
            reference_text: seed.clone(),
            editable_text: seed,
            context,
        });

        Ok(session)
    }

    /// Replaces the editable pane content. No-op while idle.
    pub fn edit(&mut self, text: &str) {
        if let Some(session) = &mut self.session {
            session.editable_text = text.to_string();
        }
    }

    /// Confirms the session: yields the pending invocation and the final
    /// editable text exactly once, returning the machine to idle.
    pub fn confirm(&mut self) -> Option<(ExecutionContext, String)> {
        self.session
            .take()
            .map(|session| (session.context, session.editable_text))
    }

    /// Cancels the session: the editable text is discarded and nothing
    /// executes.
    pub fn cancel(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::template::PathSeparator;

    fn context(kind: DialogKind, names: &[&str]) -> ExecutionContext {
        ExecutionContext {
            command_label: "Pack archive".to_string(),
            dialog_kind: kind,
            script_reference: "commands/Pack archive.ps1".to_string(),
            current_dir: "C:\\x".to_string(),
            selected_names: names.iter().map(|s| s.to_string()).collect(),
            opposite_dir: "C:\\y".to_string(),
            separator: PathSeparator::Backslash,
        }
    }

    #[test]
    fn test_reference_selection_seeds_both_panes() {
        let mut dialog = DialogCoordinator::new();
        let session = dialog
            .open(context(DialogKind::ReferenceSelection, &["a.txt", "b.txt"]))
            .unwrap();

        assert_eq!(session.title, "Pack archive");
        assert_eq!(session.reference_text, "a.txt\nb.txt");
        assert_eq!(session.editable_text, "a.txt\nb.txt");
        assert!(session.shows_reference_pane());
    }

    #[test]
    fn test_multi_line_starts_empty_without_reference_pane() {
        let mut dialog = DialogCoordinator::new();
        let session = dialog
            .open(context(DialogKind::MultiLine, &["a.txt"]))
            .unwrap();

        assert_eq!(session.reference_text, "");
        assert_eq!(session.editable_text, "");
        assert!(!session.shows_reference_pane());
    }

    #[test]
    fn test_editing_does_not_resync_reference_pane() {
        let mut dialog = DialogCoordinator::new();
        dialog
            .open(context(DialogKind::ReferenceSelection, &["a.txt"]))
            .unwrap();

        dialog.edit("renamed.txt");

        let session = dialog.session().unwrap();
        assert_eq!(session.reference_text, "a.txt");
        assert_eq!(session.editable_text, "renamed.txt");
    }

    #[test]
    fn test_confirm_yields_final_text_exactly_once() {
        let mut dialog = DialogCoordinator::new();
        dialog
            .open(context(DialogKind::MultiLine, &[]))
            .unwrap();
        dialog.edit("new-name.txt");

        let (ctx, text) = dialog.confirm().unwrap();
        assert_eq!(text, "new-name.txt");
        assert_eq!(ctx.command_label, "Pack archive");

        assert!(!dialog.is_open());
        assert!(dialog.confirm().is_none());
    }

    #[test]
    fn test_cancel_discards_everything() {
        let mut dialog = DialogCoordinator::new();
        dialog
            .open(context(DialogKind::MultiLine, &[]))
            .unwrap();
        dialog.edit("should be discarded");

        dialog.cancel();

        assert!(!dialog.is_open());
        assert!(dialog.confirm().is_none());
    }

    #[test]
    fn test_second_open_is_busy_and_returns_the_context() {
        let mut dialog = DialogCoordinator::new();
        dialog
            .open(context(DialogKind::ReferenceSelection, &["a.txt"]))
            .unwrap();

        let err = dialog.open(context(DialogKind::MultiLine, &[])).err().unwrap();
        assert_eq!(err.0, DialogBusy);
        assert_eq!(err.1.dialog_kind, DialogKind::MultiLine);

        // The live session is untouched
        assert_eq!(dialog.session().unwrap().reference_text, "a.txt");
    }

    #[test]
    fn test_edit_while_idle_is_a_no_op() {
        let mut dialog = DialogCoordinator::new();
        dialog.edit("nowhere to go");
        assert!(!dialog.is_open());
    }
}
