//! src/core/resolver.rs
//!
//! Command resolution: from a keyboard event to candidate bindings
//!
//! Resolution is a pure function over the registry's ordered binding list:
//! filter by focus context, then by canonical key match, preserving registry
//! order. The dispatch policy over the candidate list (auto-execute /
//! disambiguation menu / fall through to incremental search) is owned by
//! `exec::CommandEngine`; the types for it live here so the policy is
//! expressible without the execution machinery.

use crate::core::keyexpr::KeyInput;
use crate::core::types::CommandBinding;

/// Where keyboard focus currently is, as reported by the surrounding UI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputFocus {
    /// The file-list pane: every binding is applicable
    PaneList,
    /// A text-entry field: only `valid_on_addressbar` bindings fire
    Addressbar,
}

/// Returns the bindings matching `input` in the given focus context.
///
/// Candidates come back in registry order; the first element is the
/// auto-execute candidate when the list has exactly one entry.
pub fn resolve<'a>(
    bindings: &'a [CommandBinding],
    input: &KeyInput,
    focus: InputFocus,
) -> Vec<&'a CommandBinding> {
    bindings
        .iter()
        .filter(|binding| match focus {
            InputFocus::Addressbar => binding.valid_on_addressbar,
            InputFocus::PaneList => true,
        })
        .filter(|binding| input.matches(&binding.key))
        .collect()
}

/// True when the event's default platform handling should be suppressed.
///
/// The contract is: any non-empty candidate set claims the event.
pub fn claims_event(candidates: &[&CommandBinding]) -> bool {
    !candidates.is_empty()
}

/// The character to offer to the incremental-search collaborator, if any.
///
/// Only unmatched, modifier-free single printable characters qualify, and
/// only while the list pane has focus; the addressbar consumes its own
/// typing.
pub fn search_fallback(input: &KeyInput, focus: InputFocus) -> Option<char> {
    match focus {
        InputFocus::PaneList => input.printable_char(),
        InputFocus::Addressbar => None,
    }
}
