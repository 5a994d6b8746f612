//! src/core/overlap.rs
//!
//! Shared-key indexing for disambiguation preview
//!
//! Multiple bindings on the same key combination are legal here: at runtime
//! they surface as a disambiguation menu rather than an error. This module
//! indexes bindings by their lower-cased key string so the CLI (and the
//! settings pane) can show which combinations will open a menu instead of
//! auto-executing.

use std::collections::HashMap;

use crate::core::types::CommandBinding;

/// Indexes bindings by key combination in O(1) per insertion.
///
/// Keys are compared the same way the matcher compares them: lower-cased
/// string equality. Unbound bindings (empty key) are not indexed.
pub struct OverlapIndex {
    bindings: HashMap<String, Vec<CommandBinding>>,
}

/// A key combination shared by two or more bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyOverlap {
    /// The shared key string, lower-cased
    pub key: String,

    /// All bindings on this combination, in insertion order (always 2+)
    pub bindings: Vec<CommandBinding>,
}

impl OverlapIndex {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Adds a binding to the index. Unbound bindings are ignored.
    pub fn add_binding(&mut self, binding: CommandBinding) {
        if binding.key.is_empty() {
            return;
        }
        self.bindings
            .entry(binding.key.to_lowercase())
            .or_default()
            .push(binding);
    }

    /// All key combinations bound 2+ times, sorted by key for stable output.
    pub fn find_overlaps(&self) -> Vec<KeyOverlap> {
        let mut overlaps: Vec<KeyOverlap> = self
            .bindings
            .iter()
            .filter(|(_, bindings)| bindings.len() > 1)
            .map(|(key, bindings)| KeyOverlap {
                key: key.clone(),
                bindings: bindings.clone(),
            })
            .collect();
        overlaps.sort_by(|a, b| a.key.cmp(&b.key));
        overlaps
    }

    /// True when the given key string is bound 2+ times.
    pub fn is_shared(&self, key: &str) -> bool {
        self.bindings
            .get(&key.to_lowercase())
            .map(|bindings| bindings.len() > 1)
            .unwrap_or(false)
    }

    /// Total number of indexed bindings.
    pub fn total_bindings(&self) -> usize {
        self.bindings.values().map(|v| v.len()).sum()
    }
}

impl Default for OverlapIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Action, BuiltinCommand, DialogKind};

    fn binding(name: &str, key: &str) -> CommandBinding {
        CommandBinding {
            display_name: name.to_string(),
            key: key.to_string(),
            valid_on_addressbar: false,
            dialog_type: DialogKind::None,
            action: Action::BuildIn(BuiltinCommand::SelectAll),
        }
    }

    #[test]
    fn test_empty_index_has_no_overlaps() {
        let index = OverlapIndex::new();
        assert!(index.find_overlaps().is_empty());
        assert_eq!(index.total_bindings(), 0);
    }

    #[test]
    fn test_unique_keys_do_not_overlap() {
        let mut index = OverlapIndex::new();
        index.add_binding(binding("a", "ctrl+A"));
        index.add_binding(binding("b", "ctrl+B"));

        assert!(index.find_overlaps().is_empty());
        assert_eq!(index.total_bindings(), 2);
    }

    #[test]
    fn test_detects_shared_key_case_insensitively() {
        let mut index = OverlapIndex::new();
        index.add_binding(binding("upper", "Ctrl+P"));
        index.add_binding(binding("lower", "ctrl+p"));

        let overlaps = index.find_overlaps();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].key, "ctrl+p");
        assert_eq!(overlaps[0].bindings.len(), 2);
        assert_eq!(overlaps[0].bindings[0].display_name, "upper");
        assert!(index.is_shared("CTRL+P"));
    }

    #[test]
    fn test_unbound_bindings_are_not_indexed() {
        let mut index = OverlapIndex::new();
        index.add_binding(binding("unbound-1", ""));
        index.add_binding(binding("unbound-2", ""));

        assert!(index.find_overlaps().is_empty());
        assert_eq!(index.total_bindings(), 0);
    }

    #[test]
    fn test_multiple_independent_overlaps_sorted() {
        let mut index = OverlapIndex::new();
        index.add_binding(binding("1", "ctrl+Z"));
        index.add_binding(binding("2", "ctrl+Z"));
        index.add_binding(binding("3", "ctrl+A"));
        index.add_binding(binding("4", "ctrl+A"));
        index.add_binding(binding("5", "F5"));

        let overlaps = index.find_overlaps();
        assert_eq!(overlaps.len(), 2);
        assert_eq!(overlaps[0].key, "ctrl+a");
        assert_eq!(overlaps[1].key, "ctrl+z");
        assert_eq!(index.total_bindings(), 5);
    }
}
