//! Core module tests
//!
//! Cross-module suites that exercise key matching and resolution together:
//! - Resolution scenarios (focus filtering + canonical matching + ordering)
