//! Exec module tests
//!
//! End-to-end dispatch suites: key event → engine → dialog → templated
//! submission → result event.

#[cfg(test)]
mod engine_tests;
