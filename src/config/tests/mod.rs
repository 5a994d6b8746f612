//! Config module tests
//!
//! Integration suites for the settings layer:
//! - Registry load / migrate / persist behavior

#[cfg(test)]
mod registry_tests;
