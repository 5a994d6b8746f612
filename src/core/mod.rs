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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the fundamental data structures and algorithms
//! for command-binding management, including:
//! - Type definitions for bindings, actions and the versioned collection
//! - Canonical key-combination matching and key-expression parsing
//! - Command resolution with focus-context filtering
//! - Shared-key indexing for disambiguation preview
//! - Pre-save binding validation
//!
//! All business logic is isolated from I/O and execution concerns to
//! enable unit testing without a settings directory or an interpreter.

pub mod keyexpr;
pub mod overlap;
pub mod resolver;
pub mod types;
pub mod validator;

pub use keyexpr::{parse_key_expr, KeyChord, KeyExprError, KeyInput};
pub use overlap::{KeyOverlap, OverlapIndex};
pub use resolver::InputFocus;
pub use types::*;
pub use validator::{validate_binding, ValidationError};

#[cfg(test)]
mod tests;
