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

//! src/core/validator.rs
//!
//! Binding validation before persistence
//!
//! A binding is savable when its display name is non-empty and usable as a
//! script-reference key, and its key string is either empty (unbound) or a
//! well-formed key expression. Validation runs on every `save`, never on
//! load: files already on disk are trusted input (spec'd fail-safes in the
//! registry handle the rest).
//!
//! Quote-hazard detection lives here too: the templater wraps values in
//! bare double quotes without escaping, so embedded quotes in file or
//! command names can break the generated script. The templater warns
//! rather than rejecting; selection names are not under our control.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::core::keyexpr::{parse_key_expr, KeyExprError};
use crate::core::types::CommandBinding;

/// Validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Display name is empty; the binding cannot be persisted
    #[error("Binding has no name")]
    EmptyName,

    /// Display name contains characters unusable in a script-reference key
    #[error("Binding name '{0}' contains reserved characters")]
    UnsafeName(String),

    /// Key string is neither empty nor a well-formed key expression
    #[error("Invalid key expression '{key}': {source}")]
    InvalidKey {
        key: String,
        source: KeyExprError,
    },
}

/// Characters that cannot appear in a script-reference key.
///
/// Script references are derived from display names (`commands/<name>.ps1`)
/// and must be representable as a settings-store key on every platform.
fn reserved_name_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[/\\:*?"<>|]"#).expect("reserved-character class should be valid regex")
    })
}

/// Validates that a binding may be persisted.
pub fn validate_binding(binding: &CommandBinding) -> Result<(), ValidationError> {
    if binding.display_name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if reserved_name_chars().is_match(&binding.display_name) {
        return Err(ValidationError::UnsafeName(binding.display_name.clone()));
    }

    if !binding.key.is_empty() {
        parse_key_expr(&binding.key).map_err(|source| ValidationError::InvalidKey {
            key: binding.key.clone(),
            source,
        })?;
    }

    Ok(())
}

/// True when a templated value would break its surrounding quotes.
pub fn has_quote_hazard(value: &str) -> bool {
    value.contains('"')
}
