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

//! src/core/keyexpr.rs
//!
//! Canonical key-combination matching
//!
//! Two halves live here:
//! - `KeyInput`: a raw keyboard event (modifier flags + primary key value)
//!   and its deterministic, locale-independent canonical string form.
//! - `KeyChord`: the parsed form of a *configured* key string such as
//!   `"ctrl+shift+A"`, produced by a nom parser. Used to validate stored
//!   bindings and to synthesize a `KeyInput` from a CLI argument.
//!
//! Matching is equality-based only: an event matches a configured string
//! when the lower-cased canonical form of the event equals the lower-cased
//! configured string. No prefix or partial matching.

use nom::{
    bytes::complete::take_while1, character::complete::char, multi::separated_list1, IResult,
    Parser,
};
use thiserror::Error;

/// Canonical modifier tokens, in the fixed canonical order.
const MODIFIER_ORDER: [&str; 3] = ["ctrl", "alt", "shift"];

/// Key-expression parse errors
#[derive(Debug, Error, PartialEq)]
pub enum KeyExprError {
    /// Expression is empty or whitespace
    #[error("Key expression is empty")]
    Empty,

    /// A token contains characters outside [A-Za-z0-9]
    #[error("Invalid token in key expression '{0}'")]
    InvalidToken(String),

    /// Unparsed input remained after the last token
    #[error("Trailing input after key expression: '{0}'")]
    TrailingInput(String),

    /// The same modifier appears twice
    #[error("Duplicate modifier '{0}'")]
    DuplicateModifier(String),

    /// A non-modifier token appears before the end
    #[error("Primary key '{0}' must be the last token")]
    KeyNotLast(String),
}

/// A raw keyboard input event as delivered by the surrounding UI.
///
/// `key` is the event's key value in the platform convention the original
/// frontend used: `" "` for the space bar, a single character for printable
/// keys, or a name such as `"Enter"`, `"F2"`, `"ArrowDown"`, `"Control"`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyInput {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: String,
}

impl KeyInput {
    pub fn new(ctrl: bool, alt: bool, shift: bool, key: &str) -> Self {
        Self {
            ctrl,
            alt,
            shift,
            key: key.to_string(),
        }
    }

    /// Produces the canonical key-combination string for this event.
    ///
    /// Active modifiers are emitted in the fixed order `ctrl, alt, shift`,
    /// followed by the primary key token unless the event's key is itself a
    /// modifier key (a lone Ctrl press canonicalizes to `"ctrl"`). Token
    /// rules: a literal space becomes `Space`, a single printable character
    /// is upper-cased, any other named key passes through unchanged.
    pub fn canonical(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for (active, name) in [
            (self.ctrl, MODIFIER_ORDER[0]),
            (self.alt, MODIFIER_ORDER[1]),
            (self.shift, MODIFIER_ORDER[2]),
        ] {
            if active {
                parts.push(name.to_string());
            }
        }

        if !self.key.is_empty() && !is_modifier_key(&self.key) {
            parts.push(primary_token(&self.key));
        }

        parts.join("+")
    }

    /// Tests this event against a configured key string.
    ///
    /// Exact string equality after lower-casing both sides; an empty
    /// configured string (an unbound binding) never matches.
    pub fn matches(&self, configured: &str) -> bool {
        if configured.is_empty() {
            return false;
        }
        self.canonical().to_lowercase() == configured.to_lowercase()
    }

    /// The single printable character of a modifier-free event, if any.
    ///
    /// This is the eligibility test for handing an unmatched event to the
    /// incremental-search collaborator.
    pub fn printable_char(&self) -> Option<char> {
        if self.ctrl || self.alt || self.shift {
            return None;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Converts an event key value to its canonical primary token.
fn primary_token(key: &str) -> String {
    if key == " " {
        return "Space".to_string();
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_uppercase().collect(),
        _ => key.to_string(),
    }
}

/// True for key values that are themselves modifier keys.
fn is_modifier_key(key: &str) -> bool {
    matches!(key, "Control" | "Alt" | "Shift")
}

/// The parsed form of a configured key-combination string.
///
/// `key` is `None` for modifier-only combinations such as `"ctrl+shift"`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: Option<String>,
}

impl KeyChord {
    /// Renders the chord back in canonical form.
    pub fn canonical(&self) -> String {
        let input = self.to_input();
        input.canonical()
    }

    /// Synthesizes the keyboard event this chord describes.
    ///
    /// Used by the CLI to feed a configured-style expression through the
    /// same resolution path a live event takes. Single printable tokens are
    /// lowered to their unshifted character, `Space` becomes a literal
    /// space, and a modifier-only chord yields the modifier key itself.
    pub fn to_input(&self) -> KeyInput {
        let key = match &self.key {
            Some(token) if token.eq_ignore_ascii_case("space") => " ".to_string(),
            Some(token) => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c.to_lowercase().collect(),
                    _ => token.clone(),
                }
            }
            None => {
                if self.ctrl {
                    "Control".to_string()
                } else if self.alt {
                    "Alt".to_string()
                } else {
                    "Shift".to_string()
                }
            }
        };

        KeyInput {
            ctrl: self.ctrl,
            alt: self.alt,
            shift: self.shift,
            key,
        }
    }
}

/// Splits a key expression into `+`-separated alphanumeric tokens.
fn token_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(
        char('+'),
        take_while1(|c: char| c.is_ascii_alphanumeric()),
    )
    .parse(input)
}

/// Parses a configured key-combination string into a `KeyChord`.
///
/// Accepted grammar: modifiers (`ctrl`, `alt`, `shift`, case-insensitive,
/// each at most once) joined with `+`, optionally followed by one primary
/// key token. The primary token must be last.
///
/// # Example
/// ```
/// use filebind::core::keyexpr::parse_key_expr;
///
/// let chord = parse_key_expr("ctrl+shift+a")?;
/// assert!(chord.ctrl && chord.shift && !chord.alt);
/// assert_eq!(chord.key.as_deref(), Some("a"));
/// # Ok::<(), filebind::core::keyexpr::KeyExprError>(())
/// ```
pub fn parse_key_expr(input: &str) -> Result<KeyChord, KeyExprError> {
    if input.trim().is_empty() {
        return Err(KeyExprError::Empty);
    }

    let (rest, tokens) =
        token_list(input).map_err(|_| KeyExprError::InvalidToken(input.to_string()))?;
    if !rest.is_empty() {
        return Err(KeyExprError::TrailingInput(rest.to_string()));
    }

    let mut chord = KeyChord {
        ctrl: false,
        alt: false,
        shift: false,
        key: None,
    };

    for token in tokens {
        // A primary key token is only legal in final position
        if let Some(existing) = &chord.key {
            return Err(KeyExprError::KeyNotLast(existing.clone()));
        }

        match token.to_ascii_lowercase().as_str() {
            "ctrl" => {
                if chord.ctrl {
                    return Err(KeyExprError::DuplicateModifier("ctrl".to_string()));
                }
                chord.ctrl = true;
            }
            "alt" => {
                if chord.alt {
                    return Err(KeyExprError::DuplicateModifier("alt".to_string()));
                }
                chord.alt = true;
            }
            "shift" => {
                if chord.shift {
                    return Err(KeyExprError::DuplicateModifier("shift".to_string()));
                }
                chord.shift = true;
            }
            _ => chord.key = Some(token.to_string()),
        }
    }

    Ok(chord)
}
