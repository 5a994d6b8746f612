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

//! src/exec/template.rs
//!
//! Script templating: context preamble + stored script body
//!
//! Shell commands receive their invocation context as a deterministic
//! PowerShell variable preamble prepended to the stored script body, one
//! declaration per line, in fixed order:
//!
//! ```powershell
//! $selecting_item_path_ary = @("C:\x\a.txt","C:\x\b txt");
//! $selecting_item_name_ary = @("a.txt","b txt");
//! $current_dir = "C:\x";
//! $opposite_dir = "C:\y";
//! $dialog_input_str_ary = @("line one","line two");
//! <script body>
//! ```
//!
//! Values are wrapped in bare double quotes with no escaping. A name that
//! embeds a quote can therefore break or inject into the generated script;
//! generation does not escape, it only warns (see
//! `core::validator::has_quote_hazard`).

use std::fmt;
use tracing::warn;

use crate::core::validator::has_quote_hazard;
use crate::exec::ExecutionContext;

/// The path separator applied to every directory in the preamble.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PathSeparator {
    /// Windows convention, the original interpreter's home turf
    Backslash,
    /// Unix convention
    Slash,
}

impl PathSeparator {
    pub fn as_char(self) -> char {
        match self {
            PathSeparator::Backslash => '\\',
            PathSeparator::Slash => '/',
        }
    }

    /// The separator native to the build platform.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            PathSeparator::Backslash
        } else {
            PathSeparator::Slash
        }
    }
}

impl fmt::Display for PathSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Rewrites every separator in `path` to the requested one.
pub fn apply_separator(path: &str, separator: PathSeparator) -> String {
    path.replace(['/', '\\'], &separator.as_char().to_string())
}

/// Wraps a single value in double quotes, warning on embedded quotes.
fn quote(value: &str) -> String {
    if has_quote_hazard(value) {
        warn!(value, "templated value embeds a double quote; generated script may break");
    }
    format!("\"{}\"", value)
}

/// Builds the final script text from the resolved body and context.
///
/// The preamble order is fixed regardless of selection size or dialog
/// input: selection absolute paths, selection names, current directory,
/// companion directory, dialog input lines, then the body.
pub fn build_script(body: &str, context: &ExecutionContext, dialog_input: &str) -> String {
    let separator = context.separator;
    let current_dir = apply_separator(&context.current_dir, separator);
    let opposite_dir = apply_separator(&context.opposite_dir, separator);

    let path_ary = context
        .selected_names
        .iter()
        .map(|name| quote(&format!("{}{}{}", current_dir, separator.as_char(), name)))
        .collect::<Vec<_>>()
        .join(",");
    let name_ary = context
        .selected_names
        .iter()
        .map(|name| quote(name))
        .collect::<Vec<_>>()
        .join(",");
    let dialog_input_ary = dialog_input
        .split('\n')
        .map(quote)
        .collect::<Vec<_>>()
        .join(",");

    let declarations = [
        format!("$selecting_item_path_ary = @({});", path_ary),
        format!("$selecting_item_name_ary = @({});", name_ary),
        format!("$current_dir = \"{}\";", current_dir),
        format!("$opposite_dir = \"{}\";", opposite_dir),
        format!("$dialog_input_str_ary = @({});", dialog_input_ary),
        body.to_string(),
    ];

    declarations.join("\n")
}
