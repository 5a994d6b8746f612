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

//! src/exec/dispatcher.rs
//!
//! Non-blocking submission of templated scripts to the interpreter
//!
//! The dispatcher is message passing, not a blocking call: `submit` hands a
//! `Submission` to a worker thread over a channel and returns immediately
//! with a correlation id. The worker runs the interpreter, captures output,
//! and emits exactly one `ExecLog` per submission on the event channel (the
//! log pane's feed). The dispatcher holds no state and never retries; once
//! submitted, an execution cannot be cancelled from here.

use std::process::{Command, Output};
use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

/// One execution result, correlated to its submission by `id`.
///
/// `rc` is `None` when the interpreter could not be spawned at all; the
/// failure text is in `stderr`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecLog {
    /// The command's display label
    pub title: String,
    /// The full templated script text that ran
    pub command: String,
    /// Correlation id returned by `submit`
    pub id: String,
    /// Interpreter exit code, if it ran
    pub rc: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// The external interpreter invocation shape.
///
/// The original host runs `powershell -Command <script>`; tests substitute
/// `sh -c` or a no-op program.
#[derive(Clone, Debug)]
pub struct ShellInterpreter {
    program: String,
    command_flag: String,
}

impl ShellInterpreter {
    pub fn new(program: &str, command_flag: &str) -> Self {
        Self {
            program: program.to_string(),
            command_flag: command_flag.to_string(),
        }
    }

    /// The production interpreter.
    pub fn powershell() -> Self {
        Self::new("powershell", "-Command")
    }

    fn run(&self, script: &str, working_dir: &str) -> std::io::Result<Output> {
        Command::new(&self.program)
            .arg(&self.command_flag)
            .arg(script)
            .current_dir(working_dir)
            .output()
    }
}

struct Submission {
    id: String,
    title: String,
    script: String,
    working_dir: String,
}

/// Hands scripts to a worker thread and returns without blocking.
pub struct ExecutionDispatcher {
    tx: Option<Sender<Submission>>,
    worker: Option<JoinHandle<()>>,
}

impl ExecutionDispatcher {
    /// Starts the worker thread.
    ///
    /// Every submission produces one `ExecLog` on `events`; results from
    /// different submissions carry no ordering guarantee as far as callers
    /// are concerned.
    pub fn spawn(interpreter: ShellInterpreter, events: Sender<ExecLog>) -> Self {
        let (tx, rx) = channel::<Submission>();

        let worker = thread::spawn(move || {
            for submission in rx {
                let log = run_submission(&interpreter, submission);
                // Receiver may be gone during shutdown; results are dropped
                let _ = events.send(log);
            }
        });

        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Queues a script for execution and returns its correlation id.
    pub fn submit(&self, script_text: &str, working_dir: &str, title: &str) -> String {
        let id = Uuid::new_v4().to_string();
        info!(id = %id, title, working_dir, "submitting command");

        let submission = Submission {
            id: id.clone(),
            title: title.to_string(),
            script: script_text.to_string(),
            working_dir: working_dir.to_string(),
        };
        if let Some(tx) = &self.tx {
            if tx.send(submission).is_err() {
                warn!(id = %id, "execution worker is gone; submission dropped");
            }
        }

        id
    }
}

impl Drop for ExecutionDispatcher {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop after in-flight work
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_submission(interpreter: &ShellInterpreter, submission: Submission) -> ExecLog {
    match interpreter.run(&submission.script, &submission.working_dir) {
        Ok(output) => ExecLog {
            title: submission.title,
            command: submission.script,
            id: submission.id,
            rc: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        },
        Err(err) => ExecLog {
            title: submission.title,
            command: submission.script,
            id: submission.id,
            rc: None,
            stdout: String::new(),
            stderr: err.to_string(),
        },
    }
}
