/*
 *   Copyright (c) 2025 twinax-ctl contributors
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! Bridges a terminal session's VT52 output and scancode-derived input to a
//! spawned shell child process, over a pseudo-terminal.
//!
//! Three tasks cooperate per running child, the same split the grounding
//! codebase uses for its own PTY bridge: a reader task turns the child's
//! raw output into calls on the session's stream translator, a writer task
//! owns the PTY's writer half, and the orchestration loop in [`run`] listens
//! for [`SessionEvent`]s and stdin bytes and routes them to whichever child
//! is currently alive.

pub mod error;
mod reader;
mod writer;

pub use error::PtyError;

use std::sync::Arc;

use portable_pty::{CommandBuilder, PtySize, native_pty_system};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use twinax_link::{ControlReceiver, StdinReceiver};
use twinax_term::{SessionEvent, TerminalSession};

/// The shell command spawned for every terminal's child process.
#[derive(Debug, Clone)]
pub struct ChildSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ChildSpec {
    fn default() -> Self {
        Self {
            program: "/bin/sh".to_string(),
            args: Vec::new(),
        }
    }
}

/// The pieces of a spawned child the bridge needs to tear it down again.
struct RunningChild {
    stdin_tx: std::sync::mpsc::Sender<Vec<u8>>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
    child: Box<dyn portable_pty::Child + Send + Sync>,
}

impl RunningChild {
    fn shutdown(mut self) {
        let _ = self.child.kill();
        self.reader_task.abort();
        self.writer_task.abort();
    }
}

/// Opens a PTY sized to the terminal's 24x80 display, spawns `spec` in it
/// with `TERM=vt52`/`TWINAX=1` set, and starts its reader/writer tasks.
async fn spawn_child(
    spec: &ChildSpec,
    station: u8,
    session: Arc<Mutex<TerminalSession>>,
) -> Result<RunningChild, PtyError> {
    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize {
            rows: twinax_term::cursor::ROWS as u16,
            cols: twinax_term::cursor::COLS as u16,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| PtyError::OpenPty(e.to_string()))?;

    let mut cmd = CommandBuilder::new(&spec.program);
    cmd.args(&spec.args);
    cmd.env("TERM", "vt52");
    cmd.env("TWINAX", "1");

    let child = pair.slave.spawn_command(cmd).map_err(|e| PtyError::SpawnChild {
        program: spec.program.clone(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    })?;
    drop(pair.slave);

    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| PtyError::CloneReader(e.to_string()))?;
    let writer = pair
        .master
        .take_writer()
        .map_err(|e| PtyError::TakeWriter(e.to_string()))?;

    let reader_task = reader::spawn(station, reader, session);
    let (stdin_tx, stdin_handler_rx) = std::sync::mpsc::channel::<Vec<u8>>();
    let writer_task = writer::spawn(writer, stdin_handler_rx);

    Ok(RunningChild {
        stdin_tx,
        reader_task,
        writer_task,
        child,
    })
}

/// Runs the bridge for one terminal until `control_rx` closes (the link
/// driver shutting down). Owns the child's lifecycle entirely: a fresh
/// `SpawnChild` event always tears down whatever was previously running
/// first.
pub async fn run(
    station: u8,
    session: Arc<Mutex<TerminalSession>>,
    spec: ChildSpec,
    mut stdin_rx: StdinReceiver,
    mut control_rx: ControlReceiver,
) {
    let mut running: Option<RunningChild> = None;

    loop {
        tokio::select! {
            event = control_rx.recv() => {
                match event {
                    Some(SessionEvent::KillChild) => {
                        if let Some(child) = running.take() {
                            child.shutdown();
                        }
                    }
                    Some(SessionEvent::SpawnChild) => {
                        if let Some(child) = running.take() {
                            child.shutdown();
                        }
                        match spawn_child(&spec, station, session.clone()).await {
                            Ok(child) => running = Some(child),
                            Err(error) => tracing::error!(station, %error, "failed to spawn child"),
                        }
                    }
                    None => break,
                }
            }
            bytes = stdin_rx.recv() => {
                match bytes {
                    Some(bytes) => {
                        if let Some(child) = running.as_ref() {
                            let _ = child.stdin_tx.send(bytes);
                        }
                    }
                    None => break,
                }
            }
        }
    }

    if let Some(child) = running.take() {
        child.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_spec_defaults_to_a_plain_shell() {
        let spec = ChildSpec::default();
        assert_eq!(spec.program, "/bin/sh");
        assert!(spec.args.is_empty());
    }
}
