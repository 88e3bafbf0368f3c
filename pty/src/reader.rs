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

//! Reads the child's raw output and drives it through the session's VT52
//! stream translator, one small chunk at a time.

use std::io::Read;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use twinax_term::{COMMAND_QUEUE_MAX_PENDING, TerminalSession};

/// Chunk size for reads off the child's stdout. Kept small so a chatty
/// child can't buffer a burst of output ahead of the translator and delay
/// what reaches the terminal.
const CHUNK_SIZE: usize = 128;

/// How long to back off between back-pressure checks while the outbound
/// command queue is full.
const BACKPRESSURE_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(5);

/// Spawns the blocking reader loop. Exits (without error) on EOF — a
/// normal consequence of the child exiting, picked up by the bridge task
/// via the child handle rather than this task's exit.
pub(crate) fn spawn(
    station: u8,
    mut reader: Box<dyn Read + Send>,
    session: Arc<Mutex<TerminalSession>>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            while session.blocking_lock().command_queue_depth() >= COMMAND_QUEUE_MAX_PENDING {
                std::thread::sleep(BACKPRESSURE_POLL_INTERVAL);
            }
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => session.blocking_lock().feed_output(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    tracing::debug!(station, %error, "pty reader exiting");
                    break;
                }
            }
        }
    })
}
