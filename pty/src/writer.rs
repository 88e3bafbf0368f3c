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

//! Owns the PTY's writer half and forwards scancode-derived bytes to the
//! child's stdin.

use std::io::Write;
use std::sync::mpsc::Receiver;

use tokio::task::JoinHandle;

/// Spawns the blocking writer loop. Exits once `stdin_tx` is dropped (the
/// bridge task tearing down this child) or on a write error.
pub(crate) fn spawn(mut writer: Box<dyn Write + Send>, stdin_rx: Receiver<Vec<u8>>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while let Ok(bytes) = stdin_rx.recv() {
            if let Err(error) = writer.write_all(&bytes) {
                tracing::debug!(%error, "pty writer exiting");
                break;
            }
            let _ = writer.flush();
        }
    })
}
