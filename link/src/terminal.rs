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

//! The link driver's registry entry for one terminal: a session plus the
//! driver-side halves of its outbound queues and the channels it uses to
//! hand work to the pty bridge.
//!
//! A [`Terminal`] is shared between exactly two tasks — the link driver,
//! which owns this struct outright, and the pty bridge, which only ever
//! sees `session` (through the `Arc<Mutex<_>>`) and the receiving halves of
//! `stdin_tx`/`control_tx` handed to it at spawn time.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, mpsc};

use twinax_term::{COMMAND_QUEUE_MAX_PENDING, SessionConfig, SessionEvent, ScancodeDictionary, TerminalSession};
use twinax_wire::BoundedFifo;

/// Scancode-derived bytes bound for the child's stdin.
pub type StdinSender = mpsc::Sender<Vec<u8>>;
pub type StdinReceiver = mpsc::Receiver<Vec<u8>>;

/// State-machine transitions the pty bridge must act on.
pub type ControlSender = mpsc::Sender<SessionEvent>;
pub type ControlReceiver = mpsc::Receiver<SessionEvent>;

/// How many POLL-or-ACK frames may be queued for a station at once. One is
/// ever outstanding by construction, but a couple of slack slots keep
/// `queue_poll` from ever blocking the driver on a slow tick.
const POLL_QUEUE_DEPTH: usize = 4;

/// Events queued for the bridge before it's even had a chance to look —
/// small, since `SpawnChild`/`KillChild` only ever alternate.
const CONTROL_QUEUE_DEPTH: usize = 4;

/// One twinax station's session plus the link driver's end of its queues.
pub struct Terminal {
    pub station: u8,
    pub session: Arc<Mutex<TerminalSession>>,
    pub commands_rx: BoundedFifo<Vec<u8>>,
    pub polls_rx: BoundedFifo<Vec<u8>>,
    pub stdin_tx: StdinSender,
    pub control_tx: ControlSender,
    pub last_response: Instant,
}

impl Terminal {
    /// Builds a terminal's session and queues, returning the receiving
    /// halves the caller hands to the pty bridge it spawns for this station.
    pub fn new(
        station: u8,
        dictionary: Arc<ScancodeDictionary>,
        config: SessionConfig,
    ) -> (Self, StdinReceiver, ControlReceiver) {
        let commands = BoundedFifo::new(COMMAND_QUEUE_MAX_PENDING);
        let polls = BoundedFifo::new(POLL_QUEUE_DEPTH);
        let session = TerminalSession::new(
            station,
            dictionary,
            config,
            commands.sender(),
            polls.sender(),
        );
        let (stdin_tx, stdin_rx) = mpsc::channel(COMMAND_QUEUE_MAX_PENDING);
        let (control_tx, control_rx) = mpsc::channel(CONTROL_QUEUE_DEPTH);

        let terminal = Self {
            station,
            session: Arc::new(Mutex::new(session)),
            commands_rx: commands,
            polls_rx: polls,
            stdin_tx,
            control_tx,
            last_response: Instant::now(),
        };
        (terminal, stdin_rx, control_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinax_term::ScancodeDictionary;

    #[tokio::test]
    async fn new_wires_session_queues_to_driver_side_receivers() {
        let dict = Arc::new(ScancodeDictionary::builder("test").build());
        let (terminal, _stdin_rx, _control_rx) = Terminal::new(2, dict, SessionConfig::default());
        assert_eq!(terminal.station, 2);
        assert!(terminal.commands_rx.is_empty());
        assert!(terminal.polls_rx.is_empty());

        terminal.session.lock().await.queue_poll();
        assert_eq!(terminal.polls_rx.len(), 1);
    }
}
