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

//! The per-terminal state machine: detect-unconfigured → initialize → run →
//! recover. Owns every piece of mutable state the VT52 translator and
//! scancode processor touch, and the sender half of its outbound command
//! and poll queues.

use std::sync::Arc;

use twinax_wire::opcodes::{IndicatorByte, StatusByte, op};
use twinax_wire::{FifoSender, StatusWord};

use crate::cursor::{Cursor, SavedCursor};
use crate::dictionary::ScancodeDictionary;
use crate::modifier::ModifierState;

/// Mirrors the distilled spec's named states for a terminal session.
///
/// `DetectedNeedsInit` is transient by construction: [`TerminalSession::on_status`]
/// always drives it straight into `Initializing` within the same call, since
/// its only behavior is the entry action (reset + queue `SET_MODE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Undetected,
    DetectedNeedsInit,
    Initializing,
    Running,
    Disconnected,
}

/// Something the session wants an external collaborator to do. The session
/// never talks to the pty bridge directly (per the Design Notes' one-way
/// message passing guidance) — the link driver interprets these and tells
/// the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Kill whatever child is running for this terminal; a fresh SET_MODE
    /// handshake is in flight.
    KillChild,
    /// The handshake completed: spawn a fresh child for this terminal.
    SpawnChild,
}

/// Default outbound command queue depth at which the pty bridge stops
/// reading from the child until it drains (§5 back-pressure).
pub const COMMAND_QUEUE_MAX_PENDING: usize = 50;

/// Terminals inactive this long (no successful poll response) are declared disconnected.
pub const INACTIVITY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Per-terminal configuration, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub poll_delay_us: u64,
    pub clicker_enabled: bool,
    pub advanced_features: bool,
    pub codepage: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_delay_us: 2_000,
            clicker_enabled: true,
            advanced_features: false,
            codepage: "cp037".to_string(),
        }
    }
}

/// One twinax-attached terminal's complete state.
pub struct TerminalSession {
    pub station_address: u8,
    pub cursor: Cursor,
    pub saved_cursor: SavedCursor,
    pub newline_pending: bool,
    pub cursor_in_previous_line: bool,
    pub modifiers: ModifierState,
    pub status_byte: StatusByte,
    pub indicator_byte: IndicatorByte,
    pub initialized: bool,
    pub response_level: bool,
    pub line_parity: bool,
    pub busy: bool,
    pub poll_active: bool,
    pub config: SessionConfig,
    pub incomplete_sequence: Vec<u8>,
    pub dictionary: Arc<ScancodeDictionary>,
    pub state: SessionState,
    commands_tx: FifoSender<Vec<u8>>,
    polls_tx: FifoSender<Vec<u8>>,
}

impl TerminalSession {
    pub fn new(
        station_address: u8,
        dictionary: Arc<ScancodeDictionary>,
        config: SessionConfig,
        commands_tx: FifoSender<Vec<u8>>,
        polls_tx: FifoSender<Vec<u8>>,
    ) -> Self {
        Self {
            station_address,
            cursor: Cursor::home(),
            saved_cursor: SavedCursor::default(),
            newline_pending: false,
            cursor_in_previous_line: false,
            modifiers: ModifierState::default(),
            status_byte: StatusByte::empty(),
            indicator_byte: IndicatorByte::empty(),
            initialized: false,
            response_level: false,
            line_parity: false,
            busy: true,
            poll_active: false,
            config,
            incomplete_sequence: Vec::new(),
            dictionary,
            state: SessionState::Undetected,
            commands_tx,
            polls_tx,
        }
    }

    /// Pushes one already-encoded wire frame onto the outbound command
    /// queue, warning (not failing) if the bounded queue is full — a stalled
    /// terminal must never wedge the caller.
    pub(crate) fn push_frame(&self, frame: Vec<u8>) {
        if self.commands_tx.push(frame).is_err() {
            tracing::warn!(
                station = self.station_address,
                "outbound command queue full, frame dropped"
            );
        }
    }

    /// Queues the next POLL (no ACK owed) or ACK (one outstanding) frame,
    /// echoing the last observed line parity.
    pub fn queue_poll(&self) {
        let frame = if self.poll_active {
            twinax_wire::encode_ack(self.station_address, self.line_parity)
        } else {
            twinax_wire::encode_poll(self.station_address, self.line_parity)
        };
        if self.polls_tx.push(frame).is_err() {
            tracing::warn!(station = self.station_address, "poll queue full");
        }
    }

    fn push_command(&self, opcode: u8, data: &[u8]) {
        self.push_frame(twinax_wire::encode_command(opcode, self.station_address, data));
    }

    fn push_eoq(&self) {
        self.push_command(op::EOQ, &[]);
    }

    fn push_set_mode(&self) {
        self.push_command(op::SET_MODE, &[0]);
        self.push_eoq();
    }

    fn push_reset_exception(&self) {
        self.push_command(op::WRITE_CONTROL_DATA, &[(self.status_byte | StatusByte::RESET_EXCEPTION).bits()]);
        self.push_eoq();
    }

    /// Clears every volatile field back to its startup default, preserving
    /// station address, dictionary, and configuration. Queues are cleared by
    /// the caller (the link driver owns their receive halves).
    pub fn reset(&mut self) {
        self.cursor = Cursor::home();
        self.saved_cursor = SavedCursor::default();
        self.newline_pending = false;
        self.cursor_in_previous_line = false;
        self.modifiers = ModifierState::default();
        self.status_byte = StatusByte::empty();
        self.indicator_byte = IndicatorByte::empty();
        self.initialized = false;
        self.response_level = false;
        self.line_parity = false;
        self.busy = true;
        self.poll_active = false;
        self.incomplete_sequence.clear();
    }

    /// Drives the state machine off one decoded status word. Returns the
    /// events (if any) an external collaborator must act on.
    pub fn on_status(&mut self, status: StatusWord) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.busy = status.busy;
        self.line_parity = status.parity;

        if self.state == SessionState::Undetected {
            self.state = SessionState::DetectedNeedsInit;
        }

        if status.exception == 7 {
            // A previously-initialized terminal reporting exception 7 has
            // been power-cycled or reconnected and needs the full SET_MODE
            // handshake again, exactly like a never-seen terminal — the
            // original re-inits unconditionally on this exception, never
            // gating it on whether the terminal was already up.
            self.reset();
            self.push_set_mode();
            self.state = SessionState::Initializing;
            events.push(SessionEvent::KillChild);
            return events;
        }

        if status.exception == 0 {
            if self.state == SessionState::Initializing && !status.busy {
                self.clear_screen();
                self.initialized = true;
                self.state = SessionState::Running;
                events.push(SessionEvent::SpawnChild);
            }
            return events;
        }

        // Any other nonzero exception: recover in place if we were already
        // running; otherwise it's noise from a terminal we haven't finished
        // bringing up yet.
        if self.initialized {
            tracing::error!(
                station = self.station_address,
                exception = status.exception,
                "terminal signaled exception, resetting exception status"
            );
            self.push_reset_exception();
        }
        events
    }

    /// Delivers a decoded data (scancode) word following a status word, per
    /// the response-level dedup rule: only act if the response level
    /// flipped and the scancode isn't the null/break sentinel.
    pub fn on_data(&mut self, scancode: u16, status_response_level: bool) -> Option<u16> {
        if self.response_level != status_response_level
            && scancode != 0x00
            && scancode != 0xFF
        {
            self.response_level = status_response_level;
            return Some(scancode);
        }
        self.response_level = status_response_level;
        None
    }

    /// Runs one decoded scancode through the keyboard processor, pushing any
    /// resulting control/indicator frames onto the outbound command queue
    /// and returning the bytes (if any) to write to the child's stdin.
    pub fn process_scancode(&mut self, scancode: u16) -> Vec<u8> {
        let mut keyboard = crate::scancode::KeyboardState {
            modifiers: &mut self.modifiers,
            indicator_byte: &mut self.indicator_byte,
            status_byte: &mut self.status_byte,
            advanced_features: self.config.advanced_features,
        };
        let outcome = crate::scancode::process(
            &self.dictionary,
            &mut keyboard,
            self.station_address,
            scancode,
        );
        for frame in outcome.frames {
            self.push_frame(frame);
        }
        outcome.pty_bytes
    }

    /// Current depth of the outbound command queue, as observed from the
    /// producer side — what the pty bridge polls against
    /// [`COMMAND_QUEUE_MAX_PENDING`] to decide whether to keep reading from
    /// the child.
    pub fn command_queue_depth(&self) -> usize {
        self.commands_tx.len()
    }

    /// Declares the terminal disconnected after prolonged inactivity:
    /// resets session state and re-enters `Undetected`.
    pub fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
        self.reset();
        self.state = SessionState::Undetected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::ScancodeDictionary;
    use pretty_assertions::assert_eq;
    use twinax_wire::BoundedFifo;

    fn session() -> TerminalSession {
        let dict = Arc::new(ScancodeDictionary::builder("test").build());
        let commands = BoundedFifo::<Vec<u8>>::new(64);
        let polls = BoundedFifo::<Vec<u8>>::new(64);
        TerminalSession::new(
            0,
            dict,
            SessionConfig::default(),
            commands.sender(),
            polls.sender(),
        )
    }

    #[test]
    fn unconfigured_terminal_triggers_set_mode_and_initializing() {
        let mut s = session();
        let status = StatusWord {
            station: 0,
            busy: false,
            exception: 7,
            outstanding: false,
            parity: false,
            response_level: false,
            reserved: false,
        };
        let events = s.on_status(status);
        assert_eq!(events, vec![SessionEvent::KillChild]);
        assert_eq!(s.state, SessionState::Initializing);
    }

    #[test]
    fn exception_seven_reinits_even_if_already_running() {
        let mut s = session();
        s.state = SessionState::Running;
        s.initialized = true;
        s.cursor = Cursor::new(10, 10);
        let status = StatusWord {
            station: 0,
            busy: false,
            exception: 7,
            outstanding: false,
            parity: false,
            response_level: false,
            reserved: false,
        };
        let events = s.on_status(status);
        assert_eq!(events, vec![SessionEvent::KillChild]);
        assert_eq!(s.state, SessionState::Initializing);
        assert!(!s.initialized);
        assert_eq!(s.cursor, Cursor::home());
    }

    #[test]
    fn clean_status_after_set_mode_transitions_to_running() {
        let mut s = session();
        s.state = SessionState::Initializing;
        let status = StatusWord {
            station: 0,
            busy: false,
            exception: 0,
            outstanding: false,
            parity: false,
            response_level: false,
            reserved: false,
        };
        let events = s.on_status(status);
        assert_eq!(events, vec![SessionEvent::SpawnChild]);
        assert!(s.initialized);
        assert_eq!(s.state, SessionState::Running);
        assert_eq!(s.cursor, Cursor::home());
    }

    #[test]
    fn exception_while_running_does_not_change_state() {
        let mut s = session();
        s.state = SessionState::Running;
        s.initialized = true;
        let status = StatusWord {
            station: 0,
            busy: false,
            exception: 3,
            outstanding: false,
            parity: false,
            response_level: false,
            reserved: false,
        };
        let events = s.on_status(status);
        assert!(events.is_empty());
        assert_eq!(s.state, SessionState::Running);
    }

    #[test]
    fn response_level_dedup_suppresses_repeat_scancode() {
        let mut s = session();
        assert_eq!(s.on_data(0x1E, true), Some(0x1E));
        assert_eq!(s.on_data(0x1E, true), None);
        assert_eq!(s.on_data(0x1F, false), Some(0x1F));
    }

    #[test]
    fn null_and_break_scancodes_never_surface() {
        let mut s = session();
        assert_eq!(s.on_data(0x00, true), None);
        assert_eq!(s.on_data(0xFF, false), None);
    }

    #[test]
    fn disconnect_resets_and_returns_to_undetected() {
        let mut s = session();
        s.cursor = Cursor::new(10, 10);
        s.initialized = true;
        s.disconnect();
        assert_eq!(s.state, SessionState::Undetected);
        assert_eq!(s.cursor, Cursor::home());
        assert!(!s.initialized);
    }
}
