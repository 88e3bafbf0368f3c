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

//! The round-robin link driver: services every configured station in a
//! fixed rotation, one request/response cycle per tick, over a single
//! serial device shared by every terminal.
//!
//! Everything in this module is synchronous — no `.await` anywhere — so the
//! caller is expected to run [`run`] inside `tokio::task::spawn_blocking`,
//! keeping the blocking serial I/O off the async executor's worker threads
//! the same way the grounding codebase keeps blocking PTY reads off them.

use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use twinax_term::{INACTIVITY_TIMEOUT, SessionEvent};
use twinax_wire::{StatusWord, decode_data, decode_status};

use crate::error::LinkError;
use crate::line_reader::{Line, LineReader};
use crate::serial;
use crate::terminal::Terminal;

/// How long a single request/response cycle may wait for its `EOTX` before
/// giving up and retrying.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(50);

/// Malformed or silent cycles are retried this many times before the tick
/// is abandoned and picked back up on the station's next turn.
const MAX_RETRIES: u32 = 3;

/// Opens and configures the converter's serial device, then waits out the
/// firmware settle delay before the first frame is sent.
pub fn open_device(path: &str) -> Result<File, LinkError> {
    let file = serial::open(path)?;
    std::thread::sleep(serial::FIRMWARE_SETTLE_DELAY);
    Ok(file)
}

/// Services every terminal in round-robin order until `shutdown` is set.
///
/// Never returns an error: a single station's link trouble is logged and
/// skipped for this tick rather than taking the whole rotation down.
pub fn run(device: &File, terminals: &mut [Terminal], shutdown: &AtomicBool) {
    let mut reader = LineReader::new(device);
    while !shutdown.load(Ordering::Relaxed) {
        for terminal in terminals.iter_mut() {
            service_one(device, &mut reader, terminal);
        }
    }
}

/// One terminal's tick: pace, check for inactivity, exchange one
/// request/response cycle, then drain as much of the outbound command
/// queue as the terminal's busy state allows.
fn service_one(device: &File, reader: &mut LineReader<'_>, terminal: &mut Terminal) {
    let poll_delay = {
        let session = terminal.session.blocking_lock();
        Duration::from_micros(session.config.poll_delay_us)
    };
    if terminal.last_response.elapsed() < poll_delay {
        return;
    }

    {
        let mut session = terminal.session.blocking_lock();
        if session.initialized && terminal.last_response.elapsed() > INACTIVITY_TIMEOUT {
            session.disconnect();
            drop(session);
            let _ = terminal.control_tx.blocking_send(SessionEvent::KillChild);
            return;
        }
        session.queue_poll();
    }

    let Some(frame) = terminal.polls_rx.try_pop() else {
        return;
    };

    match request_response(device, reader, &frame) {
        Ok((status, data)) => {
            terminal.last_response = Instant::now();
            handle_response(terminal, status, data);
            drain_commands(device, reader, terminal);
        }
        Err(error) => {
            tracing::warn!(station = terminal.station, error = %error, "poll cycle failed");
            if is_write_failure(&error) {
                reset_after_write_failure(terminal);
            }
        }
    }
}

/// A hard failure writing to the serial device, as opposed to a
/// malformed/interrupted line that's safe to retry and log in place.
fn is_write_failure(error: &LinkError) -> bool {
    matches!(error, LinkError::Write(_) | LinkError::ShortWrite { .. })
}

/// Per the error-handling taxonomy, a transient write error gets a full
/// session reset and child restart rather than just a logged retry.
fn reset_after_write_failure(terminal: &mut Terminal) {
    tracing::error!(station = terminal.station, "serial write failed, resetting terminal session");
    let mut session = terminal.session.blocking_lock();
    session.disconnect();
    drop(session);
    let _ = terminal.control_tx.blocking_send(SessionEvent::KillChild);
}

/// Feeds a decoded status/data pair through the session state machine,
/// forwarding the resulting events and pty-bound bytes.
fn handle_response(terminal: &mut Terminal, status: Option<StatusWord>, data: Option<u16>) {
    let mut session = terminal.session.blocking_lock();

    let mut events = Vec::new();
    let response_level = status.map(|s| s.response_level).unwrap_or(session.response_level);
    if let Some(status) = status {
        events.extend(session.on_status(status));
    }

    let scancode_to_deliver = data.and_then(|scancode| session.on_data(scancode, response_level));
    let pty_bytes = scancode_to_deliver.map(|scancode| session.process_scancode(scancode));

    session.poll_active = !session.poll_active;
    drop(session);

    for event in events {
        let _ = terminal.control_tx.blocking_send(event);
    }
    if let Some(bytes) = pty_bytes {
        if !bytes.is_empty() {
            let _ = terminal.stdin_tx.blocking_send(bytes);
        }
    }
}

/// Drains the outbound command queue while the terminal isn't busy,
/// stopping once an `EOQ` frame has gone out or the queue runs dry — the
/// back-pressure boundary the pty bridge watches via `command_queue_depth`.
fn drain_commands(device: &File, reader: &mut LineReader<'_>, terminal: &mut Terminal) {
    loop {
        if terminal.session.blocking_lock().busy {
            return;
        }
        let Some(frame) = terminal.commands_rx.try_pop() else {
            return;
        };
        // EOQ's header byte A is `(0x62 & 0x3F) | 0x40 == 0x62`, the same as
        // the opcode itself, so a plain first-byte comparison is enough.
        let is_eoq = frame.first() == Some(&twinax_wire::opcodes::op::EOQ);
        if let Err(error) = request_response(device, reader, &frame) {
            tracing::warn!(station = terminal.station, error = %error, "command write failed");
            if is_write_failure(&error) {
                reset_after_write_failure(terminal);
            }
            return;
        }
        if is_eoq {
            return;
        }
    }
}

/// Writes `frame` and reads back its response, retrying whole cycles (not
/// just the write) on transient link trouble per the error-handling
/// taxonomy's "transient link error" category.
fn request_response(
    device: &File,
    reader: &mut LineReader<'_>,
    frame: &[u8],
) -> Result<(Option<StatusWord>, Option<u16>), LinkError> {
    let mut last_error = None;
    for attempt in 0..MAX_RETRIES {
        match try_request_response(device, reader, frame) {
            Ok(result) => return Ok(result),
            Err(error) => {
                tracing::debug!(attempt, error = %error, "retrying link cycle");
                last_error = Some(error);
            }
        }
    }
    Err(last_error.expect("loop runs at least once"))
}

fn try_request_response(
    device: &File,
    reader: &mut LineReader<'_>,
    frame: &[u8],
) -> Result<(Option<StatusWord>, Option<u16>), LinkError> {
    write_all(device, frame)?;

    let mut words = Vec::new();
    loop {
        match reader.read_line(RESPONSE_TIMEOUT)? {
            Some(Line::Eotx) => break,
            Some(Line::Word(a, b)) => words.push((a, b)),
            Some(Line::Debug(text)) => tracing::debug!(line = %text, "converter debug line"),
            None => return Err(LinkError::ResponseTimeout),
        }
    }

    let status = words.first().map(|&(a, b)| decode_status(a, b));
    let data = words.get(1).map(|&(a, b)| decode_data(a, b));
    Ok((status, data))
}

fn write_all(device: &File, frame: &[u8]) -> Result<(), LinkError> {
    let mut written = 0;
    while written < frame.len() {
        match (&mut &*device).write(&frame[written..]) {
            Ok(0) => {
                return Err(LinkError::ShortWrite {
                    written,
                    total: frame.len(),
                });
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
            Err(e) => return Err(LinkError::Write(e)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn response_timeout_is_shorter_than_inactivity_timeout() {
        assert!(RESPONSE_TIMEOUT < INACTIVITY_TIMEOUT);
    }

    #[test]
    fn eoq_frame_first_byte_equals_its_own_opcode() {
        let frame = twinax_wire::encode_command(twinax_wire::opcodes::op::EOQ, 3, &[]);
        assert_eq!(frame[0], twinax_wire::opcodes::op::EOQ);
    }
}
